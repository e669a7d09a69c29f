//! Final order status resolution.

use serde::{Deserialize, Serialize};

use crate::report::DiscrepancyReport;

/// Status pushed back to the ERP once reconciliation completes.
///
/// Modeled as an explicit variant (not string comparison) so the status
/// policy stays exhaustiveness-checked. Every currently defined blocking
/// discrepancy kind is processable: it is reported, downgrades the status,
/// and never halts the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Extraction and reference agree on every checked field.
    SupplierApproval,
    /// Discrepancies exist; the order goes back to the supplier for review.
    SentToSupplier,
}

impl OrderStatus {
    /// Derive the final status from a discrepancy report.
    pub fn resolve(report: &DiscrepancyReport) -> Self {
        if report.is_clean() {
            Self::SupplierApproval
        } else {
            Self::SentToSupplier
        }
    }
}
