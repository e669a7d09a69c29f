//! Reconciliation outcome.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ordermatch_core::{OrderIdentifier, ReconciliationId};

use crate::report::DiscrepancyReport;
use crate::status::OrderStatus;

/// Final output of one reconciliation request.
///
/// Created once per request, handed to the persistence collaborator, and
/// never mutated after creation. This is also the caller-facing result
/// shape (serde).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub id: ReconciliationId,
    pub identifier: OrderIdentifier,
    pub discrepancies: DiscrepancyReport,
    pub computed_delivery_date: NaiveDate,
    pub status: OrderStatus,
    /// `false` when reconciliation computed fine but the ERP write-back
    /// failed — "reconciled but not persisted upstream", distinct from a
    /// full failure.
    pub erp_update_ack: bool,
    pub completed_at: DateTime<Utc>,
}
