//! Discrepancy report model.
//!
//! Discrepancies are data, not errors: a report full of mismatches is still
//! the outcome of a *successful* reconciliation.

use serde::{Deserialize, Serialize};

/// How significant a discrepancy is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Significant enough to keep the order from supplier approval.
    Blocking,
    /// Surfaced for audit; does not prevent approval.
    Informational,
}

/// What kind of mismatch was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// A reference line item is absent from the extraction.
    MissingLineItem,
    /// The order totals differ.
    TotalPriceMismatch,
    /// A matched line item differs in price or quantity.
    LineItemMismatch,
    /// Shipping charges differ, or exist on one side only.
    ShippingMismatch,
    /// An extracted line item has no counterpart in the reference.
    UnexpectedLineItem,
}

impl DiscrepancyKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::UnexpectedLineItem => Severity::Informational,
            Self::MissingLineItem
            | Self::TotalPriceMismatch
            | Self::LineItemMismatch
            | Self::ShippingMismatch => Severity::Blocking,
        }
    }
}

/// One field-level mismatch between the reference and the extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    /// Dotted path of the mismatched field, e.g. `"line_items.G8888-68888.price"`.
    pub field: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub severity: Severity,
}

impl Discrepancy {
    pub fn new(
        kind: DiscrepancyKind,
        field: impl Into<String>,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            expected,
            actual,
            severity: kind.severity(),
        }
    }
}

/// Structured outcome of comparing one extraction against one reference.
///
/// Immutable once built by the reconciler; serializes as the plain list of
/// entries in the caller-facing result shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscrepancyReport {
    entries: Vec<Discrepancy>,
}

impl DiscrepancyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, discrepancy: Discrepancy) {
        self.entries.push(discrepancy);
    }

    pub fn entries(&self) -> &[Discrepancy] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Discrepancy> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Blocking)
    }

    pub fn informational(&self) -> impl Iterator<Item = &Discrepancy> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Informational)
    }

    /// `true` iff the report carries no blocking entries.
    pub fn is_clean(&self) -> bool {
        self.blocking().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_clean() {
        assert!(DiscrepancyReport::new().is_clean());
    }

    #[test]
    fn informational_entries_keep_report_clean() {
        let mut report = DiscrepancyReport::new();
        report.push(Discrepancy::new(
            DiscrepancyKind::UnexpectedLineItem,
            "line_items.EXTRA-1",
            None,
            Some("EXTRA-1".to_owned()),
        ));
        assert!(report.is_clean());
        assert!(!report.is_empty());
        assert_eq!(report.informational().count(), 1);
    }

    #[test]
    fn blocking_entry_dirties_report() {
        let mut report = DiscrepancyReport::new();
        report.push(Discrepancy::new(
            DiscrepancyKind::TotalPriceMismatch,
            "total_price",
            Some("1000.00".to_owned()),
            Some("999.99".to_owned()),
        ));
        assert!(!report.is_clean());
        assert_eq!(report.blocking().count(), 1);
    }

    #[test]
    fn severity_follows_kind() {
        assert_eq!(
            DiscrepancyKind::UnexpectedLineItem.severity(),
            Severity::Informational
        );
        assert_eq!(
            DiscrepancyKind::MissingLineItem.severity(),
            Severity::Blocking
        );
    }
}
