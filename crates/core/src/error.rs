//! Reconciliation error model.

use thiserror::Error;

/// Result type used across the reconciliation pipeline.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Terminal reconciliation failure.
///
/// Keep this focused on failures that abort a reconciliation before a result
/// can be produced. Discrepancies found while comparing orders are *data*
/// (they travel in the `DiscrepancyReport` of a successful result), and a
/// failed ERP write-back is surfaced as `erp_update_ack = false` on the
/// result — neither belongs here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The customer purchase-order identifier is malformed. Fails fast; no
    /// upstream I/O is attempted.
    #[error("invalid purchase order identifier: {0}")]
    InvalidIdentifierFormat(String),

    /// The ERP has no record for the identifier.
    #[error("purchase order not found in ERP: {0}")]
    IdentifierNotFound(String),

    /// Transport/auth failure or timeout against an upstream (ERP or
    /// extraction). Transient; this component does not retry internally.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The extraction collaborator could not produce a candidate order.
    #[error("document extraction failed: {0}")]
    ExtractionFailed(String),

    /// The extracted delivery date could not be parsed.
    #[error("invalid delivery date: {0}")]
    InvalidDate(String),
}

impl ReconcileError {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifierFormat(msg.into())
    }

    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::IdentifierNotFound(identifier.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed(msg.into())
    }

    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }
}
