//! Collaborator seams for the reconciliation pipeline.
//!
//! The document extractor, the ERP source and the persistence store are
//! external systems. They are modeled as traits so the engine composes
//! against seams: production wires the OData client, tests wire the
//! in-memory implementations. Both I/O seams run under the engine's bounded
//! timeout; neither is retried here (retry policy belongs to the transport
//! layer).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use ordermatch_core::{OrderIdentifier, PartCode, ReconcileResult};
use ordermatch_reconcile::{ExtractedOrder, OrderStatus, ReconciliationResult, ReferenceOrder};

/// One rendered page of a confirmation document, as handed over by the
/// transport layer. Rendering strategy (resolution, batching) is the
/// transport's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage {
    pub image: Vec<u8>,
}

impl DocumentPage {
    pub fn new(image: Vec<u8>) -> Self {
        Self { image }
    }
}

/// Document-to-structured-data extraction collaborator.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// First-pass read of the document header. Returns the raw text the
    /// order identifier is then located in and validated from.
    async fn extract_header(&self, pages: &[DocumentPage]) -> ReconcileResult<String>;

    /// Full-document extraction of the candidate order.
    ///
    /// `expected_part_codes` narrows the extraction to the ERP's known
    /// lines — a performance/accuracy optimization, not a correctness
    /// requirement.
    async fn extract(
        &self,
        pages: &[DocumentPage],
        expected_part_codes: Option<&[PartCode]>,
    ) -> ReconcileResult<ExtractedOrder>;
}

/// ERP system-of-record collaborator.
#[async_trait]
pub trait ErpSource: Send + Sync {
    /// Fetch the authoritative order record.
    ///
    /// `IdentifierNotFound` when the ERP has no matching record — distinct
    /// from transport/auth failures, which are `UpstreamUnavailable`.
    async fn fetch_reference(
        &self,
        identifier: &OrderIdentifier,
    ) -> ReconcileResult<ReferenceOrder>;

    /// Push the computed delivery date and resolved status back to the ERP.
    ///
    /// The engine turns a failure here into `erp_update_ack = false` on the
    /// result; it is reported, not fatal.
    async fn update_order(
        &self,
        identifier: &OrderIdentifier,
        delivery_date: NaiveDate,
        status: OrderStatus,
    ) -> ReconcileResult<()>;
}

/// Persistence failure. Never invalidates an already-computed
/// reconciliation; the engine logs it and moves on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store unavailable: {0}")]
    Unavailable(String),
}

/// Audit/storage collaborator for finished reconciliations.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn store(&self, result: &ReconciliationResult) -> Result<(), StoreError>;
}

#[async_trait]
impl<T> DocumentExtractor for Arc<T>
where
    T: DocumentExtractor + ?Sized,
{
    async fn extract_header(&self, pages: &[DocumentPage]) -> ReconcileResult<String> {
        (**self).extract_header(pages).await
    }

    async fn extract(
        &self,
        pages: &[DocumentPage],
        expected_part_codes: Option<&[PartCode]>,
    ) -> ReconcileResult<ExtractedOrder> {
        (**self).extract(pages, expected_part_codes).await
    }
}

#[async_trait]
impl<T> ErpSource for Arc<T>
where
    T: ErpSource + ?Sized,
{
    async fn fetch_reference(
        &self,
        identifier: &OrderIdentifier,
    ) -> ReconcileResult<ReferenceOrder> {
        (**self).fetch_reference(identifier).await
    }

    async fn update_order(
        &self,
        identifier: &OrderIdentifier,
        delivery_date: NaiveDate,
        status: OrderStatus,
    ) -> ReconcileResult<()> {
        (**self).update_order(identifier, delivery_date, status).await
    }
}

#[async_trait]
impl<T> ResultStore for Arc<T>
where
    T: ResultStore + ?Sized,
{
    async fn store(&self, result: &ReconciliationResult) -> Result<(), StoreError> {
        (**self).store(result).await
    }
}
