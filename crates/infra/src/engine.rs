//! Reconciliation pipeline orchestration.
//!
//! The engine composes the collaborator seams and contains no comparison
//! logic of its own. Each request is an independent, stateless unit of work
//! over its two inputs; no state is shared across requests. Concurrent
//! requests for the same identifier are not ordered — the last ERP update
//! wins (known limitation).
//!
//! ## Pipeline
//!
//! ```text
//! header text ─→ identifier (fail fast, no I/O)
//!   ↓
//! ERP reference fetch ──┐ (concurrent when extraction is unscoped)
//! document extraction ──┘
//!   ↓ join
//! field reconciler + delivery date calculator (pure)
//!   ↓
//! status resolution → ERP update (ack flag) → result store (fire-and-forget)
//! ```

use std::future::Future;

use chrono::Utc;
use tracing::{info, instrument, warn};

use ordermatch_core::{
    EngineConfig, OrderIdentifier, ReconcileError, ReconcileResult, ReconciliationId,
};
use ordermatch_reconcile::{
    DeliveryDateCalculator, ExtractedOrder, FieldReconciler, OrderStatus, ReconciliationResult,
    ReferenceOrder,
};

use crate::collaborators::{DocumentExtractor, DocumentPage, ErpSource, ResultStore};

/// Orchestrates one reconciliation per call.
///
/// Generic over its collaborators so production composes the OData client
/// while tests compose the in-memory implementations.
#[derive(Debug)]
pub struct ReconciliationEngine<X, E, S> {
    extractor: X,
    erp: E,
    store: S,
    reconciler: FieldReconciler,
    calculator: DeliveryDateCalculator,
    config: EngineConfig,
}

impl<X, E, S> ReconciliationEngine<X, E, S>
where
    X: DocumentExtractor,
    E: ErpSource,
    S: ResultStore,
{
    pub fn new(extractor: X, erp: E, store: S, config: EngineConfig) -> Self {
        Self {
            reconciler: FieldReconciler::new(config.currency_scale),
            calculator: DeliveryDateCalculator::new(config.delivery.clone()),
            extractor,
            erp,
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one reconciliation over an uploaded document.
    ///
    /// Terminal failures return a typed error; discrepancies and a failed
    /// ERP write-back are part of a successful result.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub async fn reconcile(
        &self,
        pages: &[DocumentPage],
    ) -> ReconcileResult<ReconciliationResult> {
        let header = self
            .bounded(self.extractor.extract_header(pages), "header extraction")
            .await?;
        let identifier = OrderIdentifier::find_in_text(&header)?;
        info!(%identifier, "identifier extracted");

        let (reference, extracted) = self.gather(&identifier, pages).await?;

        let report = self.reconciler.reconcile(&reference, &extracted);
        let delivery_date = self
            .calculator
            .erp_delivery_date(&extracted.delivery_date, &extracted.delivery_address)?;
        let status = OrderStatus::resolve(&report);

        let erp_update_ack = match self
            .bounded(
                self.erp.update_order(&identifier, delivery_date, status),
                "ERP update",
            )
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(%identifier, %err, "ERP update failed; result kept");
                false
            }
        };

        let result = ReconciliationResult {
            id: ReconciliationId::new(),
            identifier,
            discrepancies: report,
            computed_delivery_date: delivery_date,
            status,
            erp_update_ack,
            completed_at: Utc::now(),
        };

        if let Err(err) = self.store.store(&result).await {
            // Fire-and-forget: storage failure never invalidates the result.
            warn!(identifier = %result.identifier, %err, "result store failed");
        }

        info!(
            identifier = %result.identifier,
            status = ?result.status,
            discrepancies = result.discrepancies.entries().len(),
            erp_update_ack = result.erp_update_ack,
            "reconciliation complete"
        );
        Ok(result)
    }

    /// Fetch the ERP reference and the extraction.
    ///
    /// Scoped (default): the fetch runs first so its part codes narrow the
    /// extraction. Unscoped: the two independent reads run concurrently and
    /// join before the pure steps.
    async fn gather(
        &self,
        identifier: &OrderIdentifier,
        pages: &[DocumentPage],
    ) -> ReconcileResult<(ReferenceOrder, ExtractedOrder)> {
        if self.config.scoped_extraction {
            let reference = self
                .bounded(self.erp.fetch_reference(identifier), "ERP fetch")
                .await?;
            let part_codes = reference.part_codes();
            let extracted = self
                .bounded(
                    self.extractor.extract(pages, Some(&part_codes)),
                    "document extraction",
                )
                .await?;
            Ok((reference, extracted))
        } else {
            tokio::try_join!(
                self.bounded(self.erp.fetch_reference(identifier), "ERP fetch"),
                self.bounded(self.extractor.extract(pages, None), "document extraction"),
            )
        }
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = ReconcileResult<T>>,
        what: &str,
    ) -> ReconcileResult<T> {
        match tokio::time::timeout(self.config.upstream_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(ReconcileError::upstream(format!(
                "{what} timed out after {:?}",
                self.config.upstream_timeout
            ))),
        }
    }
}
