//! Canned extractor for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;

use ordermatch_core::{PartCode, ReconcileError, ReconcileResult};
use ordermatch_reconcile::ExtractedOrder;

use crate::collaborators::{DocumentExtractor, DocumentPage};

/// `DocumentExtractor` that returns preset answers and records the part
/// codes the engine scoped the extraction with.
#[derive(Debug)]
pub struct FixtureExtractor {
    header: String,
    order: Option<ExtractedOrder>,
    scoped_codes: Mutex<Option<Vec<PartCode>>>,
}

impl FixtureExtractor {
    pub fn new(header: impl Into<String>, order: ExtractedOrder) -> Self {
        Self {
            header: header.into(),
            order: Some(order),
            scoped_codes: Mutex::new(None),
        }
    }

    /// Extractor whose full-document pass fails with `ExtractionFailed`.
    pub fn failing(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            order: None,
            scoped_codes: Mutex::new(None),
        }
    }

    /// Part codes received on the last `extract` call, if any.
    pub fn scoped_codes(&self) -> Option<Vec<PartCode>> {
        self.scoped_codes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentExtractor for FixtureExtractor {
    async fn extract_header(&self, _pages: &[DocumentPage]) -> ReconcileResult<String> {
        Ok(self.header.clone())
    }

    async fn extract(
        &self,
        _pages: &[DocumentPage],
        expected_part_codes: Option<&[PartCode]>,
    ) -> ReconcileResult<ExtractedOrder> {
        *self.scoped_codes.lock().unwrap() = expected_part_codes.map(<[PartCode]>::to_vec);
        self.order
            .clone()
            .ok_or_else(|| ReconcileError::extraction("no fixture order configured"))
    }
}
