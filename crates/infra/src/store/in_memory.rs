//! In-memory result store for tests and local development.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use ordermatch_reconcile::ReconciliationResult;

use crate::collaborators::{ResultStore, StoreError};

/// `ResultStore` backed by a vector, with failure injection.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: Mutex<Vec<ReconciliationResult>>,
    fail: AtomicBool,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `store` calls fail as unavailable.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<ReconciliationResult> {
        self.results.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn store(&self, result: &ReconciliationResult) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected store failure".into()));
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}
