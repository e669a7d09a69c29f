//! In-memory ERP for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use ordermatch_core::{OrderIdentifier, ReconcileError, ReconcileResult};
use ordermatch_reconcile::{OrderStatus, ReferenceOrder};

use crate::collaborators::ErpSource;

/// One write-back the engine issued against this ERP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub identifier: OrderIdentifier,
    pub delivery_date: NaiveDate,
    pub status: OrderStatus,
}

/// `ErpSource` backed by a map, with failure and latency injection.
///
/// Shared across the engine and the test via `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryErp {
    orders: Mutex<HashMap<OrderIdentifier, ReferenceOrder>>,
    updates: Mutex<Vec<RecordedUpdate>>,
    fetches: AtomicUsize,
    fail_updates: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryErp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: ReferenceOrder) {
        self.orders
            .lock()
            .unwrap()
            .insert(order.identifier.clone(), order);
    }

    /// Make subsequent `update_order` calls fail as unavailable.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Delay every call by `latency` (for timeout tests).
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn apply_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ErpSource for InMemoryErp {
    async fn fetch_reference(
        &self,
        identifier: &OrderIdentifier,
    ) -> ReconcileResult<ReferenceOrder> {
        self.apply_latency().await;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.orders
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .ok_or_else(|| ReconcileError::not_found(identifier.as_str()))
    }

    async fn update_order(
        &self,
        identifier: &OrderIdentifier,
        delivery_date: NaiveDate,
        status: OrderStatus,
    ) -> ReconcileResult<()> {
        self.apply_latency().await;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ReconcileError::upstream("injected update failure"));
        }
        self.updates.lock().unwrap().push(RecordedUpdate {
            identifier: identifier.clone(),
            delivery_date,
            status,
        });
        Ok(())
    }
}
