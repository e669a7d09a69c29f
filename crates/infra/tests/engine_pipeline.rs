use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use ordermatch_core::{EngineConfig, Money, OrderIdentifier, PartCode, ReconcileError};
use ordermatch_infra::collaborators::DocumentPage;
use ordermatch_infra::engine::ReconciliationEngine;
use ordermatch_infra::erp::InMemoryErp;
use ordermatch_infra::extract::FixtureExtractor;
use ordermatch_infra::store::InMemoryResultStore;
use ordermatch_reconcile::{
    DiscrepancyKind, ExtractedOrder, LineItemExtracted, LineItemReference, OrderStatus,
    ReferenceOrder,
};

const HEADER: &str = "Customer PO: PO2410000285";

fn identifier() -> OrderIdentifier {
    OrderIdentifier::parse("PO2410000285").unwrap()
}

fn money(minor: i64) -> Money {
    Money::from_minor_units(minor, 2)
}

fn reference() -> ReferenceOrder {
    ReferenceOrder {
        identifier: identifier(),
        line_items: vec![LineItemReference {
            part_code: PartCode::new("G8888-68888"),
            expected_price: money(38_304),
            expected_quantity: 1,
        }],
        expected_shipping_cost: None,
        expected_total_price: money(38_304),
        expected_delivery_date: None,
        delivery_address: None,
    }
}

fn extraction() -> ExtractedOrder {
    ExtractedOrder {
        identifier: identifier(),
        order_date: Some("10.03.2025".to_owned()),
        delivery_date: "19.03.2025".to_owned(),
        customer_number: Some("118222".to_owned()),
        delivery_address: "3 Hamada St., Rehovot".to_owned(),
        total_price: "USD 383.04".to_owned(),
        shipping_cost: None,
        line_items: vec![LineItemExtracted {
            part_code: PartCode::new("G8888-68888"),
            price: "USD 383.04".to_owned(),
            quantity: "1 EA".to_owned(),
        }],
    }
}

fn pages() -> Vec<DocumentPage> {
    vec![DocumentPage::new(vec![0xFF, 0xD8, 0xFF])]
}

type TestEngine = ReconciliationEngine<FixtureExtractor, Arc<InMemoryErp>, Arc<InMemoryResultStore>>;

fn engine(
    extractor: FixtureExtractor,
    erp: &Arc<InMemoryErp>,
    store: &Arc<InMemoryResultStore>,
    config: EngineConfig,
) -> TestEngine {
    ReconciliationEngine::new(extractor, Arc::clone(erp), Arc::clone(store), config)
}

#[tokio::test]
async fn clean_order_approves_updates_and_stores() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction()),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let result = engine.reconcile(&pages()).await.unwrap();

    assert_eq!(result.identifier, identifier());
    assert_eq!(result.status, OrderStatus::SupplierApproval);
    assert!(result.discrepancies.is_clean());
    assert!(result.erp_update_ack);
    // Wednesday 2025-03-19 minus 6 days, no Saturday collision.
    assert_eq!(
        result.computed_delivery_date,
        NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()
    );

    let updates = erp.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].identifier, identifier());
    assert_eq!(updates[0].delivery_date, result.computed_delivery_date);
    assert_eq!(updates[0].status, OrderStatus::SupplierApproval);

    let stored = store.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], result);
}

#[tokio::test]
async fn discrepant_order_is_sent_to_supplier_not_failed() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());

    let mut extraction = extraction();
    extraction.total_price = "USD 999.99".to_owned();
    extraction.line_items.clear();
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let result = engine.reconcile(&pages()).await.unwrap();

    assert_eq!(result.status, OrderStatus::SentToSupplier);
    let kinds: Vec<_> = result
        .discrepancies
        .entries()
        .iter()
        .map(|d| d.kind)
        .collect();
    assert!(kinds.contains(&DiscrepancyKind::MissingLineItem));
    assert!(kinds.contains(&DiscrepancyKind::TotalPriceMismatch));
    // Discrepant orders still update the ERP (with the downgraded status).
    assert!(result.erp_update_ack);
    assert_eq!(erp.updates()[0].status, OrderStatus::SentToSupplier);
}

#[tokio::test]
async fn erp_update_failure_flips_only_the_ack() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    erp.fail_updates(true);
    let store = Arc::new(InMemoryResultStore::new());
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction()),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let result = engine.reconcile(&pages()).await.unwrap();

    assert!(!result.erp_update_ack);
    // Everything else is what the successful flow computes.
    assert_eq!(result.status, OrderStatus::SupplierApproval);
    assert!(result.discrepancies.is_clean());
    assert_eq!(
        result.computed_delivery_date,
        NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()
    );
    assert_eq!(store.stored().len(), 1);
}

#[tokio::test]
async fn unknown_identifier_is_terminal_not_found() {
    let erp = Arc::new(InMemoryErp::new());
    let store = Arc::new(InMemoryResultStore::new());
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction()),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let err = engine.reconcile(&pages()).await.unwrap_err();
    assert!(matches!(err, ReconcileError::IdentifierNotFound(_)));
    assert!(store.stored().is_empty());
}

#[tokio::test]
async fn malformed_identifier_fails_fast_without_erp_io() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());
    let engine = engine(
        FixtureExtractor::new("Customer PO: PO241000285", extraction()),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let err = engine.reconcile(&pages()).await.unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    assert_eq!(erp.fetch_count(), 0);
}

#[tokio::test]
async fn scoped_extraction_passes_expected_part_codes() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());

    let extractor = Arc::new(FixtureExtractor::new(HEADER, extraction()));
    let engine = ReconciliationEngine::new(
        Arc::clone(&extractor),
        Arc::clone(&erp),
        Arc::clone(&store),
        EngineConfig::default(),
    );
    engine.reconcile(&pages()).await.unwrap();
    assert_eq!(
        extractor.scoped_codes(),
        Some(vec![PartCode::new("G8888-68888")])
    );

    let extractor = Arc::new(FixtureExtractor::new(HEADER, extraction()));
    let config = EngineConfig {
        scoped_extraction: false,
        ..EngineConfig::default()
    };
    let engine =
        ReconciliationEngine::new(Arc::clone(&extractor), Arc::clone(&erp), store, config);
    engine.reconcile(&pages()).await.unwrap();
    assert_eq!(extractor.scoped_codes(), None);
}

#[tokio::test]
async fn extraction_failure_is_terminal() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());
    let engine = engine(
        FixtureExtractor::failing(HEADER),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let err = engine.reconcile(&pages()).await.unwrap_err();
    assert!(matches!(err, ReconcileError::ExtractionFailed(_)));
}

#[tokio::test]
async fn invalid_delivery_date_is_terminal() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());

    let mut extraction = extraction();
    extraction.delivery_date = "as soon as possible".to_owned();
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let err = engine.reconcile(&pages()).await.unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidDate(_)));
    // No write-back happens for a failed reconciliation.
    assert!(erp.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_upstream_surfaces_as_unavailable() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    erp.set_latency(Duration::from_secs(120));
    let store = Arc::new(InMemoryResultStore::new());

    let config = EngineConfig {
        upstream_timeout: Duration::from_secs(5),
        ..EngineConfig::default()
    };
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction()),
        &erp,
        &store,
        config,
    );

    let err = engine.reconcile(&pages()).await.unwrap_err();
    assert!(matches!(err, ReconcileError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn store_failure_does_not_invalidate_the_result() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());
    store.fail(true);
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction()),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let result = engine.reconcile(&pages()).await.unwrap();
    assert_eq!(result.status, OrderStatus::SupplierApproval);
    assert!(result.erp_update_ack);
    assert!(store.stored().is_empty());
}

#[tokio::test]
async fn special_address_order_lands_on_thursday() {
    let erp = Arc::new(InMemoryErp::new());
    erp.insert(reference());
    let store = Arc::new(InMemoryResultStore::new());

    let mut extraction = extraction();
    extraction.delivery_address = "12 Bet Hadfus St., Jerusalem".to_owned();
    extraction.delivery_date = "22.03.2025".to_owned();
    let engine = engine(
        FixtureExtractor::new(HEADER, extraction),
        &erp,
        &store,
        EngineConfig::default(),
    );

    let result = engine.reconcile(&pages()).await.unwrap();
    // Shifted date 2025-03-16 (Sunday) snaps to that week's Thursday.
    assert_eq!(
        result.computed_delivery_date,
        NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()
    );
}
