//! Infrastructure layer: collaborator seams, external service clients, and
//! the reconciliation engine that composes them.

pub mod collaborators;
pub mod engine;
pub mod erp;
pub mod extract;
pub mod store;

pub use collaborators::{DocumentExtractor, DocumentPage, ErpSource, ResultStore, StoreError};
pub use engine::ReconciliationEngine;
