//! Extraction collaborator adapters.

pub mod fixture;
pub mod payload;

pub use fixture::FixtureExtractor;
pub use payload::{ExtractionPayload, ItemRecord, OrderInfo};
