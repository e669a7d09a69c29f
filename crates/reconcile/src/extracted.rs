//! AI-extracted candidate order.

use serde::{Deserialize, Serialize};

use ordermatch_core::{OrderIdentifier, PartCode};

/// One line item as read off the confirmation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemExtracted {
    pub part_code: PartCode,
    /// Raw price text, e.g. `"USD 383.04"`.
    pub price: String,
    /// Raw quantity text, e.g. `"1 EA"`.
    pub quantity: String,
}

/// Candidate order produced by the extraction collaborator.
///
/// Untrusted input: it is read, never mutated. Amounts, quantities and dates
/// keep their raw extracted text until the reconciler or the delivery date
/// calculator normalizes them at comparison time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedOrder {
    pub identifier: OrderIdentifier,
    pub order_date: Option<String>,
    /// Raw delivery date text, e.g. `"19.03.2025"`.
    pub delivery_date: String,
    pub customer_number: Option<String>,
    pub delivery_address: String,
    /// Raw order total text, e.g. `"USD 7.157,16"`.
    pub total_price: String,
    /// Raw shipping charge text; `None` when the document shows none.
    pub shipping_cost: Option<String>,
    pub line_items: Vec<LineItemExtracted>,
}
