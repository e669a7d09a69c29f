//! Authoritative ERP order record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ordermatch_core::{Money, OrderIdentifier, PartCode};

/// One expected goods line from the ERP record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemReference {
    pub part_code: PartCode,
    pub expected_price: Money,
    pub expected_quantity: i64,
}

/// The ERP's authoritative version of an order, used as ground truth for one
/// reconciliation. Immutable once fetched; the resolver owns it for the
/// duration of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOrder {
    pub identifier: OrderIdentifier,
    /// Goods lines in ERP line order. Shipping charge lines are not goods;
    /// they are folded into `expected_shipping_cost` by the resolver.
    pub line_items: Vec<LineItemReference>,
    /// Total of the ERP's shipping charge lines; `None` when the order
    /// carries none.
    pub expected_shipping_cost: Option<Money>,
    pub expected_total_price: Money,
    pub expected_delivery_date: Option<NaiveDate>,
    /// Not every ERP record carries a delivery address; the date rules use
    /// the extracted address.
    pub delivery_address: Option<String>,
}

impl ReferenceOrder {
    /// Expected part codes in line order. Passed to the extraction
    /// collaborator to scope its work.
    pub fn part_codes(&self) -> Vec<PartCode> {
        self.line_items
            .iter()
            .map(|line| line.part_code.clone())
            .collect()
    }

    pub fn line(&self, part_code: &PartCode) -> Option<&LineItemReference> {
        self.line_items
            .iter()
            .find(|line| &line.part_code == part_code)
    }
}
