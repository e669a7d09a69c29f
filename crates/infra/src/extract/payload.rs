//! Extraction payload wire mapping.
//!
//! The extraction collaborator answers with a JSON document of order-level
//! fields plus one record per line item. Amounts and quantities stay as the
//! raw document text; the reconciler normalizes them at comparison time.

use serde::Deserialize;

use ordermatch_core::{OrderIdentifier, PartCode};
use ordermatch_reconcile::{ExtractedOrder, LineItemExtracted};

/// JSON shape produced by the extraction collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionPayload {
    #[serde(default)]
    pub order_info: OrderInfo,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderInfo {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub customer_po: Option<String>,
    // Older extraction schemas shipped with the misspelled field name.
    #[serde(default, alias = "delivery_adress")]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    pub product_code: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub item_total: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
}

impl ExtractionPayload {
    /// Convert the wire payload into the domain candidate.
    ///
    /// The identifier comes from the validated header pass, not from the
    /// payload's own `customer_po` field.
    pub fn into_order(self, identifier: &OrderIdentifier) -> ExtractedOrder {
        ExtractedOrder {
            identifier: identifier.clone(),
            order_date: self.order_info.order_date,
            delivery_date: self.order_info.delivery_date.unwrap_or_default(),
            customer_number: self.order_info.customer_number,
            delivery_address: self.order_info.delivery_address.unwrap_or_default(),
            total_price: self.order_info.total_price.unwrap_or_default(),
            shipping_cost: self.order_info.shipping_cost,
            line_items: self
                .items
                .into_iter()
                .map(|item| LineItemExtracted {
                    part_code: PartCode::new(item.product_code),
                    price: item.item_total.unwrap_or_default(),
                    quantity: item.quantity.unwrap_or_default(),
                })
                .collect(),
        }
    }
}
