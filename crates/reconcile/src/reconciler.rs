//! Field-level reconciliation of an extracted order against its reference.

use std::collections::HashMap;

use ordermatch_core::{Money, PartCode};

use crate::extracted::{ExtractedOrder, LineItemExtracted};
use crate::reference::ReferenceOrder;
use crate::report::{Discrepancy, DiscrepancyKind, DiscrepancyReport};

/// Compares an extracted order against the ERP reference and produces a
/// `DiscrepancyReport`.
///
/// Pure and deterministic: the same pair of inputs always yields the same
/// report, and normalization failures become discrepancy entries rather than
/// errors. Currency comparison happens on minor units at the configured
/// scale — never on floats.
#[derive(Debug, Clone, Copy)]
pub struct FieldReconciler {
    currency_scale: u8,
}

/// Extracted shipping text after normalization.
enum ExtractedShipping {
    Absent,
    Amount(Money),
    Unparsed(String),
}

impl FieldReconciler {
    pub fn new(currency_scale: u8) -> Self {
        Self { currency_scale }
    }

    pub fn reconcile(
        &self,
        reference: &ReferenceOrder,
        extracted: &ExtractedOrder,
    ) -> DiscrepancyReport {
        let mut report = DiscrepancyReport::new();

        let extracted_by_code: HashMap<&PartCode, &LineItemExtracted> = extracted
            .line_items
            .iter()
            .map(|item| (&item.part_code, item))
            .collect();

        self.check_coverage(reference, &extracted_by_code, &mut report);
        self.check_total_price(reference, extracted, &mut report);
        self.check_shipping(reference, extracted, &mut report);
        self.check_unexpected_items(reference, extracted, &mut report);

        report
    }

    /// Every reference part code must appear in the extraction; matched
    /// lines are compared field by field.
    fn check_coverage(
        &self,
        reference: &ReferenceOrder,
        extracted_by_code: &HashMap<&PartCode, &LineItemExtracted>,
        report: &mut DiscrepancyReport,
    ) {
        for line in &reference.line_items {
            let Some(item) = extracted_by_code.get(&line.part_code) else {
                report.push(Discrepancy::new(
                    DiscrepancyKind::MissingLineItem,
                    format!("line_items.{}", line.part_code),
                    Some(line.part_code.to_string()),
                    None,
                ));
                continue;
            };

            match parse_quantity(&item.quantity) {
                Some(quantity) if quantity == line.expected_quantity => {}
                Some(quantity) => report.push(Discrepancy::new(
                    DiscrepancyKind::LineItemMismatch,
                    format!("line_items.{}.quantity", line.part_code),
                    Some(line.expected_quantity.to_string()),
                    Some(quantity.to_string()),
                )),
                None => report.push(Discrepancy::new(
                    DiscrepancyKind::LineItemMismatch,
                    format!("line_items.{}.quantity", line.part_code),
                    Some(line.expected_quantity.to_string()),
                    Some(item.quantity.clone()),
                )),
            }

            match Money::parse_lenient(&item.price, self.currency_scale) {
                Ok(price) if price == line.expected_price => {}
                Ok(price) => report.push(Discrepancy::new(
                    DiscrepancyKind::LineItemMismatch,
                    format!("line_items.{}.price", line.part_code),
                    Some(line.expected_price.to_string()),
                    Some(price.to_string()),
                )),
                Err(_) => report.push(Discrepancy::new(
                    DiscrepancyKind::LineItemMismatch,
                    format!("line_items.{}.price", line.part_code),
                    Some(line.expected_price.to_string()),
                    Some(item.price.clone()),
                )),
            }
        }
    }

    fn check_total_price(
        &self,
        reference: &ReferenceOrder,
        extracted: &ExtractedOrder,
        report: &mut DiscrepancyReport,
    ) {
        match Money::parse_lenient(&extracted.total_price, self.currency_scale) {
            Ok(total) if total == reference.expected_total_price => {}
            Ok(total) => report.push(Discrepancy::new(
                DiscrepancyKind::TotalPriceMismatch,
                "total_price",
                Some(reference.expected_total_price.to_string()),
                Some(total.to_string()),
            )),
            Err(_) => report.push(Discrepancy::new(
                DiscrepancyKind::TotalPriceMismatch,
                "total_price",
                Some(reference.expected_total_price.to_string()),
                Some(extracted.total_price.clone()),
            )),
        }
    }

    /// Shipping has four cases: both sides present (exact compare), either
    /// side alone (mismatch), neither (nothing to report). A document that
    /// shows a zero shipping charge counts as having none.
    fn check_shipping(
        &self,
        reference: &ReferenceOrder,
        extracted: &ExtractedOrder,
        report: &mut DiscrepancyReport,
    ) {
        let document_shipping = match &extracted.shipping_cost {
            None => ExtractedShipping::Absent,
            Some(raw) => match Money::parse_lenient(raw, self.currency_scale) {
                Ok(amount) if amount.is_zero() => ExtractedShipping::Absent,
                Ok(amount) => ExtractedShipping::Amount(amount),
                Err(_) if raw.trim().is_empty() => ExtractedShipping::Absent,
                Err(_) => ExtractedShipping::Unparsed(raw.clone()),
            },
        };

        match (&reference.expected_shipping_cost, document_shipping) {
            (Some(expected), ExtractedShipping::Amount(actual)) if *expected == actual => {}
            (Some(expected), ExtractedShipping::Amount(actual)) => {
                report.push(Discrepancy::new(
                    DiscrepancyKind::ShippingMismatch,
                    "shipping_cost",
                    Some(expected.to_string()),
                    Some(actual.to_string()),
                ));
            }
            (Some(expected), ExtractedShipping::Absent) => {
                report.push(Discrepancy::new(
                    DiscrepancyKind::ShippingMismatch,
                    "shipping_cost",
                    Some(expected.to_string()),
                    None,
                ));
            }
            (Some(expected), ExtractedShipping::Unparsed(raw)) => {
                report.push(Discrepancy::new(
                    DiscrepancyKind::ShippingMismatch,
                    "shipping_cost",
                    Some(expected.to_string()),
                    Some(raw),
                ));
            }
            (None, ExtractedShipping::Amount(actual)) => {
                report.push(Discrepancy::new(
                    DiscrepancyKind::ShippingMismatch,
                    "shipping_cost",
                    None,
                    Some(actual.to_string()),
                ));
            }
            (None, ExtractedShipping::Unparsed(raw)) => {
                report.push(Discrepancy::new(
                    DiscrepancyKind::ShippingMismatch,
                    "shipping_cost",
                    None,
                    Some(raw),
                ));
            }
            (None, ExtractedShipping::Absent) => {}
        }
    }

    /// Extracted lines with no reference counterpart do not prevent approval
    /// but are surfaced for audit.
    fn check_unexpected_items(
        &self,
        reference: &ReferenceOrder,
        extracted: &ExtractedOrder,
        report: &mut DiscrepancyReport,
    ) {
        for item in &extracted.line_items {
            if reference.line(&item.part_code).is_none() {
                report.push(Discrepancy::new(
                    DiscrepancyKind::UnexpectedLineItem,
                    format!("line_items.{}", item.part_code),
                    None,
                    Some(item.part_code.to_string()),
                ));
            }
        }
    }
}

/// Extract the leading quantity from document text like `"1 EA"` or `"10"`.
fn parse_quantity(raw: &str) -> Option<i64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let run = &raw[start..];
    let end = run
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(run.len());
    run[..end].parse().ok()
}
