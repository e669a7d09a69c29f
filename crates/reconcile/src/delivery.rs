//! ERP-facing delivery date computation.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use ordermatch_core::{DeliveryRules, ReconcileError, ReconcileResult};

/// Applies the delivery date business rules to an extracted delivery date
/// and delivery address.
///
/// Pure calendar arithmetic; the result is always a single deterministic
/// date, never a range. There is no business-day or holiday calendar beyond
/// the explicit Saturday case of the default rule.
#[derive(Debug, Clone)]
pub struct DeliveryDateCalculator {
    rules: DeliveryRules,
}

impl DeliveryDateCalculator {
    pub fn new(rules: DeliveryRules) -> Self {
        Self { rules }
    }

    /// Compute the date pushed to the ERP.
    ///
    /// Both rules first subtract the configured lead time in calendar days.
    /// Special addresses (containing both configured tokens) then snap to
    /// the Thursday of the Monday-based week containing the shifted date;
    /// all other addresses step a Saturday back to Friday and otherwise keep
    /// the shifted date.
    pub fn erp_delivery_date(
        &self,
        raw_delivery_date: &str,
        delivery_address: &str,
    ) -> ReconcileResult<NaiveDate> {
        let delivery_date = parse_document_date(raw_delivery_date)?;
        let shifted = delivery_date - Duration::days(self.rules.lead_time_days);

        if self.is_special_address(delivery_address) {
            let to_thursday = i64::from(Weekday::Thu.num_days_from_monday())
                - i64::from(shifted.weekday().num_days_from_monday());
            return Ok(shifted + Duration::days(to_thursday));
        }

        if shifted.weekday() == Weekday::Sat {
            return Ok(shifted - Duration::days(1));
        }
        Ok(shifted)
    }

    fn is_special_address(&self, address: &str) -> bool {
        address.contains(&self.rules.special_street_number)
            && address.contains(&self.rules.special_street_suffix)
    }
}

/// Parse a delivery date as it appears in confirmation documents:
/// `DD.MM.YYYY` or `DD/MM/YYYY`.
pub fn parse_document_date(raw: &str) -> ReconcileResult<NaiveDate> {
    let trimmed = raw.trim();
    for format in ["%d.%m.%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(ReconcileError::invalid_date(format!(
        "expected DD.MM.YYYY or DD/MM/YYYY, got {raw:?}"
    )))
}
