//! Strongly-typed identifiers used across the reconciliation pipeline.

use core::fmt;
use core::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReconcileError, ReconcileResult};

const IDENTIFIER_PREFIX: &str = "PO";
const IDENTIFIER_DIGITS: usize = 10;
const IDENTIFIER_LEN: usize = 12;

/// Shipping charge lines in the ERP carry part codes with this prefix.
const SHIPPING_PREFIX: &str = "SH";

static LABELED_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Customer PO:\s*([A-Za-z0-9_-]+)").expect("valid regex"));
static BARE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPO\d{10}\b").expect("valid regex"));

/// Customer purchase-order identifier: exactly `PO` followed by 10 digits.
///
/// Reconciliation cannot proceed without a valid identifier, so construction
/// goes through the validating constructors only. Validation never truncates
/// or pads — a near-miss token is an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderIdentifier(String);

impl OrderIdentifier {
    /// Validate a single token as an order identifier.
    pub fn parse(token: &str) -> ReconcileResult<Self> {
        let token = token.trim();
        if token.len() != IDENTIFIER_LEN {
            return Err(ReconcileError::invalid_identifier(format!(
                "expected {IDENTIFIER_LEN} characters, got {} in {token:?}",
                token.len()
            )));
        }
        if !token.starts_with(IDENTIFIER_PREFIX) {
            return Err(ReconcileError::invalid_identifier(format!(
                "expected {IDENTIFIER_PREFIX:?} prefix in {token:?}"
            )));
        }
        if !token[IDENTIFIER_PREFIX.len()..]
            .bytes()
            .all(|b| b.is_ascii_digit())
        {
            return Err(ReconcileError::invalid_identifier(format!(
                "expected {IDENTIFIER_DIGITS} digits after {IDENTIFIER_PREFIX:?} in {token:?}"
            )));
        }
        Ok(Self(token.to_owned()))
    }

    /// Locate the customer purchase-order identifier in raw header text.
    ///
    /// A labeled `Customer PO:` token is authoritative: when the label is
    /// present its token must validate (the extractor's `NOT_FOUND` marker
    /// included). Without a label, a word-bounded `PO` + 10-digit token
    /// anywhere in the text is accepted.
    pub fn find_in_text(text: &str) -> ReconcileResult<Self> {
        if let Some(caps) = LABELED_IDENTIFIER.captures(text) {
            let token = caps.get(1).expect("capture group").as_str();
            if token == "NOT_FOUND" {
                return Err(ReconcileError::invalid_identifier(
                    "extractor reported no identifier in the document header",
                ));
            }
            return Self::parse(token);
        }
        if let Some(m) = BARE_IDENTIFIER.find(text) {
            return Self::parse(m.as_str());
        }
        Err(ReconcileError::invalid_identifier(format!(
            "no purchase order identifier in header text {text:?}"
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderIdentifier {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderIdentifier {
    type Error = ReconcileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderIdentifier> for String {
    fn from(value: OrderIdentifier) -> Self {
        value.0
    }
}

/// ERP part identifier (the reference side calls this a part name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartCode(String);

impl PartCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this code denotes an ERP shipping charge line rather than goods.
    pub fn is_shipping(&self) -> bool {
        self.0.starts_with(SHIPPING_PREFIX)
    }
}

impl fmt::Display for PartCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of one reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationId(Uuid);

impl ReconciliationId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReconciliationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReconciliationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_po_plus_ten_digits() {
        let id = OrderIdentifier::parse("PO2410000285").unwrap();
        assert_eq!(id.as_str(), "PO2410000285");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = OrderIdentifier::parse("PO241000028").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));

        let err = OrderIdentifier::parse("PO24100002851").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let err = OrderIdentifier::parse("SO2410000285").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn parse_rejects_non_digit_suffix() {
        let err = OrderIdentifier::parse("PO24100002X5").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn parse_does_not_pad_short_tokens() {
        // A missing leading zero must surface as an error, not be repaired.
        let err = OrderIdentifier::parse("PO241000285").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn find_in_text_reads_labeled_token() {
        let id = OrderIdentifier::find_in_text("Customer PO: PO2410000285").unwrap();
        assert_eq!(id.as_str(), "PO2410000285");
    }

    #[test]
    fn find_in_text_rejects_invalid_labeled_token() {
        let err = OrderIdentifier::find_in_text("Customer PO: PO241000285").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn find_in_text_rejects_not_found_marker() {
        let err = OrderIdentifier::find_in_text("Customer PO: NOT_FOUND").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn find_in_text_falls_back_to_bare_token() {
        let id = OrderIdentifier::find_in_text("Your Order PO2410000285 dated 12.03.2025").unwrap();
        assert_eq!(id.as_str(), "PO2410000285");
    }

    #[test]
    fn find_in_text_does_not_truncate_overlong_tokens() {
        // 11 digits: the word boundary must not carve a 10-digit identifier
        // out of a longer run.
        let err = OrderIdentifier::find_in_text("order PO24100002851 attached").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn part_code_shipping_prefix() {
        assert!(PartCode::new("SH-STANDARD").is_shipping());
        assert!(!PartCode::new("G8888-68888").is_shipping());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: only `PO` + 10 digits ever parses.
            #[test]
            fn parse_matches_format_exactly(token in "[A-Z0-9]{0,16}") {
                let expected = token.len() == 12
                    && token.starts_with("PO")
                    && token[2..].bytes().all(|b| b.is_ascii_digit());
                prop_assert_eq!(OrderIdentifier::parse(&token).is_ok(), expected);
            }

            /// Property: a valid identifier round-trips through header text.
            #[test]
            fn valid_identifier_is_found_in_header(digits in "[0-9]{10}") {
                let token = format!("PO{digits}");
                let text = format!("Customer PO: {token}");
                let id = OrderIdentifier::find_in_text(&text).unwrap();
                prop_assert_eq!(id.as_str(), token.as_str());
            }
        }
    }
}
