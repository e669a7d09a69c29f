//! Fixed-point money.
//!
//! Amounts are stored as signed integer minor units at an explicit decimal
//! scale. All domain comparisons happen on minor units; binary floating point
//! never participates in an equality check.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A monetary string that could not be normalized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unparseable amount: {0:?}")]
pub struct MoneyParseError(pub String);

/// Monetary amount in minor units (e.g. cents at scale 2).
///
/// Comparisons are only meaningful between values at the same scale; one
/// reconciliation normalizes both sides with the scale from its
/// `EngineConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    scale: u8,
}

impl Money {
    pub fn from_minor_units(minor_units: i64, scale: u8) -> Self {
        Self { minor_units, scale }
    }

    pub fn zero(scale: u8) -> Self {
        Self::from_minor_units(0, scale)
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Sum two amounts. `None` on overflow or scale mismatch.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.scale != other.scale {
            return None;
        }
        Some(Self {
            minor_units: self.minor_units.checked_add(other.minor_units)?,
            scale: self.scale,
        })
    }

    /// Parse a plain decimal string (`"1000.00"`, `"-12.5"`).
    ///
    /// For authoritative values whose format is known. Anything beyond an
    /// optional sign, digits and one decimal point is rejected.
    pub fn parse_strict(input: &str, scale: u8) -> Result<Self, MoneyParseError> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        Self::assemble(int_part, frac_part, negative, scale, input)
    }

    /// Normalize an extracted monetary string.
    ///
    /// Handles what order confirmation documents actually contain: currency
    /// words and symbols (`"USD 383.04"`), US separators (`"1,234.56"`),
    /// European separators (`"7.157,16"`), bare decimal commas (`"383,04"`)
    /// and trailing-dash negatives (`"383,04-"`).
    pub fn parse_lenient(input: &str, scale: u8) -> Result<Self, MoneyParseError> {
        let mut cleaned: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
            .collect();

        let mut negative = false;
        if cleaned.ends_with('-') {
            negative = true;
            cleaned.pop();
        } else if cleaned.starts_with('-') {
            negative = true;
            cleaned.remove(0);
        }
        if cleaned.is_empty() || cleaned.contains('-') {
            return Err(MoneyParseError(input.to_owned()));
        }

        let canonical = Self::canonicalize_separators(&cleaned, scale);
        let (int_part, frac_part) = match canonical.split_once('.') {
            Some((i, f)) => (i, f),
            None => (canonical.as_str(), ""),
        };
        Self::assemble(int_part, frac_part, negative, scale, input)
    }

    /// Resolve `,` / `.` into a single canonical decimal point.
    ///
    /// When both separators appear, the rightmost one is the decimal mark.
    /// A lone separator is a decimal mark when its fraction fits the scale,
    /// a thousands separator otherwise.
    fn canonicalize_separators(cleaned: &str, scale: u8) -> String {
        let last_comma = cleaned.rfind(',');
        let last_period = cleaned.rfind('.');

        match (last_comma, last_period) {
            (Some(c), Some(p)) if c > p => {
                // European: periods group thousands, comma marks decimals.
                cleaned.replace('.', "").replace(',', ".")
            }
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            (Some(_), None) => {
                if Self::is_decimal_mark(cleaned, ',', scale) {
                    cleaned.replace(',', ".")
                } else {
                    cleaned.replace(',', "")
                }
            }
            (None, Some(_)) => {
                if Self::is_decimal_mark(cleaned, '.', scale) {
                    cleaned.to_owned()
                } else {
                    cleaned.replace('.', "")
                }
            }
            (None, None) => cleaned.to_owned(),
        }
    }

    fn is_decimal_mark(cleaned: &str, sep: char, scale: u8) -> bool {
        let mut parts = cleaned.split(sep);
        let _int = parts.next();
        match (parts.next(), parts.next()) {
            (Some(frac), None) => !frac.is_empty() && frac.len() <= usize::from(scale),
            // More than one occurrence always means grouping.
            _ => false,
        }
    }

    fn assemble(
        int_part: &str,
        frac_part: &str,
        negative: bool,
        scale: u8,
        original: &str,
    ) -> Result<Self, MoneyParseError> {
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(MoneyParseError(original.to_owned()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(MoneyParseError(original.to_owned()));
        }
        if frac_part.len() > usize::from(scale) {
            return Err(MoneyParseError(original.to_owned()));
        }

        let base = 10i64
            .checked_pow(u32::from(scale))
            .ok_or_else(|| MoneyParseError(original.to_owned()))?;
        let int_value: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| MoneyParseError(original.to_owned()))?
        };

        let mut frac_value: i64 = 0;
        if !frac_part.is_empty() {
            frac_value = frac_part
                .parse()
                .map_err(|_| MoneyParseError(original.to_owned()))?;
            for _ in frac_part.len()..usize::from(scale) {
                frac_value *= 10;
            }
        }

        let minor_units = int_value
            .checked_mul(base)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(|| MoneyParseError(original.to_owned()))?;

        Ok(Self {
            minor_units: if negative { -minor_units } else { minor_units },
            scale,
        })
    }

    /// Convert a JSON wire number into minor units.
    ///
    /// Only for the OData boundary, where the ERP delivers decimals as JSON
    /// numbers; domain code compares minor units exclusively.
    pub fn from_f64(value: f64, scale: u8) -> Self {
        let base = 10f64.powi(i32::from(scale));
        Self {
            minor_units: (value * base).round() as i64,
            scale,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{abs}");
        }
        let base = 10u64.pow(u32::from(self.scale));
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / base,
            abs % base,
            width = usize::from(self.scale)
        )
    }
}
