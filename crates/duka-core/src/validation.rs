//! # Validation Module
//!
//! Input parsing utilities for Duka POS.
//!
//! ## Two Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Input Policies                                     │
//! │                                                                         │
//! │  LENIENT (numbers typed by the operator)                               │
//! │  ├── "12"     → 12                                                     │
//! │  ├── "12abc"  → 12   (leading numeric prefix wins)                     │
//! │  ├── "abc"    → 0    (silent fallback, never an error)                 │
//! │  └── ""       → 0                                                      │
//! │                                                                         │
//! │  STRICT (structural keys)                                              │
//! │  ├── dates      "YYYY-MM-DD"                                           │
//! │  └── month keys "YYYY-MM"                                              │
//! │      → ValidationError on anything else                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A lenient zero is indistinguishable from an explicit zero. Downstream
//! arithmetic always has a number to work with.
//!
//! ## Usage
//! ```rust
//! use duka_core::validation::{parse_iso_date, parse_lenient_number};
//!
//! assert_eq!(parse_lenient_number("2.5"), 2.5);
//! assert_eq!(parse_lenient_number("abc"), 0.0);
//! assert!(parse_iso_date("2024-05-10").is_ok());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format used on the wire and in the ledger.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Lenient Numeric Parsing
// =============================================================================

/// Parses operator-typed numeric text, falling back to `0.0`.
///
/// ## Rules
/// - Leading whitespace is ignored
/// - The longest leading decimal literal is used (`"3kg"` → 3)
/// - Optional sign, fraction and exponent are accepted
/// - Anything without a leading literal, and any non-finite result, is `0.0`
/// - Negative zero is normalised to `0.0`
///
/// ## Example
/// ```rust
/// use duka_core::validation::parse_lenient_number;
///
/// assert_eq!(parse_lenient_number("  7"), 7.0);
/// assert_eq!(parse_lenient_number("1e3"), 1000.0);
/// assert_eq!(parse_lenient_number("-"), 0.0);
/// ```
pub fn parse_lenient_number(raw: &str) -> f64 {
    let literal = match numeric_prefix(raw.trim_start()) {
        Some(literal) => literal,
        None => return 0.0,
    };

    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}

/// Extracts the leading decimal literal of `s` in a form `f64::from_str`
/// accepts, or `None` when there is no digit to read.
fn numeric_prefix(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut literal = String::new();

    if let Some(&(sign @ (b'+' | b'-'))) = bytes.first() {
        if sign == b'-' {
            literal.push('-');
        }
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &s[frac_start..frac_end];
        pos = frac_end;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }

    // Exponent only counts when at least one digit follows it.
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_pos = pos + 1;
        let mut exponent = String::from("e");
        if let Some(&(sign @ (b'+' | b'-'))) = bytes.get(exp_pos) {
            exponent.push(sign as char);
            exp_pos += 1;
        }
        let exp_digits_start = exp_pos;
        while exp_pos < bytes.len() && bytes[exp_pos].is_ascii_digit() {
            exp_pos += 1;
        }
        if exp_pos > exp_digits_start {
            exponent.push_str(&s[exp_digits_start..exp_pos]);
            literal.push_str(&exponent);
        }
    }

    Some(literal)
}

// =============================================================================
// Strict Parsers
// =============================================================================

/// Parses a calendar date in `YYYY-MM-DD` form.
///
/// ## Example
/// ```rust
/// use duka_core::validation::parse_iso_date;
///
/// assert!(parse_iso_date("2024-02-29").is_ok());
/// assert!(parse_iso_date("2023-02-29").is_err());
/// assert!(parse_iso_date("yesterday").is_err());
/// ```
pub fn parse_iso_date(raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "date".to_string(),
        });
    }

    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT).map_err(|e| ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: format!("expected YYYY-MM-DD ({})", e),
    })
}

/// Parses a month key in `YYYY-MM` form into `(year, month)`.
pub fn parse_year_month(raw: &str) -> ValidationResult<(i32, u32)> {
    let raw = raw.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "month".to_string(),
        reason: reason.to_string(),
    };

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "month".to_string(),
        });
    }

    let (year, month) = raw
        .split_once('-')
        .ok_or_else(|| invalid("expected YYYY-MM"))?;

    if year.len() != 4 || month.len() != 2 {
        return Err(invalid("expected YYYY-MM"));
    }

    let year: i32 = year.parse().map_err(|_| invalid("year is not a number"))?;
    let month: u32 = month.parse().map_err(|_| invalid("month is not a number"))?;

    if !(1..=12).contains(&month) {
        return Err(invalid("month must be between 01 and 12"));
    }

    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_number_plain_values() {
        assert_eq!(parse_lenient_number("12"), 12.0);
        assert_eq!(parse_lenient_number("2.5"), 2.5);
        assert_eq!(parse_lenient_number("-4"), -4.0);
        assert_eq!(parse_lenient_number("+4"), 4.0);
        assert_eq!(parse_lenient_number("  3.5"), 3.5);
        assert_eq!(parse_lenient_number(".5"), 0.5);
        assert_eq!(parse_lenient_number("5."), 5.0);
        assert_eq!(parse_lenient_number("1e3"), 1000.0);
        assert_eq!(parse_lenient_number("2E-1"), 0.2);
    }

    #[test]
    fn test_lenient_number_uses_numeric_prefix() {
        assert_eq!(parse_lenient_number("12abc"), 12.0);
        assert_eq!(parse_lenient_number("1,000"), 1.0);
        assert_eq!(parse_lenient_number("1e"), 1.0);
        assert_eq!(parse_lenient_number("3 kg"), 3.0);
    }

    #[test]
    fn test_lenient_number_falls_back_to_zero() {
        assert_eq!(parse_lenient_number("abc"), 0.0);
        assert_eq!(parse_lenient_number(""), 0.0);
        assert_eq!(parse_lenient_number("   "), 0.0);
        assert_eq!(parse_lenient_number("-"), 0.0);
        assert_eq!(parse_lenient_number("."), 0.0);
        assert_eq!(parse_lenient_number("Infinity"), 0.0);
        assert_eq!(parse_lenient_number("1e999"), 0.0);
    }

    #[test]
    fn test_lenient_number_normalises_negative_zero() {
        let value = parse_lenient_number("-0");
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
    }

    #[test]
    fn test_parse_iso_date() {
        let date = parse_iso_date("2024-05-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());

        assert!(parse_iso_date("").is_err());
        assert!(parse_iso_date("10/05/2024").is_err());
        assert!(parse_iso_date("2024-13-01").is_err());
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!(parse_year_month("2024-05").unwrap(), (2024, 5));
        assert_eq!(parse_year_month(" 1999-12 ").unwrap(), (1999, 12));

        assert!(parse_year_month("").is_err());
        assert!(parse_year_month("2024-5").is_err());
        assert!(parse_year_month("2024-13").is_err());
        assert!(parse_year_month("2024-00").is_err());
        assert!(parse_year_month("202405").is_err());
        assert!(parse_year_month("2024-05-01").is_err());
    }
}
