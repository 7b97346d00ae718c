//! Polars `AnyValue` coercions for survey microdata.
//!
//! Survey exports store coded answers inconsistently: a code of 99 may arrive
//! as `99`, `99.0`, or the string `"99"` depending on how the column was
//! inferred. These helpers normalize cells into the two shapes the engine
//! works with: integer response codes and real-valued survey weights.

use polars::prelude::*;

/// Converts a Polars `AnyValue` to an integer survey code.
///
/// Returns `None` for nulls, empty/non-numeric strings, and numeric values
/// that are not whole numbers (a fractional cell cannot be a response code).
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use svy_common::code_from_any;
///
/// assert_eq!(code_from_any(AnyValue::Null), None);
/// assert_eq!(code_from_any(AnyValue::Int64(3)), Some(3));
/// assert_eq!(code_from_any(AnyValue::Float64(99.0)), Some(99));
/// assert_eq!(code_from_any(AnyValue::String("2")), Some(2));
/// ```
pub fn code_from_any(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => integral_code(f64::from(v)),
        AnyValue::Float64(v) => integral_code(v),
        AnyValue::String(s) => parse_code(s),
        AnyValue::StringOwned(s) => parse_code(&s),
        _ => None,
    }
}

/// Converts a Polars `AnyValue` to a survey weight.
///
/// Returns `None` for nulls and non-numeric cells. No sign or finiteness
/// checks happen here; the calculators validate weights at their own
/// boundary.
pub fn weight_from_any(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_weight(s),
        AnyValue::StringOwned(s) => parse_weight(&s),
        _ => None,
    }
}

/// Parses a string cell as an integer survey code.
///
/// Accepts float renderings of whole numbers (`"99.0"` parses to `99`);
/// returns `None` for empty, non-numeric, or fractional input.
pub fn parse_code(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(code) = trimmed.parse::<i64>() {
        return Some(code);
    }
    trimmed.parse::<f64>().ok().and_then(integral_code)
}

/// Parses a string cell as a weight, returning `None` for invalid or empty
/// strings.
pub fn parse_weight(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use svy_common::format_numeric;
///
/// assert_eq!(format_numeric(5410.0), "5410");
/// assert_eq!(format_numeric(48.6), "48.6");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}

fn integral_code(v: f64) -> Option<i64> {
    if !v.is_finite() || v.fract().abs() > f64::EPSILON {
        return None;
    }
    Some(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_any_null() {
        assert_eq!(code_from_any(AnyValue::Null), None);
    }

    #[test]
    fn test_code_from_any_integers() {
        assert_eq!(code_from_any(AnyValue::Int32(42)), Some(42));
        assert_eq!(code_from_any(AnyValue::Int64(99)), Some(99));
        assert_eq!(code_from_any(AnyValue::UInt32(0)), Some(0));
    }

    #[test]
    fn test_code_from_any_floats() {
        assert_eq!(code_from_any(AnyValue::Float64(99.0)), Some(99));
        assert_eq!(code_from_any(AnyValue::Float64(2.0)), Some(2));
        // A fractional cell is not a response code
        assert_eq!(code_from_any(AnyValue::Float64(1.5)), None);
    }

    #[test]
    fn test_code_from_any_strings() {
        assert_eq!(code_from_any(AnyValue::String("3")), Some(3));
        assert_eq!(code_from_any(AnyValue::String("99.0")), Some(99));
        assert_eq!(code_from_any(AnyValue::String("")), None);
        assert_eq!(code_from_any(AnyValue::String("refused")), None);
    }

    #[test]
    fn test_weight_from_any() {
        assert_eq!(weight_from_any(AnyValue::Null), None);
        assert_eq!(weight_from_any(AnyValue::Float64(0.4815)), Some(0.4815));
        assert_eq!(weight_from_any(AnyValue::Int32(2)), Some(2.0));
        assert_eq!(weight_from_any(AnyValue::String("1.25")), Some(1.25));
        assert_eq!(weight_from_any(AnyValue::String("n/a")), None);
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code(" 99 "), Some(99));
        assert_eq!(parse_code("99.0"), Some(99));
        assert_eq!(parse_code("1.5"), None);
        assert_eq!(parse_code(""), None);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(""), None);
        assert_eq!(parse_weight("  "), None);
        assert_eq!(parse_weight("0.87"), Some(0.87));
        assert_eq!(parse_weight("  3.0  "), Some(3.0));
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(48.60), "48.6");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(5410.0), "5410");
    }
}
