//! Cell conversion between polars values and the pipeline's scalar types.
//!
//! Source tables arrive as untyped text (flat-file exports) or as typed
//! frames (in-memory sources, snapshots). Everything downstream reads cells
//! through these helpers so both shapes convert the same way.

use polars::prelude::{AnyValue, DataFrame, PolarsResult};

/// Renders a cell as text; `Null` becomes the empty string.
///
/// ```
/// use polars::prelude::AnyValue;
///
/// use dropout_common::any_to_string;
///
/// assert!(any_to_string(AnyValue::Null).is_empty());
/// assert_eq!(any_to_string(AnyValue::Int64(310)), "310");
/// assert_eq!(any_to_string(AnyValue::Float64(12.50)), "12.5");
/// assert_eq!(any_to_string(AnyValue::String("NCT001")), "NCT001");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        // Integers and booleans display without quoting.
        other => other.to_string(),
    }
}

/// Converts `AnyValue` to a trimmed `String`, returning `None` if it is blank.
pub fn any_to_text(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Shortest decimal rendering of `v` (`1.0` prints as `1`).
///
/// # Examples
///
/// ```
/// use dropout_common::format_numeric;
///
/// assert_eq!(format_numeric(52.0), "52");
/// assert_eq!(format_numeric(0.25), "0.25");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Numeric reading of a cell; text is parsed, anything else is `None`.
///
/// Booleans convert to `1.0`/`0.0` so indicator columns can enter numeric
/// summaries directly. Non-finite results are treated as missing.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let number = match value {
        AnyValue::Null => None,
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
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
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Integer reading of a cell.
///
/// Floats are accepted only when they carry no fractional part, so `"12.0"`
/// from a text export reads as `12` but `"12.5"` is missing.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
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
        AnyValue::Float32(v) => whole_f64(f64::from(v)),
        AnyValue::Float64(v) => whole_f64(v),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

/// Converts an `AnyValue` to `bool`, returning `None` for unrecognized values.
pub fn any_to_bool(value: AnyValue<'_>) -> Option<bool> {
    match value {
        AnyValue::Null => None,
        AnyValue::Boolean(b) => Some(b),
        AnyValue::String(s) => parse_bool(s),
        AnyValue::StringOwned(s) => parse_bool(&s),
        other => any_to_i64(other).and_then(|v| match v {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }),
    }
}

pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer text, also accepting whole decimals such as `"40.0"`.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_f64))
}

/// Parses the boolean spellings found in relational exports.
///
/// # Examples
///
/// ```
/// use dropout_common::parse_bool;
///
/// assert_eq!(parse_bool("t"), Some(true));
/// assert_eq!(parse_bool(" No "), Some(false));
/// assert_eq!(parse_bool("maybe"), None);
/// ```
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn whole_f64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

fn read_column<T>(
    df: &DataFrame,
    name: &str,
    convert: impl Fn(AnyValue<'_>) -> Option<T>,
) -> PolarsResult<Vec<Option<T>>> {
    let column = df.column(name)?;
    Ok((0..df.height())
        .map(|idx| convert(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

/// Reads a column as trimmed, non-empty text values.
pub fn text_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    read_column(df, name, any_to_text)
}

pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    read_column(df, name, any_to_f64)
}

pub fn i64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    read_column(df, name, any_to_i64)
}

/// Reads a column through [`any_to_bool`], so `"t"`/`"f"` exports parse too.
pub fn bool_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<bool>>> {
    read_column(df, name, any_to_bool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn test_any_to_string_null() {
        assert!(any_to_string(AnyValue::Null).is_empty());
    }

    #[test]
    fn test_any_to_text_blank() {
        assert_eq!(any_to_text(AnyValue::String("  ")), None);
        assert_eq!(
            any_to_text(AnyValue::String(" Actual ")),
            Some("Actual".to_string())
        );
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(12.0), "12");
        assert_eq!(format_numeric(0.25), "0.25");
        assert_eq!(format_numeric(2010.0), "2010");
        assert_eq!(format_numeric(-0.5), "-0.5");
    }

    #[test]
    fn test_any_to_f64() {
        assert!(any_to_f64(AnyValue::Null).is_none());
        assert_eq!(any_to_f64(AnyValue::UInt32(7)), Some(7.0));
        assert_eq!(any_to_f64(AnyValue::String(" 0.75 ")), Some(0.75));
        assert_eq!(any_to_f64(AnyValue::Boolean(true)), Some(1.0));
        assert_eq!(any_to_f64(AnyValue::Float64(f64::NAN)), None);
        assert_eq!(any_to_f64(AnyValue::String("NaN")), None);
    }

    #[test]
    fn test_any_to_i64() {
        assert!(any_to_i64(AnyValue::Null).is_none());
        assert_eq!(any_to_i64(AnyValue::Int16(-3)), Some(-3));
        assert_eq!(any_to_i64(AnyValue::Float64(12.0)), Some(12));
        assert_eq!(any_to_i64(AnyValue::Float64(3.9)), None);
        assert_eq!(any_to_i64(AnyValue::String("12.0")), Some(12));
        assert_eq!(any_to_i64(AnyValue::String("abc")), None);
    }

    #[test]
    fn test_any_to_bool() {
        assert_eq!(any_to_bool(AnyValue::String("f")), Some(false));
        assert_eq!(any_to_bool(AnyValue::String("TRUE")), Some(true));
        assert_eq!(any_to_bool(AnyValue::Int64(1)), Some(true));
        assert_eq!(any_to_bool(AnyValue::Int64(7)), None);
    }

    #[test]
    fn test_column_readers() {
        let df = DataFrame::new(vec![
            Column::new("id".into(), ["A", "", "C"]),
            Column::new("n".into(), ["1", "x", "3.0"]),
        ])
        .unwrap();
        assert_eq!(
            text_values(&df, "id").unwrap(),
            vec![Some("A".to_string()), None, Some("C".to_string())]
        );
        assert_eq!(i64_values(&df, "n").unwrap(), vec![Some(1), None, Some(3)]);
        assert_eq!(
            f64_values(&df, "n").unwrap(),
            vec![Some(1.0), None, Some(3.0)]
        );
        assert!(text_values(&df, "missing").is_err());
    }
}
