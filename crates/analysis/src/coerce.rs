//! Lenient per-cell coercion.
//!
//! Amounts never fail: anything unparseable becomes 0.0, which downstream
//! summation tolerates better than a rejected row. Dates return `None` on
//! failure and callers drop the row.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use models::DecimalStyle;

/// Formats tried, in order, when no explicit date format is given.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d"];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Excel serial dates count days from this epoch (1900 leap-year bug included).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Coerces a raw cell to a float, `0.0` on any failure.
pub fn coerce_amount(raw: Option<&Value>, decimal: DecimalStyle) -> f64 {
    coerce_amount_checked(raw, decimal).0
}

/// Same as [`coerce_amount`] but reports whether the zero was a fallback,
/// for callers that want parse diagnostics.
pub fn coerce_amount_checked(raw: Option<&Value>, decimal: DecimalStyle) -> (f64, bool) {
    let Some(value) = raw else {
        return (0.0, true);
    };

    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => (f, false),
            None => (0.0, true),
        },
        Value::String(s) => {
            let mut cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£'))
                .collect();
            if decimal == DecimalStyle::Comma {
                // "1.234,56" -> "1234.56"
                cleaned = cleaned.replace('.', "").replace(',', ".");
            }
            match cleaned.parse::<f64>() {
                Ok(f) => (f, false),
                Err(_) => (0.0, true),
            }
        }
        _ => (0.0, true),
    }
}

/// Coerces a raw cell to a calendar date.
///
/// An explicit format (token or chrono format string) is tried first; on
/// failure the fixed autodetect chain runs. Numeric cells are treated as
/// Excel serial dates. Returns `None` when nothing matches.
pub fn coerce_date(raw: Option<&Value>, explicit_format: Option<&str>) -> Option<NaiveDate> {
    let value = raw?;

    match value {
        Value::Number(n) => from_excel_serial(n.as_f64()?),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }

            if let Some(fmt) = explicit_format {
                if let Some(date) = parse_with_format(s, fmt) {
                    return Some(date);
                }
                // Fall through to autodetection, like the lenient contract says.
            }

            for fmt in DATE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                    return Some(date);
                }
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
                return Some(dt.date());
            }

            // Last resort: ISO-8601 with a trailing Z stripped.
            let iso = s.trim_end_matches('Z');
            if let Ok(dt) = iso.parse::<NaiveDateTime>() {
                return Some(dt.date());
            }
            None
        }
        _ => None,
    }
}

/// Maps a format token to a chrono format, passing native formats through.
fn parse_with_format(s: &str, fmt: &str) -> Option<NaiveDate> {
    let fmt = match fmt.trim().to_uppercase().as_str() {
        "DD/MM/YYYY" => "%d/%m/%Y",
        "YYYY-MM-DD" => "%Y-%m-%d",
        "MM/DD/YYYY" => "%m/%d/%Y",
        _ => fmt.trim(),
    };
    if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date())
}

fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..100_000.0).contains(&serial) {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn amount(v: &Value, decimal: DecimalStyle) -> f64 {
        coerce_amount(Some(v), decimal)
    }

    #[test]
    fn test_amount_european_format() {
        assert_eq!(amount(&json!("1.234,56"), DecimalStyle::Comma), 1234.56);
        assert_eq!(amount(&json!("€ 1.234,56"), DecimalStyle::Comma), 1234.56);
        assert_eq!(amount(&json!("-1.234,56"), DecimalStyle::Comma), -1234.56);
    }

    #[test]
    fn test_amount_dot_format() {
        assert_eq!(amount(&json!("1234.56"), DecimalStyle::Dot), 1234.56);
        assert_eq!(amount(&json!("$99.90"), DecimalStyle::Dot), 99.9);
    }

    #[test]
    fn test_amount_numeric_cell_ignores_style() {
        assert_eq!(amount(&json!(12.5), DecimalStyle::Comma), 12.5);
        assert_eq!(amount(&json!(7), DecimalStyle::Comma), 7.0);
    }

    #[test]
    fn test_amount_failures_degrade_to_zero() {
        let (value, fallback) = coerce_amount_checked(Some(&json!("n/a")), DecimalStyle::Comma);
        assert_eq!(value, 0.0);
        assert!(fallback);

        let (value, fallback) = coerce_amount_checked(None, DecimalStyle::Dot);
        assert_eq!(value, 0.0);
        assert!(fallback);

        assert_eq!(amount(&json!(true), DecimalStyle::Dot), 0.0);
    }

    #[test]
    fn test_amount_parse_success_is_not_flagged() {
        let (value, fallback) = coerce_amount_checked(Some(&json!("42")), DecimalStyle::Dot);
        assert_eq!(value, 42.0);
        assert!(!fallback);
    }

    #[test]
    fn test_date_autodetect_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for raw in ["2024-03-05", "05/03/2024", "05-03-2024", "2024/03/05"] {
            assert_eq!(coerce_date(Some(&json!(raw)), None), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_date_us_format_after_european() {
        // 13 can't be a month, so the US format is the first that matches.
        assert_eq!(
            coerce_date(Some(&json!("12/13/2024")), None),
            NaiveDate::from_ymd_opt(2024, 12, 13)
        );
        // Ambiguous day/month resolves European-first.
        assert_eq!(
            coerce_date(Some(&json!("03/04/2024")), None),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
    }

    #[test]
    fn test_date_explicit_token_wins() {
        assert_eq!(
            coerce_date(Some(&json!("03/04/2024")), Some("MM/DD/YYYY")),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
    }

    #[test]
    fn test_date_explicit_failure_falls_back() {
        assert_eq!(
            coerce_date(Some(&json!("2024-03-05")), Some("DD/MM/YYYY")),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_date_datetime_and_iso() {
        assert_eq!(
            coerce_date(Some(&json!("2024-03-05 14:30:00")), None),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            coerce_date(Some(&json!("2024-03-05T14:30:00Z")), None),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_date_excel_serial() {
        // 45292 is 2024-01-01.
        assert_eq!(
            coerce_date(Some(&json!(45292.0)), None),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(coerce_date(Some(&json!(0.5)), None), None);
    }

    #[test]
    fn test_date_garbage_is_none() {
        assert_eq!(coerce_date(Some(&json!("soon")), None), None);
        assert_eq!(coerce_date(Some(&json!("")), None), None);
        assert_eq!(coerce_date(None, None), None);
    }
}
