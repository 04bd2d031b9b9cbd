//! Core analysis pipeline: raw table in, analysis result out.
//!
//! Pure and request-scoped: no I/O, no globals, no caches. Every parameter
//! (mapping, mode, decimal style, date format, risk-free rate) arrives as an
//! explicit argument, so concurrent requests share nothing.

pub mod aggregate;
pub mod business;
pub mod coerce;
pub mod columns;
pub mod error;
pub mod finance;
pub mod stats;

pub use columns::ColumnMap;
pub use error::{AnalysisError, Result};

use models::{AnalysisResult, MappingSpec, Mode, RawTable};

/// Runs the full pipeline on one decoded table.
///
/// Mode selection: the explicit `mode` wins; otherwise the resolved columns
/// decide (see [`columns::infer_mode`]). In finance mode a close column
/// picks the price-series path, else price + qty reconstruct a daily
/// portfolio value.
pub fn analyze(
    table: &RawTable,
    mapping: Option<&MappingSpec>,
    mode: Option<Mode>,
    rf_annual_pct: f64,
) -> Result<AnalysisResult> {
    let cols = columns::resolve(&table.header, mapping)?;

    let decimal = mapping.and_then(|m| m.options.decimal).unwrap_or_default();
    let date_format = mapping.and_then(|m| m.options.date_format.as_deref());

    let mode = mode.unwrap_or_else(|| columns::infer_mode(&cols));

    match mode {
        Mode::Business => {
            let series = aggregate::business_daily(table, &cols, decimal, date_format)?;
            Ok(business::analyze_business(&series))
        }
        Mode::Finance => {
            let series = if cols.close.is_some() {
                aggregate::finance_close_series(table, &cols, decimal, date_format)?
            } else if cols.price.is_some() && cols.qty.is_some() {
                aggregate::finance_position_series(table, &cols, decimal, date_format)?
            } else {
                return Err(AnalysisError::MissingFinanceColumns);
            };
            Ok(finance::analyze_finance(&series, rf_annual_pct))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{DecimalStyle, MappingOptions};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn table(header: &[&str], rows: &[&[&str]]) -> RawTable {
        let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        let rows = rows
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| (header[i].clone(), json!(cell)))
                    .collect::<HashMap<String, Value>>()
            })
            .collect();
        RawTable { header, rows }
    }

    #[test]
    fn test_business_end_to_end() {
        let t = table(
            &["date", "amount"],
            &[&["2024-01-01", "100"], &["2024-01-03", "50"]],
        );
        let mapping = MappingSpec {
            options: MappingOptions {
                decimal: Some(DecimalStyle::Dot),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = analyze(&t, Some(&mapping), None, 0.0).unwrap();

        assert_eq!(result.kpi.get("revenue_30d").and_then(Value::as_f64), Some(150.0));
        assert_eq!(result.timeseries.len(), 3);
        assert_eq!(result.timeseries[1].value, 0.0);
        assert_eq!(result.timeseries[1].date, "2024-01-02");
    }

    #[test]
    fn test_european_decimals_by_default() {
        let t = table(
            &["data", "totale"],
            &[&["01/03/2024", "1.234,56"], &["02/03/2024", "765,44"]],
        );
        let result = analyze(&t, None, None, 0.0).unwrap();
        assert_eq!(result.kpi.get("revenue_30d").and_then(Value::as_f64), Some(2000.0));
    }

    #[test]
    fn test_close_header_auto_infers_finance() {
        let t = table(
            &["date", "close"],
            &[
                &["2024-01-01", "100"],
                &["2024-01-02", "110"],
                &["2024-01-03", "105"],
            ],
        );
        let result = analyze(&t, None, None, 0.0).unwrap();
        assert!(result.kpi.contains_key("sharpe"));
        assert!(result.kpi.contains_key("max_drawdown"));
        assert_eq!(result.forecast.method, "ewma");
    }

    #[test]
    fn test_explicit_mode_overrides_inference() {
        // price+qty would infer finance; the explicit mode forces business.
        let t = table(
            &["date", "price", "qty"],
            &[&["2024-01-01", "10", "2"], &["2024-01-02", "5", "4"]],
        );
        let result = analyze(&t, None, Some(Mode::Business), 0.0).unwrap();
        assert_eq!(result.kpi.get("revenue_30d").and_then(Value::as_f64), Some(40.0));
        assert_eq!(result.forecast.method, "moving-average");
    }

    #[test]
    fn test_price_and_qty_infer_finance_reconstruction() {
        let t = table(
            &["date", "price", "qty"],
            &[
                &["2024-01-01", "10", "2"],
                &["2024-01-02", "11", "2"],
                &["2024-01-03", "12", "2"],
            ],
        );
        let result = analyze(&t, None, None, 0.0).unwrap();
        // Daily notionals 20, 22, 24 analyzed as a finance value series.
        assert!(result.kpi.contains_key("hit_ratio"));
        assert_eq!(result.timeseries[0].value, 20.0);
        assert_eq!(result.timeseries[2].value, 24.0);
    }

    #[test]
    fn test_no_parseable_dates_fails_with_no_valid_rows() {
        let t = table(&["date", "amount"], &[&["???", "1"], &["!!!", "2"]]);
        let err = analyze(&t, None, None, 0.0).unwrap_err();
        assert_eq!(err, AnalysisError::NoValidRows);
    }

    #[test]
    fn test_missing_date_column_is_a_hard_error() {
        let t = table(&["x", "y"], &[&["1", "2"]]);
        let err = analyze(&t, None, None, 0.0).unwrap_err();
        assert_eq!(err, AnalysisError::DateColumnNotFound);
    }

    #[test]
    fn test_finance_mode_without_usable_columns() {
        let t = table(&["date", "amount"], &[&["2024-01-01", "5"]]);
        let err = analyze(&t, None, Some(Mode::Finance), 0.0).unwrap_err();
        assert_eq!(err, AnalysisError::MissingFinanceColumns);
    }

    #[test]
    fn test_dense_series_has_no_gaps() {
        let t = table(
            &["date", "amount"],
            &[&["2024-01-01", "1"], &["2024-01-10", "1"], &["2024-01-05", "3"]],
        );
        let result = analyze(&t, None, None, 0.0).unwrap();
        assert_eq!(result.timeseries.len(), 10);
        let days: Vec<chrono::NaiveDate> = result
            .timeseries
            .iter()
            .map(|p| chrono::NaiveDate::parse_from_str(&p.date, "%Y-%m-%d").unwrap())
            .collect();
        for pair in days.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
    }
}
