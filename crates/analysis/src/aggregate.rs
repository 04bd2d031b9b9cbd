//! Collapses coerced rows into one value per calendar day.
//!
//! Business mode sums contributions and fills calendar gaps with 0.0 so the
//! series has a fixed daily cadence. Finance mode keeps only observed days
//! (trading-day semantics, no introduced zeros).

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde_json::Value;

use models::{DecimalStyle, RawTable};

use crate::coerce::{coerce_amount, coerce_date};
use crate::columns::ColumnMap;
use crate::error::{AnalysisError, Result};

/// One aggregated day. The series is always sorted ascending by day.
pub type DatedValue = (NaiveDate, f64);

const MIN_FINANCE_DAYS: usize = 2;

/// Business aggregation: per-row contribution is the amount column when one
/// resolved, else price × qty when both resolved, else 1.0 (count the row as
/// one unit). Returns a dense daily series from first to last observed day.
pub fn business_daily(
    table: &RawTable,
    cols: &ColumnMap,
    decimal: DecimalStyle,
    date_format: Option<&str>,
) -> Result<Vec<DatedValue>> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for row in &table.rows {
        let Some(day) = row_date(row, cols, date_format) else {
            continue;
        };
        let contribution = if let Some(amount_col) = &cols.amount {
            coerce_amount(row.get(amount_col), decimal)
        } else if let (Some(price_col), Some(qty_col)) = (&cols.price, &cols.qty) {
            coerce_amount(row.get(price_col), decimal) * coerce_amount(row.get(qty_col), decimal)
        } else {
            1.0
        };
        *daily.entry(day).or_insert(0.0) += contribution;
    }

    if daily.is_empty() {
        return Err(AnalysisError::NoValidRows);
    }

    Ok(fill_missing_days(&daily))
}

/// Finance case A: one close price per day, last observation of the day wins.
pub fn finance_close_series(
    table: &RawTable,
    cols: &ColumnMap,
    decimal: DecimalStyle,
    date_format: Option<&str>,
) -> Result<Vec<DatedValue>> {
    let close_col = cols.close.as_ref().ok_or(AnalysisError::MissingFinanceColumns)?;

    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in &table.rows {
        let Some(day) = row_date(row, cols, date_format) else {
            continue;
        };
        // Row order is file order, so insert keeps the last observation.
        daily.insert(day, coerce_amount(row.get(close_col), decimal));
    }

    require_finance_days(daily.len())?;
    Ok(daily.into_iter().collect())
}

/// Finance case B: no usable close column, so daily portfolio value is
/// approximated as Σ qty × price across every recorded symbol. No cost
/// basis, no cash, no corporate actions. A documented approximation.
pub fn finance_position_series(
    table: &RawTable,
    cols: &ColumnMap,
    decimal: DecimalStyle,
    date_format: Option<&str>,
) -> Result<Vec<DatedValue>> {
    let (Some(price_col), Some(qty_col)) = (&cols.price, &cols.qty) else {
        return Err(AnalysisError::MissingFinanceColumns);
    };

    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in &table.rows {
        let Some(day) = row_date(row, cols, date_format) else {
            continue;
        };
        let notional =
            coerce_amount(row.get(price_col), decimal) * coerce_amount(row.get(qty_col), decimal);
        *daily.entry(day).or_insert(0.0) += notional;
    }

    require_finance_days(daily.len())?;
    Ok(daily.into_iter().collect())
}

fn row_date(
    row: &HashMap<String, Value>,
    cols: &ColumnMap,
    date_format: Option<&str>,
) -> Option<NaiveDate> {
    coerce_date(row.get(&cols.date), date_format)
}

fn require_finance_days(found: usize) -> Result<()> {
    if found == 0 {
        return Err(AnalysisError::NoValidRows);
    }
    if found < MIN_FINANCE_DAYS {
        return Err(AnalysisError::InsufficientHistory {
            needed: MIN_FINANCE_DAYS,
            found,
        });
    }
    Ok(())
}

/// Walks every calendar day between the first and last observed day,
/// emitting 0.0 for days with no contributions.
fn fill_missing_days(daily: &BTreeMap<NaiveDate, f64>) -> Vec<DatedValue> {
    let first = *daily.keys().next().expect("non-empty day map");
    let last = *daily.keys().next_back().expect("non-empty day map");

    let mut series = Vec::new();
    let mut day = first;
    while day <= last {
        series.push((day, daily.get(&day).copied().unwrap_or(0.0)));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    series
}
