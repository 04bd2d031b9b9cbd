//! Maps header columns onto semantic roles.
//!
//! An explicit user mapping wins and must match the header exactly; the
//! fallback search is a case-insensitive walk over a fixed candidate list,
//! first candidate wins. Only the date role is mandatory.

use models::{MappingSpec, Mode};

use crate::error::{AnalysisError, Result};

const DATE_CANDIDATES: &[&str] = &["date", "data", "giorno", "timestamp", "order_date", "created_at"];
const AMOUNT_CANDIDATES: &[&str] = &[
    "amount", "revenue", "ricavo", "price", "prezzo", "total", "totale", "valore",
];
const PRICE_CANDIDATES: &[&str] = &["price", "prezzo", "unit_price", "unitprice"];
const QTY_CANDIDATES: &[&str] = &["qty", "quantita", "quantity", "qta"];
const CLOSE_CANDIDATES: &[&str] = &["close", "adj close", "adj_close", "chiusura"];
const SYMBOL_CANDIDATES: &[&str] = &["symbol", "ticker", "simbolo", "isin"];

/// Resolved column names for one request. Built once, then read-only.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub date: String,
    pub amount: Option<String>,
    pub price: Option<String>,
    pub qty: Option<String>,
    pub close: Option<String>,
    pub symbol: Option<String>,
}

/// Resolves every role against the header. Fails only when no date column
/// can be found, since aggregation has no fallback for that.
pub fn resolve(header: &[String], mapping: Option<&MappingSpec>) -> Result<ColumnMap> {
    let date = pick_col(
        header,
        mapping.and_then(|m| m.date.as_deref()),
        DATE_CANDIDATES,
    )
    .ok_or(AnalysisError::DateColumnNotFound)?;

    Ok(ColumnMap {
        date,
        amount: pick_col(
            header,
            mapping.and_then(|m| m.amount.as_deref()),
            AMOUNT_CANDIDATES,
        ),
        price: pick_col(
            header,
            mapping.and_then(|m| m.price.as_deref()),
            PRICE_CANDIDATES,
        ),
        qty: pick_col(header, mapping.and_then(|m| m.qty.as_deref()), QTY_CANDIDATES),
        close: pick_col(
            header,
            mapping.and_then(|m| m.close.as_deref()),
            CLOSE_CANDIDATES,
        ),
        symbol: pick_col(
            header,
            mapping.and_then(|m| m.symbol.as_deref()),
            SYMBOL_CANDIDATES,
        ),
    })
}

/// Infers the analysis mode from the resolved columns: price-series or
/// instrument markers mean finance, otherwise business.
pub fn infer_mode(cols: &ColumnMap) -> Mode {
    if cols.close.is_some() || cols.symbol.is_some() {
        return Mode::Finance;
    }
    if cols.price.is_some() && cols.qty.is_some() {
        return Mode::Finance;
    }
    Mode::Business
}

fn pick_col(header: &[String], explicit: Option<&str>, candidates: &[&str]) -> Option<String> {
    if let Some(name) = explicit {
        if header.iter().any(|h| h == name) {
            return Some(name.to_string());
        }
    }

    let lower: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
    for candidate in candidates {
        if let Some(idx) = lower.iter().position(|h| h == candidate) {
            return Some(header[idx].clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_candidates_case_insensitive() {
        let cols = resolve(&header(&["Data", "Totale"]), None).unwrap();
        assert_eq!(cols.date, "Data");
        assert_eq!(cols.amount.as_deref(), Some("Totale"));
        assert_eq!(cols.close, None);
    }

    #[test]
    fn test_resolve_first_candidate_wins() {
        // "amount" precedes "revenue" in the candidate list.
        let cols = resolve(&header(&["date", "Revenue", "Amount"]), None).unwrap();
        assert_eq!(cols.amount.as_deref(), Some("Amount"));
    }

    #[test]
    fn test_resolve_explicit_mapping_is_exact() {
        let mut spec = MappingSpec::default();
        spec.amount = Some("Net Sales".to_string());
        let cols = resolve(&header(&["date", "Net Sales"]), Some(&spec)).unwrap();
        assert_eq!(cols.amount.as_deref(), Some("Net Sales"));

        // Wrong case: explicit path does not match, candidates find nothing.
        spec.amount = Some("net sales".to_string());
        let cols = resolve(&header(&["date", "Net Sales"]), Some(&spec)).unwrap();
        assert_eq!(cols.amount, None);
    }

    #[test]
    fn test_resolve_missing_date_is_an_error() {
        let err = resolve(&header(&["amount", "qty"]), None).unwrap_err();
        assert_eq!(err, AnalysisError::DateColumnNotFound);
    }

    #[test]
    fn test_infer_mode_close_column() {
        let cols = resolve(&header(&["date", "Close"]), None).unwrap();
        assert_eq!(infer_mode(&cols), Mode::Finance);
    }

    #[test]
    fn test_infer_mode_symbol_column() {
        let cols = resolve(&header(&["date", "ticker", "amount"]), None).unwrap();
        assert_eq!(infer_mode(&cols), Mode::Finance);
    }

    #[test]
    fn test_infer_mode_price_and_qty() {
        let cols = resolve(&header(&["date", "price", "qty"]), None).unwrap();
        assert_eq!(infer_mode(&cols), Mode::Finance);
    }

    #[test]
    fn test_infer_mode_defaults_to_business() {
        let cols = resolve(&header(&["date", "amount"]), None).unwrap();
        assert_eq!(infer_mode(&cols), Mode::Business);
    }
}
