//! Builds the compact numeric prompt handed to the LLM.

use models::{AdvisorContext, AnalysisPayload};
use serde_json::Value;

use crate::report::kpi_f64;

/// Flattens the analysis payload into the fixed prompt layout. Missing
/// values default to 0 (or "n/a" for the context estimates).
pub fn build_prompt(analysis: &AnalysisPayload, context: Option<&AdvisorContext>) -> String {
    let revenue = kpi_f64(analysis, "revenue_30d").unwrap_or(0.0);
    let days = analysis
        .kpi
        .get("orders_days_positive_30d")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let ticket = kpi_f64(analysis, "avg_ticket").unwrap_or(0.0);
    let trend = kpi_f64(analysis, "trend_last_2w_vs_prev_2w_pct").unwrap_or(0.0);

    let (forecast_sum, forecast_change) = analysis
        .forecast
        .as_ref()
        .map(|f| {
            (
                f.forecast_30d_sum.unwrap_or(0.0),
                f.change_vs_last30_pct.unwrap_or(0.0),
            )
        })
        .unwrap_or((0.0, 0.0));

    let mom = context
        .and_then(|c| c.mom_pct)
        .map(|v| format!("{v}"))
        .unwrap_or_else(|| "n/a".to_string());
    let yoy = context
        .and_then(|c| c.yoy_pct)
        .map(|v| format!("{v}"))
        .unwrap_or_else(|| "n/a".to_string());

    let action_titles: Vec<&str> = analysis
        .actions
        .iter()
        .filter_map(|a| a.get("title").and_then(Value::as_str))
        .collect();

    format!(
        "Analysis data:\n\
         - Revenue30: €{revenue}\n\
         - Days with sales: {days}\n\
         - Avg ticket: €{ticket}\n\
         - Trend 2w vs 2w: {trend}%\n\
         - Forecast30: €{forecast_sum} ({forecast_change}% vs last 30)\n\
         - Est. MoM: {mom}% | Est. YoY: {yoy}%\n\
         - Anomalies: {anomaly_count}\n\
         - Actions: {action_titles:?}\n\n\
         Write a discursive analysis of 25-30 lines with causes, risks and a practical \
         7/30/90-day plan.",
        anomaly_count = analysis.anomalies.len(),
    )
}
