//! Business-mode metrics over a dense daily revenue series.

use chrono::Duration;
use serde_json::json;

use models::{ActionItem, AnalysisResult, ForecastSummary, Priority, TimePoint};

use crate::aggregate::DatedValue;
use crate::stats::{mean, mean_std, round2};

const ANOMALY_Z_THRESHOLD: f64 = 2.5;
const MAX_REPORTED_ANOMALIES: usize = 10;

/// Computes KPIs, a moving-average forecast, z-score anomalies and the
/// action list for a dense business series.
pub fn analyze_business(series: &[DatedValue]) -> AnalysisResult {
    let end = series.last().map(|(d, _)| *d).expect("non-empty series");
    let window_start = end - Duration::days(29);

    let last30: Vec<f64> = series
        .iter()
        .filter(|(d, _)| *d >= window_start)
        .map(|(_, v)| *v)
        .collect();

    let revenue_30d: f64 = last30.iter().sum();
    let orders_days = last30.iter().filter(|v| **v > 0.0).count();
    let avg_ticket = if orders_days > 0 {
        revenue_30d / orders_days as f64
    } else {
        0.0
    };

    let trend_pct = two_week_trend_pct(&last30);

    // Moving-average forecast over 7..=28 trailing days, scaled to 30.
    let window = if series.len() >= 28 {
        28
    } else {
        series.len().max(7)
    };
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let tail_start = values.len().saturating_sub(window);
    let base = mean(&values[tail_start..]);
    let forecast_30d_sum = base * 30.0;
    let forecast_change_pct = if revenue_30d != 0.0 {
        (forecast_30d_sum - revenue_30d) / revenue_30d * 100.0
    } else {
        0.0
    };

    // Anomaly baseline is the whole series, not the KPI window.
    let (m, s) = mean_std(&values);
    let mut anomalies = Vec::new();
    if s > 0.0 {
        for (d, v) in series {
            let z = (v - m) / s;
            if z.abs() >= ANOMALY_Z_THRESHOLD {
                anomalies.push(d.format("%Y-%m-%d").to_string());
            }
        }
    }
    anomalies.truncate(MAX_REPORTED_ANOMALIES);

    let actions = business_actions(trend_pct, forecast_change_pct, !anomalies.is_empty());

    let mut kpi = serde_json::Map::new();
    kpi.insert("revenue_30d".to_string(), json!(round2(revenue_30d)));
    kpi.insert("orders_days_positive_30d".to_string(), json!(orders_days));
    kpi.insert("avg_ticket".to_string(), json!(round2(avg_ticket)));
    kpi.insert(
        "trend_last_2w_vs_prev_2w_pct".to_string(),
        json!(round2(trend_pct)),
    );

    AnalysisResult {
        kpi,
        forecast: ForecastSummary {
            method: "moving-average".to_string(),
            window_days: window,
            forecast_30d_sum: round2(forecast_30d_sum),
            change_vs_last30_pct: round2(forecast_change_pct),
        },
        anomalies,
        actions,
        timeseries: to_timepoints(series),
    }
}

/// Percent change of the recent two-week mean against the previous two
/// weeks, with truncated sub-windows when history is short. A zero baseline
/// mean yields 0 regardless of the recent mean.
fn two_week_trend_pct(last30: &[f64]) -> f64 {
    if last30.is_empty() {
        return 0.0;
    }
    let len = last30.len();

    let recent = if len >= 14 { &last30[len - 14..] } else { last30 };
    let prev = if len >= 28 {
        &last30[len - 28..len - 14]
    } else {
        let prev_len = (len as i64 - 14).max(1) as usize;
        &last30[..prev_len]
    };

    let w2_recent = mean(recent);
    let w2_prev = mean(prev);
    if w2_prev != 0.0 {
        (w2_recent - w2_prev) / w2_prev * 100.0
    } else {
        0.0
    }
}

/// Fixed-order rule list; every matching rule fires.
fn business_actions(trend_pct: f64, forecast_change_pct: f64, has_anomalies: bool) -> Vec<ActionItem> {
    let mut actions = Vec::new();
    if trend_pct < -5.0 {
        actions.push(ActionItem {
            title: "Run a 7-day targeted promo on top sellers".to_string(),
            expected_uplift_pct: 5,
            priority: Priority::High,
        });
    }
    if forecast_change_pct < 0.0 {
        actions.push(ActionItem {
            title: "Rebalance stock and push best sellers".to_string(),
            expected_uplift_pct: 3,
            priority: Priority::High,
        });
    }
    if has_anomalies {
        actions.push(ActionItem {
            title: "Investigate anomalous days (pricing, returns, ads)".to_string(),
            expected_uplift_pct: 2,
            priority: Priority::Medium,
        });
    }
    if actions.is_empty() {
        actions.push(ActionItem {
            title: "Keep the current strategy, A/B test pricing or bundles".to_string(),
            expected_uplift_pct: 1,
            priority: Priority::Low,
        });
    }
    actions
}

pub(crate) fn to_timepoints(series: &[DatedValue]) -> Vec<TimePoint> {
    series
        .iter()
        .map(|(d, v)| TimePoint {
            date: d.format("%Y-%m-%d").to_string(),
            value: *v,
        })
        .collect()
}
