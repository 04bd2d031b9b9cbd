//! Finance-mode metrics over a sparse trading-day series.
//!
//! Works on day-over-day simple returns. Every ratio keeps the lenient
//! policy: a zero denominator (or non-positive power base) yields 0.0.

use serde_json::json;

use models::{ActionItem, AnalysisResult, ForecastSummary, Priority};

use crate::aggregate::DatedValue;
use crate::business::to_timepoints;
use crate::stats::{mean_std, round2, round4};

const ANOMALY_Z_THRESHOLD: f64 = 2.5;
const MAX_REPORTED_ANOMALIES: usize = 10;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const EWMA_ALPHA: f64 = 0.2;
const FORECAST_PERIODS: i32 = 30;

/// Computes return-based KPIs, an EWMA forecast and anomaly flags for a
/// price or portfolio-value series. `rf_annual_pct` is the annual risk-free
/// rate in percent (e.g. 3.0 for 3%).
pub fn analyze_finance(series: &[DatedValue], rf_annual_pct: f64) -> AnalysisResult {
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let returns = simple_returns(&values);

    let first = values.first().copied().unwrap_or(0.0);
    let last = values.last().copied().unwrap_or(0.0);
    let days_span = match (series.first(), series.last()) {
        (Some((a, _)), Some((b, _))) => (*b - *a).num_days(),
        _ => 0,
    };
    let cagr = compute_cagr(first, last, days_span);

    let (mean_r, std_r) = mean_std(&returns);
    let vol_annual = std_r * TRADING_DAYS_PER_YEAR.sqrt();
    let rf_daily = rf_annual_pct / 100.0 / TRADING_DAYS_PER_YEAR;
    let sharpe = if std_r > 0.0 {
        (mean_r - rf_daily) / std_r * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let max_drawdown = compute_max_drawdown(&returns);
    let hit_ratio = if returns.is_empty() {
        0.0
    } else {
        returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64
    };

    let tail_start = returns.len().saturating_sub(30);
    let return_30d = compound(&returns[tail_start..]);

    // EWMA of returns, seeded at 0, projected over 30 periods.
    let mut ewma = 0.0;
    for r in &returns {
        ewma = EWMA_ALPHA * r + (1.0 - EWMA_ALPHA) * ewma;
    }
    let forecast_return = (1.0 + ewma).powi(FORECAST_PERIODS) - 1.0;

    let anomalies = return_anomalies(series, &returns);
    let actions = finance_actions(sharpe, max_drawdown, hit_ratio);

    let mut kpi = serde_json::Map::new();
    kpi.insert("cagr".to_string(), json!(round4(cagr)));
    kpi.insert("vol_annual".to_string(), json!(round4(vol_annual)));
    kpi.insert("sharpe".to_string(), json!(round2(sharpe)));
    kpi.insert("max_drawdown".to_string(), json!(round4(max_drawdown)));
    kpi.insert("hit_ratio".to_string(), json!(round4(hit_ratio)));
    kpi.insert("return_30d".to_string(), json!(round4(return_30d)));

    AnalysisResult {
        kpi,
        forecast: ForecastSummary {
            method: "ewma".to_string(),
            window_days: returns.len(),
            // Projected 30-period compounded return, in percent.
            forecast_30d_sum: round2(forecast_return * 100.0),
            change_vs_last30_pct: round2((forecast_return - return_30d) * 100.0),
        },
        anomalies,
        actions,
        timeseries: to_timepoints(series),
    }
}

/// Day-over-day simple returns; a zero previous value contributes 0.0.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

fn compute_cagr(first: f64, last: f64, days_span: i64) -> f64 {
    if first <= 0.0 || days_span <= 0 {
        return 0.0;
    }
    let ratio = last / first;
    if ratio <= 0.0 {
        return 0.0;
    }
    ratio.powf(365.0 / days_span as f64) - 1.0
}

/// Largest peak-to-trough decline of a synthetic equity curve that starts
/// at 1.0 and compounds the returns. Always <= 0.
fn compute_max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut max_dd = 0.0f64;
    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        max_dd = max_dd.min(equity / peak - 1.0);
    }
    max_dd
}

fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Z-score anomalies over returns. Each flagged date is the later day of
/// its return pair.
fn return_anomalies(series: &[DatedValue], returns: &[f64]) -> Vec<String> {
    let (m, s) = mean_std(returns);
    let mut anomalies = Vec::new();
    if s > 0.0 {
        for (i, r) in returns.iter().enumerate() {
            let z = (r - m) / s;
            if z.abs() >= ANOMALY_Z_THRESHOLD {
                anomalies.push(series[i + 1].0.format("%Y-%m-%d").to_string());
            }
        }
    }
    anomalies.truncate(MAX_REPORTED_ANOMALIES);
    anomalies
}

fn finance_actions(sharpe: f64, max_drawdown: f64, hit_ratio: f64) -> Vec<ActionItem> {
    let mut actions = Vec::new();
    if sharpe < 0.3 {
        actions.push(ActionItem {
            title: "Review risk exposure and position sizing".to_string(),
            expected_uplift_pct: 4,
            priority: Priority::High,
        });
    }
    if max_drawdown < -0.15 {
        actions.push(ActionItem {
            title: "Set stop-loss levels on open positions".to_string(),
            expected_uplift_pct: 3,
            priority: Priority::High,
        });
    }
    if hit_ratio < 0.45 {
        actions.push(ActionItem {
            title: "Avoid overtrading, favour fewer higher-conviction entries".to_string(),
            expected_uplift_pct: 2,
            priority: Priority::Medium,
        });
    }
    if actions.is_empty() {
        actions.push(ActionItem {
            title: "Maintain current sizing and review monthly".to_string(),
            expected_uplift_pct: 1,
            priority: Priority::Low,
        });
    }
    actions
}
