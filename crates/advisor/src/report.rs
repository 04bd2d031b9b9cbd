//! Deterministic advisor report.
//!
//! Paragraph sequence mirrors what the dashboard expects: headline numbers,
//! trend signal, forecast outlook, extra indicators, anomaly note, then
//! guidance. Wording is free; the structure and the playbook are not.

use models::{AdvisorContext, AdvisorReport, AnalysisPayload, Playbook};
use serde_json::Value;

/// Builds the full rule-based report.
pub fn rule_based_report(
    analysis: &AnalysisPayload,
    context: Option<&AdvisorContext>,
) -> AdvisorReport {
    let mode = context
        .and_then(|c| c.mode.as_deref())
        .unwrap_or("business");

    let mut parts: Vec<String> = Vec::new();

    if mode == "finance" {
        parts.push(finance_headline(analysis));
    } else {
        parts.push(business_headline(analysis));
        if let Some(trend) = kpi_f64(analysis, "trend_last_2w_vs_prev_2w_pct") {
            let signal = if trend >= 0.0 { "positive" } else { "a slowdown" };
            parts.push(format!(
                "The last two weeks versus the previous two moved {}, {} signal that \
                 describes the recent dynamic well.",
                pct(trend, 2),
                signal
            ));
        }
    }

    if let Some(forecast) = &analysis.forecast {
        if let Some(sum) = forecast.forecast_30d_sum {
            match forecast.change_vs_last30_pct {
                Some(change) => {
                    let tag = if change >= 0.0 { "growing" } else { "cooling" };
                    parts.push(format!(
                        "The 30-day forecast estimates {} ({} vs the last 30): the scenario is {}. \
                         Prepare operational capacity accordingly — stock, customer care, deliveries.",
                        eur(sum, 0),
                        pct(change, 2),
                        tag
                    ));
                }
                None => {
                    parts.push(format!(
                        "The 30-day forecast estimates {}. Keep watch on the customer journey \
                         and supply to consolidate the trajectory.",
                        eur(sum, 0)
                    ));
                }
            }
        }
    }

    let mut extra = Vec::new();
    if let Some(mom) = context.and_then(|c| c.mom_pct) {
        extra.push(format!("MoM {}", pct(mom, 1)));
    }
    if let Some(yoy) = context.and_then(|c| c.yoy_pct) {
        extra.push(format!("YoY {}", pct(yoy, 1)));
    }
    if !extra.is_empty() {
        parts.push(format!("Additional indicators: {}.", extra.join(" | ")));
    }

    if analysis.anomalies.is_empty() {
        parts.push("No significant anomalies were detected in the analyzed period.".to_string());
    } else {
        parts.push(format!(
            "{} anomalous days were recorded and deserve investigation (pricing, returns, advertising).",
            analysis.anomalies.len()
        ));
    }

    parts.push(
        "Guideline: push what already works and run controlled experiments alongside — \
         A/B price or bundle tests, light promotions, a leaner checkout."
            .to_string(),
    );
    parts.push(
        "Main risks: margin erosion, stock-outs and audience saturation. Mitigations: \
         minimum margin thresholds, early stock warnings, periodic creative and targeting refreshes."
            .to_string(),
    );
    parts.push(
        "30-day objectives: revenue +8-12%, AOV +3-5%, stable or falling CAC. Measure every \
         experiment and iterate quickly: each insight should become an operational decision."
            .to_string(),
    );

    AdvisorReport {
        mode: "rule-based".to_string(),
        advisor_text: parts.join("\n\n"),
        playbook: default_playbook(),
    }
}

fn business_headline(analysis: &AnalysisPayload) -> String {
    let revenue = kpi_f64(analysis, "revenue_30d").unwrap_or(0.0);
    let days = analysis
        .kpi
        .get("orders_days_positive_30d")
        .and_then(Value::as_i64)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "—".to_string());
    let ticket = kpi_f64(analysis, "avg_ticket").unwrap_or(0.0);

    format!(
        "Over the last 30 days you generated {} in revenue, spread across {} days with sales. \
         The average ticket sits at {}.",
        eur(revenue, 0),
        days,
        eur(ticket, 2)
    )
}

fn finance_headline(analysis: &AnalysisPayload) -> String {
    let cagr = kpi_f64(analysis, "cagr").unwrap_or(0.0);
    let vol = kpi_f64(analysis, "vol_annual").unwrap_or(0.0);
    let sharpe = kpi_f64(analysis, "sharpe").unwrap_or(0.0);
    let drawdown = kpi_f64(analysis, "max_drawdown").unwrap_or(0.0);

    format!(
        "Over the analyzed period the series compounded at {} annualized with {} volatility \
         (Sharpe {:.2}). The worst peak-to-trough decline was {}.",
        pct(cagr * 100.0, 2),
        pct(vol * 100.0, 2),
        sharpe,
        pct(drawdown * 100.0, 2)
    )
}

fn default_playbook() -> Playbook {
    Playbook {
        seven_days: vec![
            "Diagnose revenue drivers by channel/SKU.".to_string(),
            "Tactical 7-day promo on top sellers (margin protected).".to_string(),
            "A/B test price or bundle on one core product.".to_string(),
            "Streamline checkout (fields, steps, friction removal).".to_string(),
            "Set alerts on anomalies and stock.".to_string(),
        ],
        thirty_days: vec![
            "Scale channels with positive ROI, cut under-performers.".to_string(),
            "Activate bundles/upsells on 2-3 key offers.".to_string(),
            "Optimize supply to prevent stock-outs.".to_string(),
            "Retention sequence for dormant customers.".to_string(),
            "Price review in light of the A/B outcomes.".to_string(),
        ],
        ninety_days: vec![
            "Creative/audience roadmap and promo calendar.".to_string(),
            "Loyalty/CRM automation, cohort and LTV analysis.".to_string(),
            "Growth-margin alignment and playbook refresh.".to_string(),
            "Standardize best practices and document learnings.".to_string(),
            "Tracking dashboard for the key experiments.".to_string(),
        ],
    }
}

pub(crate) fn kpi_f64(analysis: &AnalysisPayload, key: &str) -> Option<f64> {
    analysis.kpi.get(key).and_then(Value::as_f64)
}

/// Euro formatting with European grouping: `€ 12.345` / `€ 12.345,67`.
pub(crate) fn eur(x: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, x.abs());
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    match dec_part {
        Some(d) => format!("€ {}{},{}", sign, grouped, d),
        None => format!("€ {}{}", sign, grouped),
    }
}

pub(crate) fn pct(x: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, x)
}
