use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// Raw tabular input

/// A decoded upload: ordered header plus one map per row.
///
/// Cell values keep whatever type the file carried (string, number) and are
/// simply absent when the row was shorter than the header. Coercion to typed
/// floats and dates happens downstream, per cell.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<HashMap<String, Value>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// Upload mapping (user-supplied column hints)

/// Optional column mapping sent alongside an upload.
///
/// Every field is optional; a missing field means "autodetect". Column names
/// must match the header exactly; case-insensitive matching only applies to
/// the built-in candidate lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingSpec {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub qty: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub options: MappingOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingOptions {
    #[serde(default)]
    pub decimal: Option<DecimalStyle>,
    #[serde(default)]
    pub date_format: Option<String>,
}

/// Decimal convention of numeric cells. European files use "1.234,56".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DecimalStyle {
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = ".")]
    Dot,
}

impl Default for DecimalStyle {
    fn default() -> Self {
        DecimalStyle::Comma
    }
}

// Analysis mode

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Business,
    Finance,
}

impl Mode {
    pub fn from_str(s: &str) -> Option<Mode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Some(Mode::Business),
            "finance" => Some(Mode::Finance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Business => "business",
            Mode::Finance => "finance",
        }
    }
}

// Analysis output envelope

/// The full result of one upload analysis. Same envelope for both modes;
/// only the KPI key set differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub kpi: serde_json::Map<String, Value>,
    pub forecast: ForecastSummary,
    pub anomalies: Vec<String>,
    pub actions: Vec<ActionItem>,
    pub timeseries: Vec<TimePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub method: String,
    pub window_days: usize,
    pub forecast_30d_sum: f64,
    pub change_vs_last30_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub title: String,
    pub expected_uplift_pct: i64,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: String,
    pub value: f64,
}

// Advisor request/response

/// Analysis data as the advisor endpoint accepts it: everything optional,
/// so a caller can ask for narration from a partial payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub kpi: serde_json::Map<String, Value>,
    #[serde(default)]
    pub forecast: Option<ForecastPayload>,
    #[serde(default)]
    pub anomalies: Vec<Value>,
    #[serde(default)]
    pub actions: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub forecast_30d_sum: Option<f64>,
    #[serde(default)]
    pub change_vs_last30_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvisorContext {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub mom_pct: Option<f64>,
    #[serde(default)]
    pub yoy_pct: Option<f64>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdvisorRequest {
    pub analysis: AnalysisPayload,
    #[serde(default)]
    pub context: Option<AdvisorContext>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvisorReport {
    pub mode: String,
    pub advisor_text: String,
    pub playbook: Playbook,
}

#[derive(Debug, Clone, Serialize)]
pub struct Playbook {
    #[serde(rename = "7d")]
    pub seven_days: Vec<String>,
    #[serde(rename = "30d")]
    pub thirty_days: Vec<String>,
    #[serde(rename = "90d")]
    pub ninety_days: Vec<String>,
}
