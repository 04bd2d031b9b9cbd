use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use models::{AdvisorRequest, MappingSpec, Mode};

use crate::{error::ApiError, state::AppState, Result};

/// GET /health
/// Liveness probe with a UTC timestamp.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "ts": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Decoded multipart fields of an /analyze request.
#[derive(Default)]
struct AnalyzeUpload {
    filename: Option<String>,
    bytes: Option<Vec<u8>>,
    mapping: Option<String>,
    mode: Option<String>,
    rf_annual_pct: Option<String>,
}

/// POST /analyze
/// Multipart upload: `file` (required), `mapping` (JSON), `mode`,
/// `rf_annual_pct`. Returns the full analysis envelope.
pub async fn analyze(multipart: Multipart) -> Result<impl IntoResponse> {
    let upload = read_upload(multipart).await?;

    let filename = upload
        .filename
        .ok_or_else(|| ApiError::BadRequest("Missing file upload".to_string()))?;
    let bytes = upload
        .bytes
        .ok_or_else(|| ApiError::BadRequest("Missing file upload".to_string()))?;

    let kind = ingest::FileKind::from_filename(&filename)
        .ok_or_else(|| ApiError::BadRequest("Only CSV or XLSX files are accepted".to_string()))?;

    let mapping = parse_mapping(upload.mapping.as_deref())?;
    let mode = parse_mode(upload.mode.as_deref())?;
    let rf_annual_pct = parse_rf(upload.rf_annual_pct.as_deref())?;

    let table = ingest::read_table(&bytes, kind)
        .map_err(|err| ApiError::BadRequest(format!("Unreadable file: {err:#}")))?;
    if table.header.is_empty() || table.is_empty() {
        return Err(ApiError::BadRequest("Empty file or missing header".to_string()));
    }

    let result = analysis::analyze(&table, mapping.as_ref(), mode, rf_annual_pct)?;
    Ok(Json(result))
}

/// POST /advisor
/// Credit gate first (when a user id is present), then narration.
pub async fn advisor(
    State(state): State<AppState>,
    Json(request): Json<AdvisorRequest>,
) -> Result<impl IntoResponse> {
    if let Some(user_id) = &request.user_id {
        if !state.credits.consume_credit(user_id).await {
            return Err(ApiError::PaymentRequired(
                "Credits exhausted. Top up on the pricing page to continue.".to_string(),
            ));
        }
        let period = request.context.as_ref().and_then(|c| c.period.clone());
        state
            .credits
            .log_usage(user_id, "advisor", json!({ "endpoint": "advisor", "period": period }))
            .await;
    }

    let report = advisor::narrate(&state.llm, &request.analysis, request.context.as_ref()).await;
    Ok(Json(report))
}

async fn read_upload(mut multipart: Multipart) -> Result<AnalyzeUpload> {
    let mut upload = AnalyzeUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                upload.filename = field.file_name().map(|n| n.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Could not read file upload".to_string()))?;
                upload.bytes = Some(bytes.to_vec());
            }
            "mapping" => upload.mapping = Some(read_text(field).await?),
            "mode" => upload.mode = Some(read_text(field).await?),
            "rf_annual_pct" => upload.rf_annual_pct = Some(read_text(field).await?),
            _ => {}
        }
    }

    Ok(upload)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart field".to_string()))
}

fn parse_mapping(raw: Option<&str>) -> Result<Option<MappingSpec>> {
    match raw {
        None => Ok(None),
        Some(text) => {
            let spec: MappingSpec = serde_json::from_str(text)
                .map_err(|_| ApiError::BadRequest("Invalid mapping JSON".to_string()))?;
            Ok(Some(spec))
        }
    }
}

fn parse_mode(raw: Option<&str>) -> Result<Option<Mode>> {
    match raw {
        None => Ok(None),
        Some(text) => Mode::from_str(text)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest("Invalid mode: use 'business' or 'finance'".to_string())),
    }
}

fn parse_rf(raw: Option<&str>) -> Result<f64> {
    match raw {
        None => Ok(0.0),
        Some(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| ApiError::BadRequest("Invalid rf_annual_pct value".to_string())),
    }
}
