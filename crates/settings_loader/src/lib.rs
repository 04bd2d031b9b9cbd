//! # Settings Loader
//!
//! Builds the process-wide configuration struct exactly once, at startup.
//! Nothing else in the workspace reads the environment: the analysis core
//! takes every knob (decimal style, date format, mode, risk-free rate) as an
//! explicit function argument, and the HTTP layer receives an [`AppSettings`]
//! value constructed here and passed down.

use std::env;

use anyhow::{Context, Result};

/// Process configuration for the API server and its outbound clients.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Bind address for the HTTP server.
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Credentials are always allowed for these.
    pub allowed_origins: Vec<String>,
    /// Credit-metering service. Either unset means the paywall soft-allows.
    pub credits_url: Option<String>,
    pub credits_key: Option<String>,
    /// LLM narration. Key unset means the advisor stays rule-based.
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_base_url: String,
}

impl AppSettings {
    /// Reads configuration from environment variables with sane defaults.
    pub fn from_env() -> Result<AppSettings> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port_raw = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        let port: u16 = port_raw
            .parse()
            .with_context(|| format!("Invalid PORT value: {}", port_raw))?;

        let allowed_origins = parse_origins(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        Ok(AppSettings {
            host,
            port,
            allowed_origins,
            credits_url: non_empty(env::var("CREDITS_API_URL").ok()),
            credits_key: non_empty(env::var("CREDITS_API_KEY").ok()),
            llm_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            llm_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        })
    }

    /// True when the credit-metering side path is fully configured.
    pub fn credits_configured(&self) -> bool {
        self.credits_url.is_some() && self.credits_key.is_some()
    }
}

/// Splits a comma-separated origin list, dropping empty fragments.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
