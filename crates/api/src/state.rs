use std::sync::Arc;

use ai_client::{LlmClient, LlmConfig};
use credits::CreditsClient;
use settings_loader::AppSettings;

/// Shared request state: the settings struct built at startup plus the two
/// outbound clients. Everything request-scoped lives in the handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub credits: CreditsClient,
    pub llm: LlmClient,
}

impl AppState {
    pub fn new(settings: AppSettings) -> AppState {
        let credits = CreditsClient::new(settings.credits_url.clone(), settings.credits_key.clone());
        let llm = LlmClient::new(LlmConfig {
            api_key: settings.llm_api_key.clone(),
            model: settings.llm_model.clone(),
            base_url: settings.llm_base_url.clone(),
        });

        AppState {
            settings: Arc::new(settings),
            credits,
            llm,
        }
    }
}
