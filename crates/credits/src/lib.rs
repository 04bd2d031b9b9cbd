//! Client for the external credit-metering service.
//!
//! The paywall is a precondition gate in front of narration, not part of the
//! analytics contract, so the error surface is deliberately boolean:
//! `consume_credit` answers yes/no and `log_usage` never fails the caller.

use std::time::Duration;

use serde_json::{json, Value};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Credit-metering client. When the service URL or key is missing the
/// client is a soft-allow stub: consumption always succeeds and logging is
/// a no-op.
#[derive(Debug, Clone)]
pub struct CreditsClient {
    http: reqwest::Client,
    base_url: Option<String>,
    service_key: Option<String>,
}

impl CreditsClient {
    pub fn new(base_url: Option<String>, service_key: Option<String>) -> CreditsClient {
        CreditsClient {
            http: reqwest::Client::new(),
            base_url,
            service_key,
        }
    }

    fn endpoint(&self, path: &str) -> Option<(String, &str)> {
        let base = self.base_url.as_deref()?;
        let key = self.service_key.as_deref()?;
        Some((format!("{}/{}", base.trim_end_matches('/'), path), key))
    }

    /// Atomically consumes one credit for the user. Returns `false` when
    /// credits are exhausted or the service misbehaves; `true` when the
    /// service is not configured (soft-allow).
    pub async fn consume_credit(&self, user_id: &str) -> bool {
        let Some((url, key)) = self.endpoint("rest/v1/rpc/consume_credit") else {
            return true;
        };

        let response = self
            .http
            .post(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "uid": user_id }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                resp.json::<Value>().await.ok().and_then(|v| v.as_bool()).unwrap_or(false)
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "consume_credit: bad status");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "consume_credit: request failed");
                false
            }
        }
    }

    /// Records a usage event. Best-effort: failures are logged and dropped.
    pub async fn log_usage(&self, user_id: &str, event: &str, meta: Value) {
        let Some((url, key)) = self.endpoint("rest/v1/usage_events") else {
            return;
        };

        let payload = json!({
            "user_id": user_id,
            "event": event,
            "delta": -1,
            "meta": meta,
        });

        let response = self
            .http
            .post(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => tracing::warn!(status = %resp.status(), "log_usage: bad status"),
            Err(err) => tracing::warn!(error = %err, "log_usage: request failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_soft_allows() {
        let client = CreditsClient::new(None, None);
        assert!(client.consume_credit("user-1").await);
    }

    #[tokio::test]
    async fn test_partially_configured_client_soft_allows() {
        let client = CreditsClient::new(Some("https://credits.example".to_string()), None);
        assert!(client.consume_credit("user-1").await);
    }

    #[tokio::test]
    async fn test_unconfigured_log_usage_is_a_noop() {
        let client = CreditsClient::new(None, None);
        client.log_usage("user-1", "advisor", json!({"endpoint": "advisor"})).await;
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = CreditsClient::new(
            Some("https://credits.example/".to_string()),
            Some("key".to_string()),
        );
        let (url, _) = client.endpoint("rest/v1/rpc/consume_credit").unwrap();
        assert_eq!(url, "https://credits.example/rest/v1/rpc/consume_credit");
    }
}
