//! Turns an analysis payload into advisor text.
//!
//! Two generators share one output contract: a deterministic rule-based
//! report, and an LLM call that falls back to the rule-based text on any
//! failure. The playbook always comes from the deterministic generator,
//! even when the narrative text is model-written.

pub mod prompt;
pub mod report;

use ai_client::LlmClient;
use models::{AdvisorContext, AdvisorReport, AnalysisPayload};

const SYSTEM_PROMPT: &str =
    "You are a business advisor. Write a practical report, 25-30 lines, direct tone.";

/// Produces the advisor report, preferring the LLM when one is configured.
pub async fn narrate(
    llm: &LlmClient,
    analysis: &AnalysisPayload,
    context: Option<&AdvisorContext>,
) -> AdvisorReport {
    if llm.is_configured() {
        let user_prompt = prompt::build_prompt(analysis, context);
        match llm.chat(SYSTEM_PROMPT, &user_prompt).await {
            Ok(text) => {
                let rule = report::rule_based_report(analysis, context);
                return AdvisorReport {
                    mode: "llm".to_string(),
                    advisor_text: text,
                    playbook: rule.playbook,
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "LLM narration failed, falling back to rule-based");
            }
        }
    }

    report::rule_based_report(analysis, context)
}
