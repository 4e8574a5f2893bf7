//! Psychological support chat proxy.
//!
//! The service adds no conversational logic of its own: it assembles a
//! system prompt from the ASTRA persona, the astronaut's latest vitals,
//! and the trailing session window, then forwards the user's message to
//! an OpenAI-compatible chat-completions endpoint. The provider sits
//! behind the [`SupportModel`] trait so tests can stub it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::AppError;
use crate::models::{ChatRecord, HealthReading};

/// Persona and guardrails for the support companion.
pub const ASTRA_PERSONA: &str = "\
You are ASTRA, the psychological support companion for astronauts on \
long-duration space missions.

Core traits: warm, empathetic, professional yet approachable, calm and \
reassuring under stress, knowledgeable about space psychology and human \
performance.

You help with stress management (breathing exercises, grounding \
techniques), focus and task prioritization, motivation and resilience, \
sleep and circadian guidance, crew dynamics, and coping with isolation \
and separation from loved ones.

Guidelines:
- Keep responses concise but meaningful, typically 2-4 sentences.
- Never provide medical diagnoses or clinical therapy.
- If physical symptoms come up, gently suggest logging them in the \
health system.
- Acknowledge feelings without judgment and offer practical, actionable \
suggestions.
- Remember you are speaking to highly trained professionals.

Response style: start by acknowledging their state, give one specific \
actionable suggestion, end with reassurance or a forward-looking note.";

#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("Failed to build HTTP client: {0}")]
    Config(String),

    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    ResponseShape(String),
}

impl From<SupportError> for AppError {
    fn from(err: SupportError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// Seam for the completion provider.
#[async_trait]
pub trait SupportModel: Send + Sync {
    /// Forward one user message under the given system prompt and return
    /// the assistant's reply.
    async fn complete(&self, system_prompt: &str, user_message: &str)
        -> Result<String, SupportError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Reqwest-backed client for an OpenAI-compatible chat-completions API.
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl CompletionClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, SupportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| SupportError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl SupportModel for CompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, SupportError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupportError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| SupportError::ResponseShape(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SupportError::ResponseShape("no choices in response".to_string()))
    }
}

/// Day-scoped default session key.
pub fn default_session_id(astronaut_id: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", astronaut_id, at.format("%Y%m%d"))
}

/// Assemble the full system prompt: persona, latest vitals, and the most
/// recent exchanges of the session.
pub fn build_system_prompt(
    latest_reading: Option<&HealthReading>,
    window: &[ChatRecord],
    inline_exchanges: usize,
) -> String {
    let mut prompt = ASTRA_PERSONA.to_string();

    if let Some(reading) = latest_reading {
        prompt.push_str(&format!(
            "\n\nCurrent Health Context: HR={:.0} BPM, Stress={:.0}%, Fatigue={:.0}%",
            reading.heart_rate, reading.stress_level, reading.fatigue_level
        ));
    }

    let recent = window
        .iter()
        .skip(window.len().saturating_sub(inline_exchanges));
    let mut turns = Vec::new();
    for exchange in recent {
        turns.push(format!("Astronaut: {}", exchange.user_message));
        turns.push(format!("ASTRA: {}", exchange.assistant_response));
    }
    if !turns.is_empty() {
        prompt.push_str("\n\nRecent conversation:\n");
        prompt.push_str(&turns.join("\n"));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::models::ValidationReport;

    fn reading() -> HealthReading {
        HealthReading {
            id: Uuid::new_v4(),
            astronaut_id: "AST-1".to_string(),
            heart_rate: 72.4,
            hrv: 51.0,
            stress_level: 35.6,
            fatigue_level: 20.0,
            timestamp: Utc::now(),
            confidence: 0.9,
            source: "manual".to_string(),
            validation: ValidationReport {
                is_valid: true,
                issues: vec![],
                adjusted_confidence: 0.9,
                data_freshness: "current".to_string(),
            },
            created_at: Utc::now(),
        }
    }

    fn exchange(n: usize) -> ChatRecord {
        ChatRecord {
            id: Uuid::new_v4(),
            astronaut_id: "AST-1".to_string(),
            session_id: "AST-1-20260806".to_string(),
            user_message: format!("message {n}"),
            assistant_response: format!("reply {n}"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn session_id_is_day_stamped() {
        let at = "2026-08-06T14:30:00Z".parse().unwrap();
        assert_eq!(default_session_id("AST-42", at), "AST-42-20260806");
    }

    #[test]
    fn prompt_includes_vitals_when_available() {
        let r = reading();
        let prompt = build_system_prompt(Some(&r), &[], 6);
        assert!(prompt.contains("HR=72 BPM"));
        assert!(prompt.contains("Stress=36%"));
        assert!(!prompt.contains("Recent conversation"));
    }

    #[test]
    fn prompt_omits_vitals_without_a_reading() {
        let prompt = build_system_prompt(None, &[], 6);
        assert!(!prompt.contains("Current Health Context"));
    }

    #[test]
    fn prompt_inlines_only_the_trailing_exchanges() {
        let window: Vec<_> = (0..10).map(exchange).collect();
        let prompt = build_system_prompt(None, &window, 6);
        assert!(!prompt.contains("message 3"));
        assert!(prompt.contains("message 4"));
        assert!(prompt.contains("ASTRA: reply 9"));
    }
}
