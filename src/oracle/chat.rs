//! OpenAI-compatible chat-completions client used as the decision oracle

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{DecisionOracle, RetryPolicy};
use crate::config::OracleConfig;
use crate::domain::ChatMessage;
use crate::error::{OracleError, Result};

/// Chat-completions request
#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat-completions response
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Oracle backed by a remote chat-completions endpoint
pub struct ChatCompletionsOracle {
    config: OracleConfig,
    retry: RetryPolicy,
    http: Client,
}

impl ChatCompletionsOracle {
    pub fn new(config: OracleConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(OracleError::NotConfigured.into());
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            retry: RetryPolicy::from_config(&config),
            config,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Single request, no retries
    async fn complete(&self, history: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: history,
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!("Sending {} turns to {}", history.len(), url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Oracle API error: {} - {}", status, body);
            return Err(OracleError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transport(format!("Failed to parse response: {}", e)))?;

        parse_reply(parsed)
    }
}

fn parse_reply(response: ChatResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or(OracleError::EmptyReply)?
        .message
        .content
        .unwrap_or_default();

    debug!("Oracle reply received: {} chars", content.len());
    Ok(content)
}

#[async_trait]
impl DecisionOracle for ChatCompletionsOracle {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String> {
        self.retry
            .run("Oracle request", || self.complete(history))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[test]
    fn test_unconfigured_key_rejected() {
        let cfg = OracleConfig::default();
        assert!(matches!(
            ChatCompletionsOracle::new(cfg),
            Err(GameError::Oracle(OracleError::NotConfigured))
        ));
    }

    #[test]
    fn test_request_serializes_history() {
        let history = vec![
            ChatMessage::system("rules"),
            ChatMessage::user("Round 1. Choose."),
        ];
        let request = ChatRequest {
            model: "m",
            messages: &history,
            temperature: Some(0.5),
            max_tokens: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "Round 1. Choose.");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_reply() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Mode: dual"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parse_reply(parsed).unwrap(), "Mode: dual");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            parse_reply(empty),
            Err(GameError::Oracle(OracleError::EmptyReply))
        ));
    }
}
