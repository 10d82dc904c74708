//! OpenAI-compatible chat completion client
//!
//! Speaks the `/chat/completions` protocol used by OpenRouter and most
//! hosted model gateways. One request per evaluation, no streaming.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use swarm_application::{CompletionError, InitializationError, LlmCompletion};
use swarm_domain::LlmSettings;
use tracing::debug;

/// Environment variable holding the gateway API key
pub const API_KEY_ENV: &str = "SWARM_LLM_API_KEY";

/// Upper bound for a single request; the round deadline usually fires first
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct OpenRouterCompletion {
    client: reqwest::Client,
    settings: LlmSettings,
    api_key: String,
}

impl OpenRouterCompletion {
    pub fn new(settings: LlmSettings, api_key: impl Into<String>) -> Result<Self, InitializationError> {
        settings
            .validate()
            .map_err(|e| InitializationError::InvalidSettings(e.to_string()))?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(InitializationError::MissingDependency(format!(
                "{} is empty",
                API_KEY_ENV
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InitializationError::Failed(e.to_string()))?;
        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    /// Build a client with the API key taken from [`API_KEY_ENV`].
    pub fn from_env(settings: LlmSettings) -> Result<Self, InitializationError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            InitializationError::MissingDependency(format!("{} is not set", API_KEY_ENV))
        })?;
        Self::new(settings, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_url.trim_end_matches('/')
        )
    }

    fn request<'a>(&'a self, system_prompt: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        let system = self
            .settings
            .system_prompt
            .as_deref()
            .unwrap_or(system_prompt);
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

fn first_choice(response: ChatResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| CompletionError::Other("response contained no choices".to_string()))
}

#[async_trait]
impl LlmCompletion for OpenRouterCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, CompletionError> {
        debug!("Requesting completion from {}", self.settings.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("X-Title", "swarm-consensus")
            .json(&self.request(system_prompt, prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else if e.is_connect() {
                    CompletionError::ConnectionError(e.to_string())
                } else {
                    CompletionError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::RequestFailed(format!(
                "HTTP {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Other(format!("invalid response body: {}", e)))?;
        first_choice(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenRouterCompletion {
        OpenRouterCompletion::new(
            LlmSettings {
                api_url: "https://gateway.test/api/v1/".to_string(),
                ..LlmSettings::default()
            },
            "key",
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_path() {
        assert_eq!(
            client().endpoint(),
            "https://gateway.test/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body() {
        let client = client();
        let body = serde_json::to_value(client.request("be brief", "judge this")).unwrap();
        assert_eq!(body["model"], "anthropic/claude-3.5-sonnet");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["content"], "judge this");
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn test_configured_system_prompt_wins() {
        let client = OpenRouterCompletion::new(
            LlmSettings {
                system_prompt: Some("house rules".to_string()),
                ..LlmSettings::default()
            },
            "key",
        )
        .unwrap();
        let body = serde_json::to_value(client.request("be brief", "judge this")).unwrap();
        assert_eq!(body["messages"][0]["content"], "house rules");
    }

    #[test]
    fn test_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": " {\"confidence\": 0.8} "}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), r#"{"confidence": 0.8}"#);

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_choice(empty), Err(CompletionError::Other(_))));
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(matches!(
            OpenRouterCompletion::new(LlmSettings::default(), " "),
            Err(InitializationError::MissingDependency(_))
        ));
    }
}
