use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;

use super::error::LlmError;
use super::settings::LlmSettings;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Sampling knobs for one prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: Option<u32>,
}

/// Body of a Chat Completions request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: &str, messages: Vec<ChatMessage>, sampling: Sampling) -> Self {
        Self {
            model: model.to_string(),
            messages,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_tokens,
        }
    }
}

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

/// Text-in/text-out model access. Implementations return the trimmed reply.
pub trait ChatBackend: Send + Sync {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> CompletionFuture<'a>;

    /// Backend name for diagnostics
    fn name(&self) -> &'static str;
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Longest error body kept in `LlmError::Api`
const MAX_ERROR_BODY: usize = 500;

/// OpenAI-compatible Chat Completions client
pub struct OpenAiClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl OpenAiClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("counsel-rank/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, settings })
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .http
            .post(self.settings.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            401 | 403 => return Err(LlmError::Auth { status }),
            429 => return Err(LlmError::RateLimited),
            s if !(200..300).contains(&s) => {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status,
                    body: body.chars().take(MAX_ERROR_BODY).collect(),
                });
            }
            _ => {}
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        extract_content(body)
    }
}

fn extract_content(body: CompletionResponse) -> Result<String, LlmError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Decode("response has no choices".to_string()))?
        .message
        .content
        .unwrap_or_default();

    let trimmed = content.trim();
    if trimmed.is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Run `attempt` with exponential backoff, retrying transient failures only.
///
/// Permanent failures come back as Ok(Err) so they end the retry loop.
async fn with_transient_retry<F, Fut>(max_attempts: usize, mut attempt: F) -> Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(max_attempts.saturating_sub(1));

    Retry::spawn(retry_strategy, || {
        let pending = attempt();
        async move {
            match pending.await {
                Err(e) if e.is_transient() => {
                    tracing::warn!(error = %e, "transient LLM failure, retrying");
                    Err(e)
                }
                outcome => Ok(outcome),
            }
        }
    })
    .await
    .and_then(|outcome| outcome)
}

impl ChatBackend for OpenAiClient {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            tracing::debug!(model = %request.model, messages = request.messages.len(), "chat completion");
            with_transient_retry(self.settings.max_retries, || self.send_once(request)).await
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::settings::LlmConfig;

    fn parse(json: &str) -> CompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest::new(
            "gpt-4o-mini",
            vec![
                ChatMessage::system("You are a precise legal summarizer."),
                ChatMessage::user_parts(vec![
                    ContentPart::Text {
                        text: "Describe".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AAAA".to_string(),
                        },
                    },
                ]),
            ],
            Sampling {
                temperature: 0.5,
                top_p: 0.5,
                max_tokens: None,
            },
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "You are a precise legal summarizer.");
        assert_eq!(value["messages"][1]["content"][0]["type"], "text");
        assert_eq!(value["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_extract_content_trims() {
        let body = parse(r#"{"choices":[{"message":{"content":"  - fact one\n"}}]}"#);
        assert_eq!(extract_content(body).unwrap(), "- fact one");
    }

    #[test]
    fn test_extract_content_empty() {
        let blank = parse(r#"{"choices":[{"message":{"content":"   "}}]}"#);
        assert_eq!(extract_content(blank).unwrap_err(), LlmError::EmptyContent);

        let null = parse(r#"{"choices":[{"message":{"content":null}}]}"#);
        assert_eq!(extract_content(null).unwrap_err(), LlmError::EmptyContent);
    }

    #[test]
    fn test_extract_content_no_choices() {
        let body = parse(r#"{"choices":[]}"#);
        assert!(matches!(extract_content(body), Err(LlmError::Decode(_))));
    }

    #[test]
    fn test_client_requires_key() {
        let settings = LlmSettings::from_config(&LlmConfig::default(), "  ".to_string()).unwrap();
        assert!(matches!(
            OpenAiClient::new(settings),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Another test may have installed it already
        let _ = rustls::crypto::ring::default_provider().install_default();

        let config = LlmConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout: Some("2s".to_string()),
            max_retries: Some(1),
            ..LlmConfig::default()
        };
        let settings = LlmSettings::from_config(&config, "sk-test".to_string()).unwrap();
        let client = OpenAiClient::new(settings).unwrap();
        let request = ChatRequest::new(
            "gpt-4o-mini",
            vec![ChatMessage::user("hello")],
            Sampling {
                temperature: 0.1,
                top_p: 0.1,
                max_tokens: Some(10),
            },
        );

        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
    }

    #[tokio::test]
    async fn test_retry_stops_on_permanent_failure() {
        let mut calls = 0;
        let err = with_transient_retry(3, || {
            calls += 1;
            async { Err(LlmError::Auth { status: 401 }) }
        })
        .await
        .unwrap_err();

        assert_eq!(err, LlmError::Auth { status: 401 });
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let mut calls = 0;
        let reply = with_transient_retry(3, || {
            calls += 1;
            let outcome = if calls < 2 {
                Err(LlmError::RateLimited)
            } else {
                Ok("summary".to_string())
            };
            async move { outcome }
        })
        .await
        .unwrap();

        assert_eq!(reply, "summary");
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let mut calls = 0;
        let err = with_transient_retry(2, || {
            calls += 1;
            async { Err(LlmError::RateLimited) }
        })
        .await
        .unwrap_err();

        assert_eq!(err, LlmError::RateLimited);
        assert_eq!(calls, 2);
    }
}
