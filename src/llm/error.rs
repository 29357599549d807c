use std::fmt;
use std::path::PathBuf;

/// Why a model call produced no usable text
#[derive(Debug, Clone, PartialEq)]
pub enum LlmError {
    MissingApiKey,
    Network(String),
    Auth { status: u16 },
    RateLimited,
    Api { status: u16, body: String },
    Decode(String),
    /// The request succeeded but the model returned no text
    EmptyContent,
    Io { path: PathBuf, message: String },
}

impl LlmError {
    /// Worth retrying: connection trouble, throttling, or a server-side failure
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::RateLimited => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::MissingApiKey => write!(
                f,
                "No API key. Set {} in the environment or a .env file",
                super::settings::ENV_API_KEY
            ),
            LlmError::Network(msg) => write!(f, "Network error: {}", msg),
            LlmError::Auth { status } => write!(
                f,
                "Authentication failed (HTTP {}). Your API key may be invalid or expired.",
                status
            ),
            LlmError::RateLimited => {
                write!(f, "LLM API rate limit exceeded. Wait a few minutes and try again.")
            }
            LlmError::Api { status, body } => write!(f, "LLM API error (HTTP {}): {}", status, body),
            LlmError::Decode(msg) => write!(f, "Unexpected LLM API response: {}", msg),
            LlmError::EmptyContent => write!(f, "Model returned empty content"),
            LlmError::Io { path, message } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for LlmError {}
