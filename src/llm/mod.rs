//! Model-backed claim helpers: exhibit summaries and litigation indicators.
//!
//! Every operation takes an explicit [`ChatBackend`] and [`LlmSettings`]; there
//! is no process-wide client.

pub mod cache;
pub mod client;
pub mod error;
pub mod exhibit;
pub mod indicators;
pub mod prompts;
pub mod settings;

pub use cache::{get_cache_path, CachedBackend};
pub use client::{ChatBackend, ChatRequest, OpenAiClient};
pub use error::LlmError;
pub use exhibit::{summarize_exhibit, summarize_exhibits, ExhibitKind, ExhibitOutcome, ExhibitReport};
pub use indicators::flag_litigation_indicators;
pub use settings::{api_key_from_env, LlmConfig, LlmSettings};
