use super::client::{ChatBackend, ChatMessage, ChatRequest};
use super::error::LlmError;
use super::prompts;
use super::settings::LlmSettings;

/// Ask the indicator model for litigation red flags in free-text claim notes.
///
/// Returns the model's topic-by-topic bullet list unchanged.
pub async fn flag_litigation_indicators<B: ChatBackend + ?Sized>(
    backend: &B,
    settings: &LlmSettings,
    notes: &str,
) -> Result<String, LlmError> {
    let request = ChatRequest::new(
        &settings.indicator_model,
        vec![
            ChatMessage::system(prompts::CLAIMS_ASSISTANT_ROLE),
            ChatMessage::user(prompts::indicator_prompt(notes)),
        ],
        prompts::INDICATORS,
    );
    tracing::debug!(model = %request.model, notes_len = notes.len(), "flagging litigation indicators");
    backend.complete(&request).await
}
