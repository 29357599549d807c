use base64::Engine;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::client::{ChatBackend, ChatMessage, ChatRequest, ContentPart, ImageUrl, Sampling};
use super::error::LlmError;
use super::prompts;
use super::settings::LlmSettings;

/// How an exhibit is analyzed, decided by file extension
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExhibitKind {
    Text,
    Image,
    Unsupported,
}

impl ExhibitKind {
    pub fn from_path(path: &Path) -> Self {
        match extension(path).as_str() {
            "txt" | "md" => ExhibitKind::Text,
            "png" | "jpg" | "jpeg" => ExhibitKind::Image,
            _ => ExhibitKind::Unsupported,
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn image_mime(path: &Path) -> &'static str {
    match extension(path).as_str() {
        "png" => "image/png",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExhibitOutcome {
    Analyzed {
        summary: String,
        follow_ups: String,
        recommendations: String,
    },
    /// File type the pipeline does not read; not an error
    Unsupported { extension: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExhibitReport {
    pub path: PathBuf,
    pub kind: ExhibitKind,
    #[serde(flatten)]
    pub outcome: ExhibitOutcome,
    pub generated_at: DateTime<Utc>,
}

async fn ask<B: ChatBackend + ?Sized>(
    backend: &B,
    model: &str,
    role: &str,
    prompt: String,
    sampling: Sampling,
) -> Result<String, LlmError> {
    let request = ChatRequest::new(
        model,
        vec![ChatMessage::system(role), ChatMessage::user(prompt)],
        sampling,
    );
    backend.complete(&request).await
}

async fn analyze_text<B: ChatBackend + ?Sized>(
    backend: &B,
    settings: &LlmSettings,
    path: &Path,
) -> Result<ExhibitOutcome, LlmError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| LlmError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let raw = String::from_utf8_lossy(&bytes);
    let content = if raw.trim().is_empty() {
        prompts::NO_READABLE_CONTENT
    } else {
        raw.as_ref()
    };

    let model = settings.text_model.as_str();
    let summary = ask(
        backend,
        model,
        prompts::SUMMARIZER_ROLE,
        prompts::summary_prompt(content),
        prompts::TEXT_SUMMARY,
    )
    .await?;
    let follow_ups = ask(
        backend,
        model,
        prompts::ADJUSTER_ROLE,
        prompts::follow_up_prompt(content),
        prompts::TEXT_FOLLOW_UPS,
    )
    .await?;
    let recommendations = ask(
        backend,
        model,
        prompts::STRATEGIST_ROLE,
        prompts::next_steps_prompt(content),
        prompts::TEXT_NEXT_STEPS,
    )
    .await?;

    Ok(ExhibitOutcome::Analyzed {
        summary,
        follow_ups,
        recommendations,
    })
}

async fn analyze_image<B: ChatBackend + ?Sized>(
    backend: &B,
    settings: &LlmSettings,
    path: &Path,
) -> Result<ExhibitOutcome, LlmError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| LlmError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let data_url = format!(
        "data:{};base64,{}",
        image_mime(path),
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );

    let vision = ChatRequest::new(
        &settings.vision_model,
        vec![
            ChatMessage::system(prompts::PHOTO_ROLE),
            ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: prompts::PHOTO_INSTRUCTIONS.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ]),
        ],
        prompts::IMAGE_DESCRIPTION,
    );
    let summary = backend.complete(&vision).await?;

    let model = settings.text_model.as_str();
    let follow_ups = ask(
        backend,
        model,
        prompts::ADJUSTER_ROLE,
        prompts::photo_follow_up_prompt(&summary),
        prompts::IMAGE_FOLLOW_UPS,
    )
    .await?;
    let recommendations = ask(
        backend,
        model,
        prompts::LITIGATION_STRATEGIST_ROLE,
        prompts::photo_next_steps_prompt(&summary),
        prompts::IMAGE_NEXT_STEPS,
    )
    .await?;

    Ok(ExhibitOutcome::Analyzed {
        summary,
        follow_ups,
        recommendations,
    })
}

/// Summarize one exhibit: factual summary, follow-up questions and next steps.
///
/// Text exhibits go to the text model; photos go to the vision model first and
/// the advice prompts work from its description. Other file types produce an
/// `Unsupported` report without calling the model.
pub async fn summarize_exhibit<B: ChatBackend + ?Sized>(
    backend: &B,
    settings: &LlmSettings,
    path: &Path,
) -> Result<ExhibitReport, LlmError> {
    let kind = ExhibitKind::from_path(path);
    tracing::debug!(path = %path.display(), ?kind, backend = backend.name(), "summarizing exhibit");

    let outcome = match kind {
        ExhibitKind::Text => analyze_text(backend, settings, path).await?,
        ExhibitKind::Image => analyze_image(backend, settings, path).await?,
        ExhibitKind::Unsupported => ExhibitOutcome::Unsupported {
            extension: extension(path),
        },
    };

    Ok(ExhibitReport {
        path: path.to_path_buf(),
        kind,
        outcome,
        generated_at: Utc::now(),
    })
}

/// Summarize many exhibits with at most `concurrency` in flight.
///
/// Results line up with `paths`; a failed exhibit does not stop the rest.
pub async fn summarize_exhibits<B: ChatBackend + ?Sized>(
    backend: &B,
    settings: &LlmSettings,
    paths: &[PathBuf],
    concurrency: usize,
) -> Vec<(PathBuf, Result<ExhibitReport, LlmError>)> {
    stream::iter(paths)
        .map(|path| async move {
            let result = summarize_exhibit(backend, settings, path).await;
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "exhibit failed");
            }
            (path.clone(), result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::{CompletionFuture, MessageContent};
    use crate::llm::settings::LlmConfig;
    use std::io::Write;
    use std::sync::Mutex;

    /// Records every request and answers with "<model> #<n>"
    #[derive(Default)]
    struct ScriptedBackend {
        seen: Mutex<Vec<ChatRequest>>,
        fail_on_text: Option<&'static str>,
    }

    impl ChatBackend for ScriptedBackend {
        fn complete<'a>(&'a self, request: &'a ChatRequest) -> CompletionFuture<'a> {
            Box::pin(async move {
                let mut seen = self.seen.lock().unwrap();
                seen.push(request.clone());
                if let Some(marker) = self.fail_on_text {
                    let hit = request.messages.iter().any(|m| match &m.content {
                        MessageContent::Text(t) => t.contains(marker),
                        MessageContent::Parts(_) => false,
                    });
                    if hit {
                        return Err(LlmError::EmptyContent);
                    }
                }
                Ok(format!("{} #{}", request.model, seen.len()))
            })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn settings() -> LlmSettings {
        LlmSettings::from_config(&LlmConfig::default(), "sk-test".to_string()).unwrap()
    }

    fn user_text(request: &ChatRequest) -> String {
        match &request.messages[1].content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => format!("{:?}", parts),
        }
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(ExhibitKind::from_path(Path::new("a/notes.TXT")), ExhibitKind::Text);
        assert_eq!(ExhibitKind::from_path(Path::new("memo.md")), ExhibitKind::Text);
        assert_eq!(ExhibitKind::from_path(Path::new("scene.JPeG")), ExhibitKind::Image);
        assert_eq!(ExhibitKind::from_path(Path::new("report.pdf")), ExhibitKind::Unsupported);
        assert_eq!(ExhibitKind::from_path(Path::new("README")), ExhibitKind::Unsupported);
    }

    #[tokio::test]
    async fn test_text_exhibit_three_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "letter.txt", b"Rear-end collision on I-35, 2024-03-02.");
        let backend = ScriptedBackend::default();

        let report = summarize_exhibit(&backend, &settings(), &path).await.unwrap();
        assert_eq!(report.kind, ExhibitKind::Text);
        assert_eq!(
            report.outcome,
            ExhibitOutcome::Analyzed {
                summary: "gpt-4o-mini #1".to_string(),
                follow_ups: "gpt-4o-mini #2".to_string(),
                recommendations: "gpt-4o-mini #3".to_string(),
            }
        );

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].max_tokens, Some(600));
        assert_eq!(seen[1].temperature, 0.2);
        assert_eq!(seen[2].top_p, 0.9);
        assert!(user_text(&seen[0]).contains("I-35"));
    }

    #[tokio::test]
    async fn test_blank_text_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.md", b"  \n\t ");
        let backend = ScriptedBackend::default();

        summarize_exhibit(&backend, &settings(), &path).await.unwrap();
        let seen = backend.seen.lock().unwrap();
        assert!(user_text(&seen[0]).ends_with("No readable content found."));
    }

    #[tokio::test]
    async fn test_image_exhibit_uses_vision_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bumper.png", &[0x89, b'P', b'N', b'G']);
        let backend = ScriptedBackend::default();

        let report = summarize_exhibit(&backend, &settings(), &path).await.unwrap();
        assert_eq!(report.kind, ExhibitKind::Image);

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].model, "gpt-4.1");
        assert_eq!(seen[0].max_tokens, Some(700));
        assert!(user_text(&seen[0]).contains("data:image/png;base64,iVBORw=="));
        // Advice prompts carry the vision model's description
        assert!(user_text(&seen[1]).contains("gpt-4.1 #1"));
        assert_eq!(seen[2].max_tokens, Some(200));
    }

    #[tokio::test]
    async fn test_unsupported_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "scan.pdf", b"%PDF-1.7");
        let backend = ScriptedBackend::default();

        let report = summarize_exhibit(&backend, &settings(), &path).await.unwrap();
        assert_eq!(
            report.outcome,
            ExhibitOutcome::Unsupported {
                extension: "pdf".to_string()
            }
        );
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let backend = ScriptedBackend::default();
        let err = summarize_exhibit(&backend, &settings(), Path::new("/nonexistent/x.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Io { .. }));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "a.txt", b"first exhibit");
        let bad = write_file(dir.path(), "b.txt", b"POISON exhibit");
        let other = write_file(dir.path(), "c.docx", b"zip");
        let backend = ScriptedBackend {
            fail_on_text: Some("POISON"),
            ..ScriptedBackend::default()
        };

        let paths = vec![good.clone(), bad.clone(), other.clone()];
        let results = summarize_exhibits(&backend, &settings(), &paths, 2).await;

        let order: Vec<&PathBuf> = results.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![&good, &bad, &other]);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].1.as_ref().unwrap_err(), &LlmError::EmptyContent);
        assert_eq!(results[2].1.as_ref().unwrap().kind, ExhibitKind::Unsupported);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ExhibitReport {
            path: PathBuf::from("scan.pdf"),
            kind: ExhibitKind::Unsupported,
            outcome: ExhibitOutcome::Unsupported {
                extension: "pdf".to_string(),
            },
            generated_at: Utc::now(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "unsupported");
        assert_eq!(value["kind"], "unsupported");
        assert_eq!(value["extension"], "pdf");
    }
}
