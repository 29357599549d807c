use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::client::{ChatBackend, ChatRequest, CompletionFuture};

/// Get the platform-appropriate cache directory for model responses
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("counsel-rank/llm-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/counsel-rank/llm-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Serializable cache entry for disk storage
#[derive(Serialize, Deserialize)]
struct CachedCompletion {
    model: String,
    content: String,
}

/// Cache key for a request: identical prompts, models and sampling share a key
fn cache_key(request: &ChatRequest) -> String {
    let body = serde_json::to_string(request).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("chat:{:016x}", hasher.finish())
}

/// Backend wrapper that answers repeated requests from a disk cache.
///
/// Only successful completions are stored. Cache read and write failures are
/// logged and otherwise ignored.
pub struct CachedBackend<B: ChatBackend> {
    inner: B,
    cache_path: PathBuf,
    memory: Arc<Mutex<HashMap<String, String>>>,
}

impl<B: ChatBackend> CachedBackend<B> {
    pub fn new(inner: B, cache_path: PathBuf) -> Self {
        Self {
            inner,
            cache_path,
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Ok(memory) = self.memory.lock() {
            if let Some(hit) = memory.get(key) {
                return Some(hit.clone());
            }
        }

        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        let entry: CachedCompletion = serde_json::from_slice(&bytes).ok()?;

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), entry.content.clone());
        }
        Some(entry.content)
    }

    fn store(&self, key: &str, model: &str, content: &str) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), content.to_string());
        }

        let entry = CachedCompletion {
            model: model.to_string(),
            content: content.to_string(),
        };
        let written = serde_json::to_vec(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|json| {
                cacache::write_sync(&self.cache_path, key, json)
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            });
        if let Err(e) = written {
            tracing::debug!(error = %e, "failed to persist LLM response");
        }
    }
}

impl<B: ChatBackend> ChatBackend for CachedBackend<B> {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            let key = cache_key(request);
            if let Some(hit) = self.lookup(&key) {
                tracing::debug!(model = %request.model, "LLM cache hit");
                return Ok(hit);
            }

            let content = self.inner.complete(request).await?;
            self.store(&key, &request.model, &content);
            Ok(content)
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
