use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::schema::{DEFAULT_CLAIMS_FILE, DEFAULT_FIRMS_FILE, DEFAULT_SIMILARITY_FILE};
use crate::llm::settings::{DEFAULT_INDICATOR_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};
use crate::scoring::{DEFAULT_INVERSION_SCALE, DEFAULT_TOP_K};

/// Starter config with every option spelled out at its default
pub fn default_config_yaml() -> String {
    format!(
        r#"# counsel-rank configuration

data:
  firms: {firms}
  claims: {claims}
  similar_claims: {similar}

scoring:
  weights:
    cycle_time: 0.3
    win_rate: 0.3
    cost: 0.3
  # Cycle time and cost are subtracted from this before weighting
  inversion_scale: {scale}
  top_k: {top_k}

llm:
  # API key comes from OPENAI_API_KEY (a .env file works too)
  text_model: {text}
  vision_model: {vision}
  indicator_model: {indicator}
  timeout: 60s
  max_retries: 3
  concurrency: 4
"#,
        firms = DEFAULT_FIRMS_FILE,
        claims = DEFAULT_CLAIMS_FILE,
        similar = DEFAULT_SIMILARITY_FILE,
        scale = DEFAULT_INVERSION_SCALE,
        top_k = DEFAULT_TOP_K,
        text = DEFAULT_TEXT_MODEL,
        vision = DEFAULT_VISION_MODEL,
        indicator = DEFAULT_INDICATOR_MODEL,
    )
}

/// Write the starter config to `path` atomically.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(default_config_yaml().as_bytes())
        .context("Failed to write config")?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}
