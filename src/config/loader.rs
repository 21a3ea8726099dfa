//! Load config from a directory of JSON files.

use crate::config::{validate, EntityConfig, FullConfig, HookConfig, ModelConfig};
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read `models.json` (required), `entities.json` and `hooks.json` (optional) from `dir`, then validate.
pub async fn load_from_dir(dir: impl AsRef<Path>) -> Result<FullConfig, ConfigError> {
    let dir = dir.as_ref();
    let models: Vec<ModelConfig> = read_json(&dir.join("models.json"))
        .await?
        .ok_or_else(|| ConfigError::Load(format!("{} not found", dir.join("models.json").display())))?;
    let entities: Option<Vec<EntityConfig>> = read_json(&dir.join("entities.json")).await?;
    let hooks: Vec<HookConfig> = read_json(&dir.join("hooks.json")).await?.unwrap_or_default();

    let config = FullConfig {
        models,
        entities,
        hooks,
    };
    validate(&config)?;
    tracing::info!(
        dir = %dir.display(),
        models = config.models.len(),
        entities = config.entities.as_ref().map(Vec::len),
        "config loaded"
    );
    Ok(config)
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Load(format!("{}: {}", path.display(), e))),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}
