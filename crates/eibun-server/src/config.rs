//! Server configuration.
//!
//! Loaded from `eibun.toml` (or an explicit `--config` path), with
//! environment variable overrides. The upstream credential is required and
//! checked at startup so a misconfigured deployment fails fast instead of
//! answering every request with a 500.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use eibun_core::error::CheckError;
use eibun_core::service::GenerationPolicy;
use eibun_providers::GeminiConfig;

/// Top-level eibun configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on. Overridable via `EIBUN_BIND` or `--bind`.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Generation policy for upstream calls.
    #[serde(default)]
    pub generation: GenerationPolicy,
    /// Gemini transport settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            generation: GenerationPolicy::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Load config from an explicit path, or `eibun.toml` if present, or
/// defaults. Environment overrides: `GEMINI_API_KEY`, `EIBUN_BIND`.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("config file not found: {}", p.display());
            }
            Some(p.to_path_buf())
        }
        None => {
            let local = PathBuf::from("eibun.toml");
            local.exists().then_some(local)
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ServerConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ServerConfig::default(),
    };

    if let Ok(bind) = std::env::var("EIBUN_BIND") {
        config.bind = bind;
    }
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config.gemini.api_key = key;
    }

    if config.gemini.api_key.is_empty() {
        return Err(CheckError::Configuration("GEMINI_API_KEY is not set".into()).into());
    }

    Ok(config)
}
