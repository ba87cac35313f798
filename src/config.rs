//! Provider settings and server configuration.
//!
//! Provider settings are read from `<settings dir>/<provider>.json` when the
//! file exists, otherwise from `<PROVIDER>_API_KEY` / `<PROVIDER>_API_URL`
//! environment variables. Settings are loaded once and never mutated.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default directory holding per-provider settings files.
pub const DEFAULT_SETTINGS_DIR: &str = "settings";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Credentials and endpoint for one OCR provider.
#[derive(Clone, Deserialize)]
pub struct ProviderSettings {
    pub secret: String,
    pub endpoint: String,
}

// Keep the secret out of logs.
impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ProviderSettings {
    /// Resolve settings for `provider`, preferring the settings file.
    pub fn load(dir: &Path, provider: &str) -> Result<Self> {
        let path = dir.join(format!("{}.json", provider));
        if path.exists() {
            return Self::load_from_file(&path);
        }
        Self::from_env(provider)
    }

    /// Read settings from a JSON file with `secret` and `endpoint` keys.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provider settings: {:?}", path))?;
        let settings: ProviderSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse provider settings: {:?}", path))?;
        settings.validate()?;
        info!("Loaded provider settings from {:?}", path);
        Ok(settings)
    }

    /// Read settings from `<PROVIDER>_API_KEY` and `<PROVIDER>_API_URL`.
    pub fn from_env(provider: &str) -> Result<Self> {
        let prefix = provider.to_uppercase();
        let key_var = format!("{}_API_KEY", prefix);
        let url_var = format!("{}_API_URL", prefix);

        let secret =
            std::env::var(&key_var).with_context(|| format!("{} not set", key_var))?;
        let endpoint =
            std::env::var(&url_var).with_context(|| format!("{} not set", url_var))?;

        let settings = Self { secret, endpoint };
        settings.validate()?;
        info!("Loaded {} provider settings from environment", provider);
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.secret.trim().is_empty() {
            anyhow::bail!("Provider secret is empty");
        }
        if self.endpoint.trim().is_empty() {
            anyhow::bail!("Provider endpoint is empty");
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub body_limit: usize,
    pub settings_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            body_limit: BODY_LIMIT_BYTES,
            settings_dir: std::env::var("PROVIDER_SETTINGS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_DIR)),
        }
    }
}
