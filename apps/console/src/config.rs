use std::{fs, path::Path, time::Duration};

use client_core::ClientConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    success_message_ttl_ms: Option<u64>,
}

/// Defaults, then the config file, then the environment, then the CLI flag.
pub fn load_settings(
    config_path: &Path,
    cli_base_url: Option<&str>,
) -> Result<ClientConfig, ConfigError> {
    let mut settings = ClientConfig::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => apply_file(&mut settings, &raw),
        Err(err) => debug!(path = %config_path.display(), %err, "config: no config file"),
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    if let Some(url) = cli_base_url {
        settings.api_base_url = url.to_string();
    }

    settings.api_base_url = validate_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file(settings: &mut ClientConfig, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(%err, "config: ignoring unreadable config file");
            return;
        }
    };
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.success_message_ttl_ms {
        settings.success_message_ttl = Duration::from_millis(v);
    }
}

fn apply_env<F>(settings: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("PROJECTS_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__SUCCESS_MESSAGE_TTL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.success_message_ttl = Duration::from_millis(parsed);
        }
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
