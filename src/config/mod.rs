mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from: {}", path.display());
    }

    load_with(|key| env::var(key).ok()).await
}

/// Reads the YAML file named by `CONFIG_PATH` (or `config.yaml`) and applies
/// the overrides found through `lookup`.
pub async fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // An explicit CONFIG_PATH must exist; the default file is optional.
    let (config_path, explicit) = match lookup("CONFIG_PATH") {
        Some(path) => (path, true),
        None => (DEFAULT_CONFIG_PATH.to_string(), false),
    };

    let yaml = match tokio::fs::read_to_string(&config_path).await {
        Ok(contents) => {
            debug!("Loading configuration from: {}", config_path);
            Some(contents)
        }
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    from_sources(yaml.as_deref(), lookup)
}

/// Merges an optional YAML document with environment overrides and checks
/// that the provider settings are complete.
pub fn from_sources<F>(yaml: Option<&str>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = match yaml {
        Some(contents) if !contents.trim().is_empty() => serde_yaml::from_str(contents)?,
        _ => Config::default(),
    };

    if let Some(base_url) = lookup("API_URL") {
        config.llm.base_url = base_url;
    }
    if let Some(api_key) = lookup("API_KEY") {
        config.llm.api_key = api_key;
    }
    if let Some(model) = lookup("MODEL_NAME") {
        config.llm.model = model;
    }
    if let Some(timeout) = lookup("LLM_TIMEOUT_SECS") {
        config.llm.timeout_secs = timeout
            .parse()
            .map_err(|_| Error::config(format!("Invalid LLM_TIMEOUT_SECS: '{}'", timeout)))?;
    }
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| Error::config(format!("Invalid PORT: '{}'", port)))?;
    }
    if let Some(origins) = lookup("CORS_ORIGINS") {
        config.server.cors.allowed_origins = origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let missing: Vec<&str> = [
        ("API_URL", &config.llm.base_url),
        ("API_KEY", &config.llm.api_key),
        ("MODEL_NAME", &config.llm.model),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(Error::config(format!(
            "Please set {} (environment or .env file)",
            missing.join(", ")
        )));
    }

    if config.llm.timeout_secs == 0 {
        return Err(Error::config("llm.timeout_secs must be greater than zero"));
    }

    Ok(())
}
