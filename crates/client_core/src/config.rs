use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "genie.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub backend_url: String,
    pub pacing_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub total_questions: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".into(),
            pacing_delay_ms: 500,
            request_timeout_secs: 10,
            total_questions: 20,
        }
    }
}

impl ClientSettings {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional settings file, then environment overrides.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<ClientSettings>(&raw).unwrap_or_else(|err| {
            tracing::warn!(
                path = %path.display(),
                "ignoring unreadable settings file: {err}"
            );
            ClientSettings::default()
        }),
        Err(_) => ClientSettings::default(),
    };

    if let Some(v) = env("GENIE_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = env("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(parsed) = env("APP__PACING_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.pacing_delay_ms = parsed;
    }
    if let Some(parsed) = env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = parsed;
    }
    if let Some(parsed) = env("APP__TOTAL_QUESTIONS").and_then(|v| v.parse().ok()) {
        settings.total_questions = parsed;
    }

    settings
}

pub fn normalize_backend_url(raw_backend_url: &str) -> anyhow::Result<String> {
    let raw_backend_url = raw_backend_url.trim();

    if raw_backend_url.is_empty() {
        return Ok(ClientSettings::default().backend_url);
    }

    let with_scheme = if raw_backend_url.contains("://") {
        raw_backend_url.to_string()
    } else {
        format!("http://{raw_backend_url}")
    };

    let parsed = Url::parse(&with_scheme)
        .with_context(|| format!("invalid backend url '{raw_backend_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!(
            "unsupported scheme '{}' in backend url '{raw_backend_url}'",
            parsed.scheme()
        );
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
