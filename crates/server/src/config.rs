use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use notifier::{NotifierConfig, DEFAULT_API_URL, DEFAULT_OPERATOR_ADDRESS, DEFAULT_SENDER};

/// Process configuration, resolved once at startup.
pub struct Settings {
    pub server_bind: String,
    pub database_url: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub notify_to: String,
    pub notify_from: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            database_url: None,
            resend_api_key: None,
            resend_api_url: DEFAULT_API_URL.into(),
            notify_to: DEFAULT_OPERATOR_ADDRESS.into(),
            notify_from: DEFAULT_SENDER.into(),
        }
    }
}

impl Settings {
    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            api_key: self.resend_api_key.clone(),
            api_url: self.resend_api_url.clone(),
            operator_address: self.notify_to.clone(),
            sender: self.notify_from.clone(),
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml` keys, then environment variables. Later
/// sources win; empty values are ignored. The provider credential is only
/// taken from the environment.
pub fn load_settings_from(
    file: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();
    let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            let get = |key: &str| file_cfg.get(key).filter(|v| !v.trim().is_empty()).cloned();
            if let Some(v) = get("bind_addr") {
                settings.server_bind = v;
            }
            if let Some(v) = get("database_url") {
                settings.database_url = Some(v);
            }
            if let Some(v) = get("resend_api_url") {
                settings.resend_api_url = v;
            }
            if let Some(v) = get("notify_to") {
                settings.notify_to = v;
            }
            if let Some(v) = get("notify_from") {
                settings.notify_from = v;
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = Some(v);
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = Some(v);
    }

    if let Some(v) = env("RESEND_API_KEY") {
        settings.resend_api_key = Some(v);
    }
    if let Some(v) = env("APP__RESEND_API_KEY") {
        settings.resend_api_key = Some(v);
    }

    if let Some(v) = env("APP__RESEND_API_URL") {
        settings.resend_api_url = v;
    }
    if let Some(v) = env("APP__NOTIFY_TO") {
        settings.notify_to = v;
    }
    if let Some(v) = env("APP__NOTIFY_FROM") {
        settings.notify_from = v;
    }

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
