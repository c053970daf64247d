use std::{env, path::Path};

use anyhow::Context;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use server_api::InvitePolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub invite_policy: InvitePolicy,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/events.db".into(),
            invite_policy: InvitePolicy::Open,
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:5173".into(),
            ],
            log_level: "info".into(),
        }
    }
}

/// Defaults, then `server.toml` (or the explicit path), then `APP__*`
/// variables. `SERVER_BIND` and `DATABASE_URL` still apply when their
/// `APP__` counterparts are unset.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_from(config_path, env::vars().collect())
}

/// Same layering as [`load_settings`], reading variables from `vars` instead
/// of the process environment.
pub(crate) fn load_settings_from(
    config_path: Option<&Path>,
    vars: Map<String, String>,
) -> anyhow::Result<Settings> {
    let file = match config_path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("server").required(false),
    };

    let mut settings: Settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("allowed_origins")
                .source(Some(vars.clone())),
        )
        .build()
        .context("failed to read settings")?
        .try_deserialize()
        .context("invalid settings")?;

    if !vars.contains_key("APP__BIND_ADDR") {
        if let Some(v) = vars.get("SERVER_BIND") {
            settings.bind_addr = v.clone();
        }
    }
    if !vars.contains_key("APP__DATABASE_URL") {
        if let Some(v) = vars.get("DATABASE_URL") {
            settings.database_url = v.clone();
        }
    }

    Ok(settings)
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite:{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
