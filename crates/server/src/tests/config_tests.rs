use super::{load_settings_from, normalize_database_url, Settings};

use std::{fs, path::PathBuf};

use config::Map;
use server_api::InvitePolicy;
use tempfile::TempDir;

fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let root = tempfile::tempdir().expect("tempdir");
    let path = root.path().join("custom.toml");
    fs::write(&path, contents).expect("write config");
    (root, path)
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn keeps_memory_and_full_urls() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url(" sqlite://./data/a.db "),
        "sqlite://./data/a.db"
    );
    assert_eq!(normalize_database_url("sqlite:data/a.db"), "sqlite:data/a.db");
}

#[test]
fn blank_database_url_falls_back_to_default() {
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
}

#[test]
fn defaults_keep_invites_open() {
    let settings = Settings::default();
    assert_eq!(settings.invite_policy, InvitePolicy::Open);
    assert_eq!(settings.allowed_origins.len(), 2);
}

#[test]
fn reads_explicit_toml_file() {
    let (_root, path) = write_config(
        r#"
invite_policy = "organizer_only"
allowed_origins = ["https://events.example.com"]
log_level = "debug"
"#,
    );

    let settings = load_settings_from(Some(&path), Map::new()).expect("settings");
    assert_eq!(settings.invite_policy, InvitePolicy::OrganizerOnly);
    assert_eq!(settings.allowed_origins, vec!["https://events.example.com"]);
    assert_eq!(settings.log_level, "debug");
}

#[test]
fn app_variables_override_the_file() {
    let (_root, path) = write_config(
        r#"
invite_policy = "organizer_only"
allowed_origins = ["https://events.example.com"]
log_level = "debug"
"#,
    );

    let settings = load_settings_from(
        Some(&path),
        vars(&[
            ("APP__INVITE_POLICY", "open"),
            ("APP__LOG_LEVEL", "warn"),
            ("APP__ALLOWED_ORIGINS", "https://a.example,https://b.example"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.invite_policy, InvitePolicy::Open);
    assert_eq!(settings.log_level, "warn");
    assert_eq!(
        settings.allowed_origins,
        vec!["https://a.example", "https://b.example"]
    );
}

#[test]
fn legacy_variables_apply_only_without_app_counterparts() {
    let (_root, path) = write_config("");

    let legacy = load_settings_from(
        Some(&path),
        vars(&[
            ("SERVER_BIND", "0.0.0.0:9000"),
            ("DATABASE_URL", "sqlite://./legacy.db"),
        ]),
    )
    .expect("settings");
    assert_eq!(legacy.bind_addr, "0.0.0.0:9000");
    assert_eq!(legacy.database_url, "sqlite://./legacy.db");

    let preferred = load_settings_from(
        Some(&path),
        vars(&[
            ("SERVER_BIND", "0.0.0.0:9000"),
            ("APP__BIND_ADDR", "127.0.0.1:7000"),
            ("DATABASE_URL", "sqlite://./legacy.db"),
            ("APP__DATABASE_URL", "sqlite::memory:"),
        ]),
    )
    .expect("settings");
    assert_eq!(preferred.bind_addr, "127.0.0.1:7000");
    assert_eq!(preferred.database_url, "sqlite::memory:");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let path = root.path().join("absent.toml");
    assert!(load_settings_from(Some(&path), Map::new()).is_err());
}

#[tokio::test]
async fn normalized_url_opens_sqlite_file() {
    let root = tempfile::tempdir().expect("tempdir");
    let db_path = root.path().join("nested").join("events.db");

    let database_url = normalize_database_url(db_path.to_string_lossy().as_ref());
    let storage = storage::Storage::new(&database_url).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
