use std::collections::HashMap;

use bookshelf::config::{AppConfig, Backend, ConfigLayer, find_config_paths};
use bookshelf::{BookError, BookQueries};

#[test]
fn layered_precedence_env_then_files_then_defaults() {
    let env: HashMap<&str, &str> = [("BOOKSHELF_URI", "mongodb://env:27017")].into();
    let mut cfg = ConfigLayer::from_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
    let user = ConfigLayer::from_toml_str("uri = \"mongodb://user:27017\"\ndatabase = \"user_db\"\n").unwrap();
    let local = ConfigLayer::from_toml_str("database = \"local_db\"\ncollection = \"novels\"\n").unwrap();
    cfg.fill_from(user);
    cfg.fill_from(local);
    let cfg = cfg.resolve();
    assert_eq!(cfg.uri, "mongodb://env:27017");
    assert_eq!(cfg.database, "user_db");
    assert_eq!(cfg.collection, "novels");
    assert_eq!(cfg.backend, Backend::Mongo);
}

#[test]
fn explicit_paths_come_first() {
    let dir = tempfile::tempdir().unwrap();
    let cli = dir.path().join("cli.toml");
    let env = dir.path().join("env.toml");
    let paths = find_config_paths(Some(&cli), Some(env.clone()));
    assert_eq!(paths[0], cli);
    assert_eq!(paths[1], env);
    assert!(paths.iter().skip(2).all(|p| p.ends_with("bookshelf.toml")));
}

#[test]
fn unparsable_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "database = [unclosed").unwrap();
    assert!(matches!(ConfigLayer::from_file(&path), Err(BookError::Config(_))));
}

#[test]
fn memory_backend_opens_and_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("books.json");
    std::fs::write(
        &seed,
        r#"[
  {"title":"Emma","author":"Jane Austen","genre":"Classic","published_year":1815,"price":7.25,"in_stock":false},
  {"title":"Persuasion","author":"Jane Austen","genre":"Classic","year":1817,"price":6.5,"in_stock":true}
]"#,
    )
    .unwrap();
    let cfg = AppConfig {
        backend: Backend::Memory,
        seed_file: Some(seed),
        ..AppConfig::default()
    };
    let q = BookQueries::open(&cfg).unwrap();
    assert!(q.is_connected());
    let austen = q.find_by_author("Jane Austen").unwrap();
    assert_eq!(austen.len(), 2);
    assert_eq!(austen[1].published_year, 1817);
}

#[test]
fn missing_seed_file_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig {
        backend: Backend::Memory,
        seed_file: Some(dir.path().join("absent.ndjson")),
        ..AppConfig::default()
    };
    assert!(matches!(BookQueries::open(&cfg), Err(BookError::Io(_))));
}

#[test]
fn log_retention_layers_like_other_settings() {
    let env: HashMap<&str, &str> = [("BOOKSHELF_LOG_RETENTION", "3")].into();
    let mut cfg = ConfigLayer::from_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
    cfg.fill_from(ConfigLayer::from_toml_str("log_retention = 12\nlog_level = \"debug\"\n").unwrap());
    let cfg = cfg.resolve();
    assert_eq!(cfg.log_retention, Some(3));
    assert_eq!(cfg.log_level.as_deref(), Some("debug"));

    let from_file = ConfigLayer::from_toml_str("log_retention = 12\n").unwrap().resolve();
    assert_eq!(from_file.log_retention, Some(12));
    assert_eq!(AppConfig::default().log_retention, None);
}

#[test]
fn unparsable_log_retention_is_config_error() {
    let err = ConfigLayer::from_env(|k| (k == "BOOKSHELF_LOG_RETENTION").then(|| "weekly".to_string()));
    assert!(matches!(err, Err(BookError::Config(_))));
}
