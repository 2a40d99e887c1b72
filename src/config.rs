//! Application configuration.
//!
//! Precedence: CLI flags > environment > config files > defaults. CLI flags are
//! applied by the binary on top of [`load_config`]'s result.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::BookError;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "library";
pub const DEFAULT_COLLECTION: &str = "books";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Mongo,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Backend::Mongo),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(BookError::Config(format!("unknown backend `{other}`"))),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub backend: Backend,
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub seed_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Rolled log files to keep.
    pub log_retention: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        ConfigLayer::default().resolve()
    }
}

/// One configuration source; unset values fall through to the next source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    pub backend: Option<Backend>,
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Rolled log files to keep.
    pub log_retention: Option<u32>,
}

impl ConfigLayer {
    /// Fills every unset value from `lower`.
    pub fn fill_from(&mut self, lower: ConfigLayer) {
        if self.backend.is_none() { self.backend = lower.backend; }
        if self.uri.is_none() { self.uri = lower.uri; }
        if self.database.is_none() { self.database = lower.database; }
        if self.collection.is_none() { self.collection = lower.collection; }
        if self.seed_file.is_none() { self.seed_file = lower.seed_file; }
        if self.log_dir.is_none() { self.log_dir = lower.log_dir; }
        if self.log_level.is_none() { self.log_level = lower.log_level; }
        if self.log_retention.is_none() { self.log_retention = lower.log_retention; }
    }

    /// Reads `BOOKSHELF_*` variables through `var`.
    pub fn from_env<F>(var: F) -> Result<Self, BookError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = var("BOOKSHELF_BACKEND").map(|s| s.parse()).transpose()?;
        let log_retention = var("BOOKSHELF_LOG_RETENTION")
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|e| BookError::Config(format!("BOOKSHELF_LOG_RETENTION `{s}`: {e}")))
            })
            .transpose()?;
        Ok(Self {
            backend,
            uri: var("BOOKSHELF_URI"),
            database: var("BOOKSHELF_DATABASE"),
            collection: var("BOOKSHELF_COLLECTION"),
            seed_file: var("BOOKSHELF_SEED").map(PathBuf::from),
            log_dir: var("BOOKSHELF_LOG_DIR").map(PathBuf::from),
            log_level: var("BOOKSHELF_LOG_LEVEL"),
            log_retention,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, BookError> {
        toml::from_str(s).map_err(|e| BookError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, BookError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s).map_err(|e| BookError::Config(format!("{}: {e}", path.display())))
    }

    #[must_use]
    pub fn resolve(self) -> AppConfig {
        AppConfig {
            backend: self.backend.unwrap_or_default(),
            uri: self.uri.unwrap_or_else(|| DEFAULT_URI.to_string()),
            database: self.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: self.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            seed_file: self.seed_file,
            log_dir: self.log_dir,
            log_level: self.log_level,
            log_retention: self.log_retention,
        }
    }
}

/// Candidate config files, highest precedence first.
#[must_use]
pub fn find_config_paths(cli_cfg: Option<&Path>, env_cfg: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = cli_cfg { paths.push(p.to_path_buf()); }
    if let Some(p) = env_cfg { paths.push(p); }
    if let Some(dir) = dirs_next::config_dir() { paths.push(dir.join("bookshelf.toml")); }
    if let Ok(cur) = std::env::current_dir() { paths.push(cur.join("bookshelf.toml")); }
    paths
}

/// Resolves configuration from the environment and config files.
///
/// An explicitly named config file (`--config` or `BOOKSHELF_CONFIG`) must exist;
/// the default locations are skipped when absent.
pub fn load_config(cli_cfg: Option<&Path>) -> Result<AppConfig, BookError> {
    let env = |k: &str| std::env::var(k).ok();
    let explicit_env = env("BOOKSHELF_CONFIG").map(PathBuf::from);
    let mut cfg = ConfigLayer::from_env(env)?;
    let explicit: Vec<PathBuf> = cli_cfg.map(Path::to_path_buf).into_iter().chain(explicit_env.clone()).collect();
    for p in find_config_paths(cli_cfg, explicit_env) {
        if !p.exists() {
            if explicit.contains(&p) {
                return Err(BookError::Config(format!("config file not found: {}", p.display())));
            }
            continue;
        }
        log::debug!("reading config {}", p.display());
        cfg.fill_from(ConfigLayer::from_file(&p)?);
    }
    Ok(cfg.resolve())
}
