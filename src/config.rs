//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `UNIPROT_FILTERS_*` environment variables. Command-line flags are applied
//! last by the CLI through the `with_*` builders.

use crate::constants::{
    CACHE_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_EXPORT_DIR, DEFAULT_TIMEOUT_SECS,
    UNIPROT_DOCS_BASE_URL, UNIPROT_ENTRY_URL, UNIPROT_SEARCH_URL, UNIPROT_STREAM_URL, USER_AGENT,
};
use crate::error::{Result, UniprotError};
use crate::models::SourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_CACHE_DIR: &str = "UNIPROT_FILTERS_CACHE_DIR";
pub const ENV_EXPORT_DIR: &str = "UNIPROT_FILTERS_EXPORT_DIR";
pub const ENV_TIMEOUT_SECS: &str = "UNIPROT_FILTERS_TIMEOUT_SECS";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the reference lists
    pub docs_base_url: String,

    /// Per-source location overrides keyed by source slug; a value may be
    /// a URL or a local file path
    pub sources: BTreeMap<String, String>,

    pub search_url: String,
    pub stream_url: String,
    pub entry_url: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,

    /// Cache location; the platform cache directory when unset
    pub cache_dir: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            docs_base_url: UNIPROT_DOCS_BASE_URL.to_string(),
            sources: BTreeMap::new(),
            search_url: UNIPROT_SEARCH_URL.to_string(),
            stream_url: UNIPROT_STREAM_URL.to_string(),
            entry_url: UNIPROT_ENTRY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
            cache_dir: None,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}

impl AppConfig {
    /// Load defaults, the config file and environment overrides
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        let config = config.with_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| {
            UniprotError::configuration(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| UniprotError::configuration(format!("invalid config file: {}", e)))
    }

    /// Apply `UNIPROT_FILTERS_*` overrides from the given lookup
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                UniprotError::configuration(format!("{} must be a number, got '{}'", ENV_TIMEOUT_SECS, secs))
            })?;
        }
        Ok(self)
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Point one source at a different URL or local file
    pub fn with_source(mut self, kind: SourceKind, location: impl Into<String>) -> Self {
        self.sources.insert(kind.slug().to_string(), location.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(UniprotError::configuration("timeout_secs must be greater than 0"));
        }

        let urls = [
            ("docs_base_url", &self.docs_base_url),
            ("search_url", &self.search_url),
            ("stream_url", &self.stream_url),
            ("entry_url", &self.entry_url),
        ];
        for (name, url) in urls {
            if url.trim().is_empty() {
                return Err(UniprotError::configuration(format!("{} cannot be empty", name)));
            }
        }

        for (slug, location) in &self.sources {
            if !SourceKind::ALL.iter().any(|kind| kind.slug() == slug) {
                return Err(UniprotError::configuration(format!(
                    "unknown source '{}' in [sources]",
                    slug
                )));
            }
            if location.trim().is_empty() {
                return Err(UniprotError::configuration(format!(
                    "location for source '{}' cannot be empty",
                    slug
                )));
            }
        }

        Ok(())
    }

    /// URL or path the given reference list is read from
    pub fn source_location(&self, kind: SourceKind) -> String {
        match self.sources.get(kind.slug()) {
            Some(location) => location.clone(),
            None => format!(
                "{}/{}",
                self.docs_base_url.trim_end_matches('/'),
                kind.file_name()
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(CACHE_DIR_NAME)
        })
    }
}

/// `<config dir>/uniprot-filters/config.toml`, when a config dir exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CACHE_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.export_dir, PathBuf::from("export"));
    }

    #[test]
    fn test_source_location_defaults_to_docs_directory() {
        let config = AppConfig::default();
        assert_eq!(
            config.source_location(SourceKind::Pathways),
            format!("{}/pathlist.txt", UNIPROT_DOCS_BASE_URL)
        );
    }

    #[test]
    fn test_source_override() {
        let config = AppConfig::default().with_source(SourceKind::Tissues, "/data/tisslist.txt");
        assert_eq!(config.source_location(SourceKind::Tissues), "/data/tisslist.txt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            timeout_secs = 30

            [sources]
            species = "fixtures/speclist.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.search_url, UNIPROT_SEARCH_URL);
        assert_eq!(config.source_location(SourceKind::Species), "fixtures/speclist.txt");
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let result = AppConfig::from_toml_str("timeout_secs = \"soon\"");
        assert!(matches!(result, Err(UniprotError::Configuration { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_CACHE_DIR, "/tmp/uniprot-cache"),
            (ENV_TIMEOUT_SECS, "15"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default()
            .with_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/uniprot-cache"));
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.export_dir, PathBuf::from("export"));
    }

    #[test]
    fn test_env_timeout_must_be_numeric() {
        let result = AppConfig::default().with_env(|key| {
            (key == ENV_TIMEOUT_SECS).then(|| "forever".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(AppConfig::default().with_timeout_secs(0).validate().is_err());

        let mut config = AppConfig::default();
        config.stream_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sources.insert("proteomes".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }
}
