//! Configuration
//!
//! Resolver settings, stored as JSON. A missing file yields the defaults;
//! a few environment variables override whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::error::ConfigError;
use crate::resolver::{AttributeTable, FailurePolicy};

pub const ENDPOINT_ENV: &str = "BRAND_ORIGIN_ENDPOINT";
pub const LANGUAGE_ENV: &str = "BRAND_ORIGIN_LANGUAGE";
pub const THRESHOLD_ENV: &str = "BRAND_ORIGIN_THRESHOLD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Knowledge base API endpoint
    pub endpoint: String,
    /// Language used for search, labels and fetches
    pub language: String,
    /// Minimum number of recognized attributes an entity must expose
    pub threshold: usize,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Largest id batch the endpoint accepts in one request
    pub max_ids_per_request: usize,
    /// Number of search hits requested
    pub search_limit: usize,
    pub failure_policy: FailurePolicy,
    pub attributes: AttributeTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.wikidata.org/w/api.php".to_string(),
            language: "en".to_string(),
            threshold: 4,
            user_agent: format!("brand_origin/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_ids_per_request: 50,
            search_limit: 7,
            failure_policy: FailurePolicy::default(),
            attributes: AttributeTable::default(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "endpoint",
                reason: "must not be empty".to_string(),
            });
        }
        if self.attributes.is_empty() {
            return Err(ConfigError::Invalid {
                field: "attributes",
                reason: "at least one recognized attribute is required".to_string(),
            });
        }
        if let Some(reason) = self.attributes.find_conflict() {
            return Err(ConfigError::Invalid {
                field: "attributes",
                reason,
            });
        }
        if self.max_ids_per_request == 0 {
            return Err(ConfigError::Invalid {
                field: "max_ids_per_request",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Some(language) = lookup(LANGUAGE_ENV) {
            self.language = language;
        }
        if let Some(raw) = lookup(THRESHOLD_ENV) {
            self.threshold = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "threshold",
                reason: format!("`{}` is not a non-negative integer", raw),
            })?;
        }
        Ok(())
    }
}

pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the file (defaults if absent), apply environment overrides,
    /// then validate.
    pub async fn load(&self) -> Result<ResolverConfig, ConfigError> {
        let mut config = if self.path.exists() {
            let content = fs::read_to_string(&self.path).await?;
            serde_json::from_str(&content)?
        } else {
            debug!("No config at {:?}, using defaults", self.path);
            ResolverConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, config: &ResolverConfig) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let loader = ConfigLoader::new(temp_file.path());

        let config = ResolverConfig {
            threshold: 2,
            failure_policy: FailurePolicy::DropEntity,
            attributes: AttributeTable::from_pairs([("P31", "type of entity")]),
            ..ResolverConfig::default()
        };
        loader.save(&config).await.unwrap();
        let loaded = loader.load().await.unwrap();

        assert_eq!(loaded.threshold, 2);
        assert_eq!(loaded.failure_policy, FailurePolicy::DropEntity);
        assert_eq!(loaded.attributes.len(), 1);
    }

    #[tokio::test]
    async fn test_config_load_default_when_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(temp_dir.path().join("nonexistent.json"));
        let loaded = loader.load().await.unwrap();
        assert_eq!(loaded.attributes.len(), 21);
        assert_eq!(loaded.failure_policy, FailurePolicy::DropAttribute);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"search_limit": 3, "failure_policy": "abort_run"}"#).unwrap();
        let loaded = ConfigLoader::new(temp_file.path()).load().await.unwrap();
        assert_eq!(loaded.search_limit, 3);
        assert_eq!(loaded.failure_policy, FailurePolicy::AbortRun);
        assert_eq!(loaded.language, "en");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([(THRESHOLD_ENV, " 6 "), (LANGUAGE_ENV, "de")]);
        let mut config = ResolverConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.threshold, 6);
        assert_eq!(config.language, "de");

        let bad: HashMap<&str, &str> = HashMap::from([(THRESHOLD_ENV, "many")]);
        let err = config
            .apply_overrides(|k| bad.get(k).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "threshold", .. }));
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let config = ResolverConfig {
            attributes: AttributeTable::new(Vec::new()),
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_rejects_attribute_shadowing_row_field() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"attributes": [{"code": "P31", "name": "type"}, {"code": "P1448", "name": "label"}]}"#,
        )
        .unwrap();
        let err = ConfigLoader::new(temp_file.path()).load().await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "attributes", .. }));
    }

    #[test]
    fn test_validate_rejects_duplicate_attribute_names() {
        let config = ResolverConfig {
            attributes: AttributeTable::from_pairs([("P127", "owner"), ("P1830", "owner")]),
            ..ResolverConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "attributes", .. }));
    }
}
