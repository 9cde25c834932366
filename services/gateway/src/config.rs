//! Gateway configuration
//!
//! Layered TOML files, later files overriding earlier ones key by key,
//! then `LOBBY_*` environment overrides on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use persistence::{EngineKind, StoreConfig, SyncPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const ENV_DATA_PATH: &str = "LOBBY_DATA_PATH";
pub const ENV_ENGINE: &str = "LOBBY_ENGINE";
pub const ENV_MERGE_TIMEOUT_MS: &str = "LOBBY_MERGE_TIMEOUT_MS";

/// Files consulted by the binary, in override order.
pub const CONFIG_FILES: [&str; 2] = ["config/default.toml", "config/custom.toml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub data_path: PathBuf,
    pub engine: EngineKind,
    pub merge_timeout_ms: u64,
    pub sync: SyncPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/lobby"),
            engine: EngineKind::Sled,
            merge_timeout_ms: 200,
            sync: SyncPolicy::EveryWrite,
        }
    }
}

impl GatewayConfig {
    /// Load `paths` in order (missing files are skipped), then apply the
    /// process environment.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        Self::from_files(paths)?.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::try_from(Self::default())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        for path in paths {
            let path = path.as_ref();
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Config file not present, skipping");
                    continue;
                }
                Err(source) => {
                    return Err(ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };
            let layer = text.parse::<toml::Value>().map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            overlay(&mut merged, layer);
            debug!(path = %path.display(), "Config file applied");
        }

        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))
    }

    /// Apply `LOBBY_*` overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_ENGINE) {
            self.engine = match value.trim().to_ascii_lowercase().as_str() {
                "sled" => EngineKind::Sled,
                "memory" => EngineKind::Memory,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_ENGINE,
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup(ENV_MERGE_TIMEOUT_MS) {
            self.merge_timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_MERGE_TIMEOUT_MS,
                value: value.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: self.data_path.clone(),
            engine: self.engine,
            merge_timeout: Duration::from_millis(self.merge_timeout_ms),
            sync_policy: self.sync,
        }
    }
}

// Top-level keys of `layer` replace those in `base`.
fn overlay(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                base.insert(key, value);
            }
        }
        (base, layer) => *base = layer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = GatewayConfig::from_files(&[dir.path().join("missing.toml")]).unwrap();
        assert_eq!(config, GatewayConfig::default());

        let store = config.store_config();
        assert_eq!(store.merge_timeout, Duration::from_millis(200));
        assert_eq!(store.engine, EngineKind::Sled);
    }

    #[test]
    fn test_later_file_overrides_earlier() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("default.toml");
        let custom = dir.path().join("custom.toml");
        fs::write(&default, "data_path = \"/srv/lobby\"\nmerge_timeout_ms = 500\n").unwrap();
        fs::write(&custom, "merge_timeout_ms = 50\nsync = \"on_close\"\n").unwrap();

        let config = GatewayConfig::from_files(&[default, custom]).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/lobby"));
        assert_eq!(config.merge_timeout_ms, 50);
        assert_eq!(config.sync, SyncPolicy::OnClose);
        assert_eq!(config.engine, EngineKind::Sled);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("default.toml");
        fs::write(&bad, "merge_timeout_ms = [").unwrap();

        let err = GatewayConfig::from_files(&[&bad]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if *path == bad));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("default.toml");
        fs::write(&bad, "engine = \"rocks\"").unwrap();
        assert!(matches!(
            GatewayConfig::from_files(&[bad]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = GatewayConfig::default()
            .with_env(|key| match key {
                ENV_DATA_PATH => Some("/tmp/lobby".to_string()),
                ENV_ENGINE => Some("Memory".to_string()),
                ENV_MERGE_TIMEOUT_MS => Some("75".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/lobby"));
        assert_eq!(config.engine, EngineKind::Memory);
        assert_eq!(config.merge_timeout_ms, 75);

        assert_eq!(GatewayConfig::default().with_env(no_env).unwrap(), GatewayConfig::default());
    }

    #[test]
    fn test_bad_env_value() {
        let err = GatewayConfig::default()
            .with_env(|key| (key == ENV_MERGE_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_MERGE_TIMEOUT_MS, .. }));
    }
}
