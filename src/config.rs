use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::DEFAULT_COMMIT_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub swipe: SwipeSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path segment in front of feed/swipe/matches; empty selects the legacy routes
    #[serde(default = "default_dating_prefix")]
    pub dating_prefix: String,
    pub timeout_secs: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            dating_prefix: default_dating_prefix(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String { "http://127.0.0.1:8000/api".to_string() }
fn default_dating_prefix() -> String { "/dating".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct SwipeSettings {
    #[serde(default = "default_commit_threshold")]
    pub commit_threshold: f64,
}

impl Default for SwipeSettings {
    fn default() -> Self {
        Self {
            commit_threshold: default_commit_threshold(),
        }
    }
}

fn default_commit_threshold() -> f64 { DEFAULT_COMMIT_THRESHOLD }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Session file; defaults to the platform data directory
    pub session_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "warn".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LUME_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUME__API__BASE_URL -> api.base_url
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_settings() {
        let api = ApiSettings::default();
        assert_eq!(api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(api.dating_prefix, "/dating");
        assert!(api.timeout_secs.is_none());
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(SwipeSettings::default().commit_threshold, 150.0);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "warn");
        assert_eq!(format, "compact");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://lume.test/api\"\ndating_prefix = \"\"\n\n[swipe]\ncommit_threshold = 90.0\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api.base_url, "https://lume.test/api");
        assert_eq!(settings.api.dating_prefix, "");
        assert_eq!(settings.swipe.commit_threshold, 90.0);
        assert!(settings.storage.session_path.is_none());
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_shipped_defaults_leave_timeout_unset() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.api.timeout_secs.is_none());
        assert_eq!(settings.api.dating_prefix, "/dating");
        assert_eq!(settings.swipe.commit_threshold, 150.0);
    }
}
