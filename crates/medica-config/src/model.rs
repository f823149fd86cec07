//! Configuration schema for the Medica client.

use crate::ConfigError;
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename looked up next to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "medica.json5";

/// Filename of the persisted session document.
const SESSION_FILE_NAME: &str = "session.json";

/// Root config for the Medica client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MedicaConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl MedicaConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MedicaConfigBuilder {
        MedicaConfigBuilder::new()
    }

    /// Load a config from a JSON5 file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a config from raw JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let config: MedicaConfig = json5::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidField {
                path: "backend.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidField {
                path: "backend.base_url".to_string(),
                message: "must be an http(s) URL".to_string(),
            });
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidField {
                path: "backend.timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for assembling a `MedicaConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MedicaConfigBuilder {
    config: MedicaConfig,
}

impl MedicaConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MedicaConfig::default(),
        }
    }

    /// Replace the backend configuration.
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.config.backend = backend;
        self
    }

    /// Replace the session persistence configuration.
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Finalize and return the built `MedicaConfig`.
    pub fn build(self) -> MedicaConfig {
        self.config
    }
}

/// Assistant backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the backend is reached at.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout applied to every HTTP call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default backend base URL (local development server).
fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

/// Default per-request timeout in seconds.
fn default_timeout_secs() -> u64 {
    30
}

/// Session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Override path for the session document. Defaults to the platform
    /// data directory when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl SessionConfig {
    /// Resolve the on-disk location of the session document.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return PathBuf::from(path);
        }
        ProjectDirs::from("ai", "medica", "medica")
            .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(".medica").join(SESSION_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendConfig, MedicaConfig, SessionConfig};
    use crate::ConfigError;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = MedicaConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.session.path, None);
    }

    #[test]
    fn loads_json5_with_partial_sections() {
        let config = MedicaConfig::load_from_str(
            r#"{
                // only the backend section is overridden
                backend: { base_url: "https://api.medica.example" },
            }"#,
        )
        .expect("load");
        assert_eq!(config.backend.base_url, "https://api.medica.example");
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{ backend: {{ timeout_secs: 5 }}, session: {{ path: "/tmp/s.json" }} }}"#
        )
        .expect("write");
        let config = MedicaConfig::load_from_path(file.path()).expect("load");
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.session.path.as_deref(), Some("/tmp/s.json"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = MedicaConfig::load_from_str(r#"{ backend: { base_url: "ftp://x" } }"#)
            .expect_err("invalid scheme");
        let ConfigError::InvalidField { path, .. } = err else {
            panic!("expected invalid field");
        };
        assert_eq!(path, "backend.base_url");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = MedicaConfig::load_from_str(r#"{ backend: { timeout_secs: 0 } }"#)
            .expect_err("zero timeout");
        let ConfigError::InvalidField { path, .. } = err else {
            panic!("expected invalid field");
        };
        assert_eq!(path, "backend.timeout_secs");
    }

    #[test]
    fn builder_overrides_sections() {
        let config = MedicaConfig::builder()
            .backend(BackendConfig {
                base_url: "https://api.medica.example".to_string(),
                timeout_secs: 10,
            })
            .session(SessionConfig {
                path: Some("/var/lib/medica/session.json".to_string()),
            })
            .build();
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(
            config.session.resolve_path().to_string_lossy(),
            "/var/lib/medica/session.json"
        );
    }
}
