//! Application configuration.
//!
//! Handles loading and validating `config.toml`: where the document store
//! lives and how to reach the image CDN. All options have defaults except
//! the CDN credentials, which only matter for commands that actually touch
//! the CDN.
//!
//! ```toml
//! [store]
//! root = "catalog-data"        # Document store directory
//!
//! [cdn]
//! auth_endpoint = ""           # Companion endpoint issuing signed upload credentials
//! upload_endpoint = "https://upload.imagekit.io/api/v1/files/upload"
//! delete_endpoint = ""         # Companion endpoint deleting by file id
//! public_key = ""              # CDN public API key
//! timeout_secs = 30            # Per-request timeout for all CDN calls
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown
//! keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub cdn: CdnConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Document store directory.
    pub root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: "catalog-data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CdnConfig {
    /// Endpoint issuing single-use signed upload credentials.
    pub auth_endpoint: String,
    /// The CDN's upload API.
    pub upload_endpoint: String,
    /// Endpoint deleting stored objects by file id.
    pub delete_endpoint: String,
    /// Public API key sent with every upload.
    pub public_key: String,
    /// Per-request timeout for all CDN calls.
    pub timeout_secs: u64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: String::new(),
            upload_endpoint: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
            delete_endpoint: String::new(),
            public_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl CdnConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that everything a CDN-touching command needs is present.
    /// Commands that never leave the store skip this.
    pub fn validate_for_use(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("cdn.auth_endpoint", &self.auth_endpoint),
            ("cdn.upload_endpoint", &self.upload_endpoint),
            ("cdn.delete_endpoint", &self.delete_endpoint),
            ("cdn.public_key", &self.public_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} must be set")));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "cdn.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.root.trim().is_empty() {
            return Err(ConfigError::Validation("store.root must be set".into()));
        }
        Ok(())
    }

    /// Load from a TOML file, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// A documented stock `config.toml` with all options at their defaults.
    pub fn stock_toml() -> String {
        "\
# atelier configuration
#
# All options are optional - defaults shown below. CDN credentials are only
# required for commands that upload or delete images.

[store]
root = \"catalog-data\"        # Document store directory

[cdn]
auth_endpoint = \"\"           # Companion endpoint issuing signed upload credentials
upload_endpoint = \"https://upload.imagekit.io/api/v1/files/upload\"
delete_endpoint = \"\"         # Companion endpoint deleting by file id
public_key = \"\"              # CDN public API key
timeout_secs = 30            # Per-request timeout for all CDN calls
"
        .to_string()
    }
}
