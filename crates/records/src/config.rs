//! Records configuration via `records.toml`
//!
//! ```toml
//! # Namespace root every entity type lives under (default: "records")
//! root = "records"
//!
//! # "strict" (default): create fails if the primary key is taken
//! # "upsert": create overwrites like update
//! create_mode = "strict"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{Error, Result};
use tracing::info;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "records.toml";

/// Behaviour of `create` when a record already exists at the primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    /// Fail with `AlreadyExists`
    #[default]
    Strict,
    /// Overwrite, maintaining indexes like `update`
    Upsert,
}

/// Records layer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Root namespace name
    #[serde(default = "default_root")]
    pub root: String,
    /// `"strict"` or `"upsert"`
    #[serde(default = "default_create_mode_str")]
    pub create_mode: String,
}

fn default_root() -> String {
    "records".to_string()
}

fn default_create_mode_str() -> String {
    "strict".to_string()
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            create_mode: default_create_mode_str(),
        }
    }
}

impl RecordsConfig {
    /// Parse the create mode string
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the string is not `"strict"` or `"upsert"`.
    pub fn create_mode(&self) -> Result<CreateMode> {
        match self.create_mode.as_str() {
            "strict" => Ok(CreateMode::Strict),
            "upsert" => Ok(CreateMode::Upsert),
            other => Err(Error::configuration(format!(
                "Invalid create_mode '{}'. Expected \"strict\" or \"upsert\".",
                other
            ))),
        }
    }

    /// Check every setting
    pub fn validate(&self) -> Result<()> {
        if self.root.is_empty() {
            return Err(Error::configuration("root namespace must not be empty"));
        }
        self.create_mode()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata records configuration
#
# Namespace root every entity type lives under (default: "records")
root = "records"

# Create mode: "strict" (default) or "upsert"
#   "strict" = create fails with AlreadyExists if the primary key is taken
#   "upsert" = create overwrites the existing record, like update
create_mode = "strict"
"#
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RecordsConfig = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| {
            Error::configuration(format!("'{}': {}", path.display(), e))
        })?;
        info!(
            path = %path.display(),
            root = %config.root,
            create_mode = %config.create_mode,
            "loaded records config"
        );
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
