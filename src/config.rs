//! @ai:module:intent Configuration file for the compiler, loaded from weaver.toml
//! @ai:module:layer infrastructure
//! @ai:module:public_api WeaverConfig, AnnotationsConfig, LinkConfig, InspectConfig, InputConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::inspector::InspectOptions;
use crate::lexer::DEFAULT_MARKER;
use crate::linker::LinkOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "weaver.toml";

/// @ai:intent Main configuration, every section optional
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeaverConfig {
    #[serde(default)]
    pub annotations: AnnotationsConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub inspect: InspectConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// @ai:intent How annotation comments are recognized
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotationsConfig {
    #[serde(default = "default_marker")]
    pub marker: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkConfig {
    #[serde(default)]
    pub allow_augmentation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub warn_unused: bool,
}

/// @ai:intent Which files are read and how
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
        }
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warn_unused: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            parallel: true,
        }
    }
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["swift".to_string()]
}

fn default_true() -> bool {
    true
}

impl WeaverConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// @ai:intent Load the file when present, defaults otherwise
    /// @ai:effects fs:read
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            allow_augmentation: self.link.allow_augmentation,
        }
    }

    pub fn inspect_options(&self) -> InspectOptions {
        InspectOptions {
            warn_unused: self.inspect.warn_unused,
        }
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let marker = &self.annotations.marker;
        if marker.is_empty() || !marker.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(Error::Config {
                path: path.to_path_buf(),
                message: format!("annotation marker `{marker}` must be a single word"),
            });
        }
        if self.input.extensions.is_empty() {
            return Err(Error::Config {
                path: path.to_path_buf(),
                message: "at least one input extension is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[link]\nallow_augmentation = true\n").unwrap();

        let config = WeaverConfig::load(&path).unwrap();

        assert!(config.link.allow_augmentation);
        assert_eq!(config.annotations.marker, "weaver");
        assert_eq!(config.input.extensions, vec!["swift".to_string()]);
        assert!(config.inspect.enabled);
        assert!(config.inspect_options().warn_unused);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = WeaverConfig::default();
        config.annotations.marker = "di".to_string();
        config.input.parallel = false;

        config.save(&path).unwrap();

        assert_eq!(WeaverConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_absent_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = WeaverConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, WeaverConfig::default());
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[link\n").unwrap();

        assert!(matches!(WeaverConfig::load(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_marker_must_be_a_word() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[annotations]\nmarker = \"my marker\"\n").unwrap();

        match WeaverConfig::load(&path) {
            Err(Error::Config { message, .. }) => assert!(message.contains("my marker")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
