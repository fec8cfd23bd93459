//! Engine configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use modgraph_core::ModuleSchema;

use crate::error::ConfigError;
use crate::schema_file::SchemaFile;

/// Audio engine settings.
///
/// Every field has a default, so an empty file (or no file) is a valid
/// configuration.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// buffer_size = 256
/// channels = 2
/// output_device = "USB Audio"
/// schema = "/home/me/.config/modgraph/modules.toml"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,

    /// Requested device buffer size in frames.
    pub buffer_size: u32,

    /// Number of interleaved output channels.
    pub channels: u16,

    /// Output device name (substring match); default device when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,

    /// Module schema file merged over the built-in schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 256,
            channels: 2,
            output_device: None,
            schema: None,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration, falling back to defaults if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sample_rate",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "buffer_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.channels == 0 {
            return Err(ConfigError::InvalidValue {
                key: "channels",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// The module schema to run with: the schema file over the built-in set,
    /// or the built-in set alone.
    pub fn module_schema(&self) -> Result<ModuleSchema, ConfigError> {
        match &self.schema {
            Some(path) => Ok(SchemaFile::load(path)?.to_schema()),
            None => Ok(ModuleSchema::builtin()),
        }
    }
}
