//! Module schema file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use modgraph_core::{ModuleSchema, ModuleSpec};

use crate::error::ConfigError;

/// One `[modules.<Kind>]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Display name; defaults to the kind name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Number of input ports.
    #[serde(default)]
    pub inputs: u32,

    /// Number of output ports.
    #[serde(default)]
    pub outputs: u32,

    /// Maximum instances per patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// Module schema overrides loaded from TOML.
///
/// Entries replace (or extend) the built-in schema; kinds not mentioned keep
/// their built-in port counts.
///
/// # TOML Format
///
/// ```toml
/// [modules.Add]
/// inputs = 3
/// outputs = 1
///
/// [modules.Midi]
/// name = "MIDI"
/// outputs = 1
/// max = 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaFile {
    /// Kind name → entry.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
}

impl SchemaFile {
    /// Load a schema file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a schema file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the schema file to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builds the effective schema: these entries merged over the built-in set.
    pub fn to_schema(&self) -> ModuleSchema {
        let mut overrides = ModuleSchema::empty();
        for (kind, entry) in &self.modules {
            let name = entry.name.clone().unwrap_or_else(|| kind.clone());
            let mut spec = ModuleSpec::new(name, entry.inputs, entry.outputs);
            spec.max_instances = entry.max;
            overrides.insert(kind.clone(), spec);
        }
        let mut schema = ModuleSchema::builtin();
        schema.merge(overrides);
        schema
    }

    /// Describes every entry of `schema`, e.g. to dump the active schema.
    pub fn from_schema(schema: &ModuleSchema) -> Self {
        let modules = schema
            .iter()
            .map(|(kind, spec)| {
                (
                    kind.to_string(),
                    ModuleEntry {
                        name: (spec.name != kind).then(|| spec.name.clone()),
                        inputs: spec.inputs,
                        outputs: spec.outputs,
                        max: spec.max_instances,
                    },
                )
            })
            .collect();
        Self { modules }
    }
}
