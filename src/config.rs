//! YAML configuration file for ERD generation.
//!
//! Every key is optional; values given on the command line take precedence.

use crate::generator::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of an ERD configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErdYamlConfig {
    /// Output file
    pub file: Option<PathBuf>,
    /// Focus table
    pub table: Option<String>,
    /// Distance from the focus table
    pub distance: Option<i64>,
    /// Omit indexes
    pub skip_index: Option<bool>,
    /// Regex for tables to skip
    pub skip_table: Option<String>,
    /// plant_uml or mermaid
    pub format: Option<String>,
    /// Mermaid key markers and comments
    pub show_comment: Option<bool>,
}

impl ErdYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Generator settings from this file on top of the defaults
    pub fn to_generator_config(&self) -> GeneratorConfig {
        let defaults = GeneratorConfig::default();
        GeneratorConfig {
            output: self.file.clone(),
            table: self.table.clone(),
            distance: self.distance.unwrap_or(defaults.distance),
            skip_index: self.skip_index.unwrap_or(defaults.skip_index),
            skip_table: self.skip_table.clone(),
            format: self.format.clone().unwrap_or(defaults.format),
            show_comment: self.show_comment.unwrap_or(defaults.show_comment),
        }
    }
}
