//! Configuration types for the renamer.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::processors::ordering::EntryOrder;

/// Configuration for target filename construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Text placed before the field value (e.g., "COSO_FC_54,5K_")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Text placed after the field value, including the extension
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Replacement for the decimal point inside filenames
    #[serde(default = "default_decimal_mark")]
    pub decimal_mark: String,
}

fn default_prefix() -> String {
    "COSO_FC_54,5K_".to_string()
}

fn default_suffix() -> String {
    "mT.DAT".to_string()
}

fn default_decimal_mark() -> String {
    ",".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            suffix: default_suffix(),
            decimal_mark: default_decimal_mark(),
        }
    }
}

/// Configuration for directory scanning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Ordering policy assigning batch indices to files
    #[serde(default)]
    pub order: EntryOrder,

    /// Only rename files with this extension (case-insensitive).
    /// `None` renames every regular file in the directory.
    #[serde(default)]
    pub extension: Option<String>,
}

/// Main renamer configuration combining all sub-configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamerConfig {
    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    /// Builtin schedule id applied when no schedule file is given
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

fn default_schedule() -> String {
    "0".to_string()
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            scan: ScanConfig::default(),
            schedule: default_schedule(),
        }
    }
}

impl RenamerConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: RenamerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
