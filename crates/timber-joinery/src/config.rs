//! Fabrication settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by the fabrication exports.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes:
///
/// ```toml
/// output_root = "/srv/structure"
/// dowel_radius = 40.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricationConfig {
    /// Directory the JSON exports are written under.
    pub output_root: PathBuf,
    /// Subdirectory of `output_root` used when the caller does not name one.
    pub default_subdir: String,
    /// Drill bit radius used for the bore extension (mm).
    pub dowel_radius: f64,
    /// Extra dowel length added on top of the computed bore (mm).
    pub dowel_extension: f64,
    /// Factor the dowel axis is scaled by before locating the entry point.
    pub dowel_scale: f64,
}

impl Default for FabricationConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            default_subdir: "data".into(),
            dowel_radius: 50.0,
            dowel_extension: 0.0,
            dowel_scale: 1.2,
        }
    }
}

impl FabricationConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Same config writing under `output_root`.
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Directory for exports into `subdir` (the default subdirectory if `None`).
    pub fn output_dir(&self, subdir: Option<&str>) -> PathBuf {
        self.output_root.join(subdir.unwrap_or(self.default_subdir.as_str()))
    }
}
