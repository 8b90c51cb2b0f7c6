use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors produced while reading manifests or generator settings.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config file extension: {0:?}, expected .json or .toml")]
    UnsupportedExtension(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Describes a Starbound `.modinfo` manifest
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct ModInfo {
    /// The internal name of the mod, used by other mods to depend on it
    ///
    /// Example: `soy`
    #[serde(default)]
    pub name: String,

    /// The game version the mod targets
    ///
    /// Example: `1.4.4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Mods that must be loaded before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Asset root inside the mod directory or archive
    /// If not specified, the mod directory itself is the asset root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ModInfoMetadata>,

    /// Keys this crate does not model, kept in their original order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `metadata` block of a `.modinfo` manifest
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct ModInfoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModInfo {
    /// The asset root declared by the manifest, `.` when absent
    pub fn asset_path(&self) -> &str {
        self.path.as_deref().unwrap_or(".")
    }

    /// Parses a manifest from a JSON document value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Converts the manifest into a JSON document value
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// How an override document is merged onto the original object definition
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// A `__merge` directive that overwrites the `orientations` list
    #[default]
    Merge,
    /// An RFC 6902 `.patch` file that updates the first orientation and appends the rest
    JsonPatch,
    /// The full object document with its orientations replaced
    ///
    /// Deprecated: the game overwrites the whole object, discarding changes from other mods.
    Overwrite,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergeMode::Merge => "merge",
            MergeMode::JsonPatch => "json-patch",
            MergeMode::Overwrite => "overwrite",
        })
    }
}

/// Settings for the gravityless plant generator
///
/// Every field has a default, so an empty config file is valid.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct GeneratorConfig {
    /// Appended to the overridden mod's name to name the override mod
    /// When no mod is overridden (base game assets) the suffix alone is the name
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Game version written to manifests when the overridden mod declares none
    #[serde(default = "default_game_version")]
    pub default_game_version: String,

    /// Version of the generated override mods
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,

    #[serde(default)]
    pub merge_mode: MergeMode,

    /// Synthesize a manifest for inputs without a `.modinfo` instead of failing
    #[serde(default)]
    pub synthesize_missing_manifest: bool,
}

fn default_suffix() -> String {
    "gravityless_plants".to_string()
}

fn default_game_version() -> String {
    "1.4.4".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_description() -> String {
    "Lets farmable plants grow on walls and ceilings".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            default_game_version: default_game_version(),
            version: default_version(),
            author: None,
            description: default_description(),
            support_url: None,
            merge_mode: MergeMode::default(),
            synthesize_missing_manifest: false,
        }
    }
}

impl GeneratorConfig {
    /// Loads a config file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match extension {
            "json" => {
                let contents = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&contents)?)
            }
            "toml" => {
                let contents = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&contents)?)
            }
            other => Err(Error::UnsupportedExtension(other.to_string())),
        }
    }

    /// Name of the override mod generated for `overridden`
    pub fn override_name(&self, overridden: Option<&ModInfo>) -> String {
        match overridden {
            Some(mod_info) => format!("{}_{}", mod_info.name, self.suffix),
            None => self.suffix.clone(),
        }
    }
}
