use std::{fs::File, io::Read, path::Path};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by the extract and create commands.
///
/// Loaded from an optional JSON file; command line flags are applied on top.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    pub log_level: LevelFilter,
    /// Extension given to extracted payloads.
    pub extension: String,
    /// Name extracted files after their stock icon (`9_ICON_HotendTemp.jpg`).
    pub use_icon_names: bool,
    /// Refuse build inputs whose dimensions cannot be read instead of storing 0x0.
    pub strict_dimensions: bool,
    /// Write `manifest.json` next to extracted files.
    pub write_manifest: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            extension: "jpg".to_string(),
            use_icon_names: true,
            strict_dimensions: false,
            write_manifest: true,
        }
    }
}

impl ToolConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
