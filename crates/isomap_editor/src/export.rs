//! Exporting maps to Tiled documents

use isomap_core::Map;
use isomap_formats::{write_tmj_string, write_tmx, FormatError};
use serde::{Deserialize, Serialize};

/// File stem used when a map name has no usable characters
pub const DEFAULT_EXPORT_STEM: &str = "untitled";

/// Tiled export flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Tmx,
    Tmj,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Tmx => "tmx",
            ExportFormat::Tmj => "tmj",
        }
    }
}

/// File name for a map export.
///
/// The name is lowercased and every run of characters outside `[a-z0-9]`
/// becomes a single `-`, with leading and trailing dashes removed.
pub fn map_filename(name: &str, extension: &str) -> String {
    let lowered = name.to_lowercase();
    let mut stem = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !stem.is_empty() {
                stem.push('-');
            }
            pending_dash = false;
            stem.push(c);
        } else {
            pending_dash = true;
        }
    }
    if stem.is_empty() {
        stem.push_str(DEFAULT_EXPORT_STEM);
    }
    format!("{stem}.{extension}")
}

/// Render a map as a Tiled document, returning `(file name, contents)`
pub fn export_map(map: &Map, format: ExportFormat) -> Result<(String, String), FormatError> {
    let contents = match format {
        ExportFormat::Tmx => write_tmx(map),
        ExportFormat::Tmj => write_tmj_string(map)?,
    };
    let filename = map_filename(&map.name, format.extension());
    tracing::info!("Exported map {} as {} ({} bytes)", map.id, filename, contents.len());
    Ok((filename, contents))
}
