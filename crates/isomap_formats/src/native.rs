//! Native isomap project files.
//!
//! A project is stored as one JSON object:
//!
//! ```json
//! {
//!   "_format": "isomap-project",
//!   "_version": 1,
//!   "name": "My Project",
//!   "tilesets": [ { "id": "...", "name": "...", ... } ],
//!   "maps": [ { "id": "...", "layers": [...], "tilesets": [ { "firstGid": 1, "tilesetId": "..." } ] } ]
//! }
//! ```
//!
//! Maps reference tilesets by id; loading re-links them against the
//! project's tileset list and drops references to ids that do not exist.

use crate::error::NativeError;
use isomap_core::{
    Layer, Map, Orientation, Project, PropertyBag, RenderOrder, Size, Tileset, TilesetRef,
    PROJECT_VERSION,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Marker stored in `_format`
pub const FORMAT_MAGIC: &str = "isomap-project";

/// Schema version written by this build
pub const SCHEMA_VERSION: u32 = PROJECT_VERSION;

pub type Result<T> = std::result::Result<T, NativeError>;

#[derive(Debug, Serialize, Deserialize)]
struct ProjectRecord {
    #[serde(rename = "_format")]
    format: String,
    #[serde(rename = "_version")]
    version: u32,
    name: String,
    maps: Vec<MapRecord>,
    tilesets: Vec<Tileset>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapRecord {
    id: String,
    name: String,
    orientation: Orientation,
    render_order: RenderOrder,
    map_size: Size,
    tile_size: Size,
    layers: Vec<Layer>,
    tilesets: Vec<TilesetLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<PropertyBag>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TilesetLink {
    first_gid: u32,
    tileset_id: String,
}

impl MapRecord {
    fn from_map(map: &Map) -> Self {
        Self {
            id: map.id.clone(),
            name: map.name.clone(),
            orientation: map.orientation,
            render_order: map.render_order,
            map_size: map.map_size,
            tile_size: map.tile_size,
            layers: map.layers.clone(),
            tilesets: map
                .tilesets
                .iter()
                .map(|r| TilesetLink {
                    first_gid: r.first_gid,
                    tileset_id: r.tileset.id.clone(),
                })
                .collect(),
            properties: map.properties.clone(),
        }
    }

    fn into_map(self, tilesets: &HashMap<&str, &Tileset>) -> Map {
        let map_id = self.id;
        let mut refs: Vec<TilesetRef> = self
            .tilesets
            .into_iter()
            .filter_map(|link| match tilesets.get(link.tileset_id.as_str()) {
                Some(tileset) => Some(TilesetRef::new(link.first_gid, (*tileset).clone())),
                None => {
                    tracing::debug!(
                        "Map {} references unknown tileset {}, dropping it",
                        map_id,
                        link.tileset_id
                    );
                    None
                }
            })
            .collect();
        refs.sort_by_key(|r| r.first_gid);

        Map {
            id: map_id,
            name: self.name,
            orientation: self.orientation,
            render_order: self.render_order,
            map_size: self.map_size,
            tile_size: self.tile_size,
            layers: self.layers,
            tilesets: refs,
            properties: self.properties,
        }
    }
}

/// Serialize a project into its native JSON tree
pub fn serialize_project(project: &Project) -> Result<Value> {
    let record = ProjectRecord {
        format: FORMAT_MAGIC.to_string(),
        version: SCHEMA_VERSION,
        name: project.name.clone(),
        maps: project.maps.iter().map(MapRecord::from_map).collect(),
        tilesets: project.tilesets.clone(),
    };
    Ok(serde_json::to_value(record)?)
}

/// Serialize a project to pretty-printed JSON text
pub fn serialize_project_to_string(project: &Project) -> Result<String> {
    Ok(serde_json::to_string_pretty(&serialize_project(project)?)?)
}

/// Validate and decode a native project tree.
///
/// Checks run in a fixed order and stop at the first failure: object root,
/// format marker, schema version, `tilesets` array, `maps` array, then every
/// tile layer's `width`, `height` and `data`.
pub fn deserialize_project(data: &Value) -> Result<Project> {
    validate(data)?;

    let record = ProjectRecord::deserialize(data)?;
    let by_id: HashMap<&str, &Tileset> = record
        .tilesets
        .iter()
        .map(|t| (t.id.as_str(), t))
        .collect();
    let maps = record
        .maps
        .into_iter()
        .map(|m| m.into_map(&by_id))
        .collect();

    Ok(Project {
        version: record.version,
        name: record.name,
        maps,
        tilesets: record.tilesets,
    })
}

/// Parse JSON text and decode it as a native project
pub fn deserialize_project_from_str(text: &str) -> Result<Project> {
    let value: Value = serde_json::from_str(text)?;
    deserialize_project(&value)
}

fn validate(data: &Value) -> Result<()> {
    let root = data.as_object().ok_or(NativeError::NotAnObject)?;

    if root.get("_format").and_then(Value::as_str) != Some(FORMAT_MAGIC) {
        return Err(NativeError::MissingFormatMarker);
    }

    let version = root
        .get("_version")
        .and_then(Value::as_u64)
        .ok_or(NativeError::MissingVersion)?;
    if version > u64::from(SCHEMA_VERSION) {
        return Err(NativeError::UnsupportedVersion {
            version,
            supported: SCHEMA_VERSION,
        });
    }

    if !root.get("tilesets").is_some_and(Value::is_array) {
        return Err(NativeError::MissingTilesets);
    }
    let maps = root
        .get("maps")
        .and_then(Value::as_array)
        .ok_or(NativeError::MissingMaps)?;

    for map in maps {
        if let Some(layers) = map.get("layers").and_then(Value::as_array) {
            validate_layers(layers)?;
        }
    }
    Ok(())
}

fn validate_layers(layers: &[Value]) -> Result<()> {
    for layer in layers {
        let ty = layer.get("type").and_then(Value::as_str).unwrap_or_default();
        match ty {
            "tile" => {
                let name = || {
                    layer
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                let positive = |key: &str| {
                    layer
                        .get(key)
                        .and_then(Value::as_f64)
                        .is_some_and(|v| v > 0.0)
                };
                if !positive("width") {
                    return Err(NativeError::InvalidLayerWidth { name: name() });
                }
                if !positive("height") {
                    return Err(NativeError::InvalidLayerHeight { name: name() });
                }
                let Some(data) = layer.get("data").and_then(Value::as_array) else {
                    return Err(NativeError::MissingLayerData { name: name() });
                };
                let dimension = |key: &str| {
                    layer.get(key).and_then(Value::as_u64).unwrap_or_default() as usize
                };
                let expected = dimension("width").saturating_mul(dimension("height"));
                if data.len() != expected {
                    return Err(NativeError::LayerDataLength {
                        expected,
                        actual: data.len(),
                    });
                }
            }
            "group" => {
                if let Some(children) = layer.get("layers").and_then(Value::as_array) {
                    validate_layers(children)?;
                }
            }
            "object" | "image" => {}
            other => return Err(NativeError::UnknownLayerType(other.to_string())),
        }
    }
    Ok(())
}
