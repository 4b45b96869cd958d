//! Tiled JSON tileset (`.tsj`, and tilesets embedded in `.tmj` maps)

use super::json::{
    array, field, opt_bool, opt_f64, opt_i64, opt_str, opt_u32, parse_properties, put_properties,
    req_u32,
};
use super::{TILED_FORMAT_VERSION, TILED_VERSION};
use crate::error::Result;
use isomap_core::{
    wang_id_from_slice, AnimationFrame, CollisionShape, CollisionShapeKind,
    IdGenerator, Size, TileData, Tileset, WangColor, WangSet, WangSetType, WangTile,
};
use serde_json::{json, Map as JsonMap, Value};
use std::collections::BTreeMap;

const CONTEXT: &str = "tileset";

/// Name used when a tileset document carries none
pub const DEFAULT_TILESET_NAME: &str = "Untitled Tileset";

/// Parse a Tiled JSON tileset object
pub fn parse_tsj(json: &Value, ids: &mut IdGenerator) -> Result<Tileset> {
    let tile_width = req_u32(json, "tilewidth", CONTEXT)?;
    let tile_height = req_u32(json, "tileheight", CONTEXT)?;
    let image_width = opt_u32(json, "imagewidth", CONTEXT)?.unwrap_or(0);
    let image_height = opt_u32(json, "imageheight", CONTEXT)?.unwrap_or(0);

    let columns = match opt_u32(json, "columns", CONTEXT)? {
        Some(columns) => columns,
        None if image_width > 0 && tile_width > 0 => image_width / tile_width,
        None => 0,
    };
    let tile_count = match opt_u32(json, "tilecount", CONTEXT)? {
        Some(count) => count,
        None if image_height > 0 && tile_height > 0 => {
            columns.saturating_mul(image_height / tile_height)
        }
        None => 0,
    };

    let mut tiles = BTreeMap::new();
    for t in array(json, "tiles") {
        let tile = parse_tile(t)?;
        tiles.insert(tile.local_id, tile);
    }

    let wang_sets = array(json, "wangsets")
        .iter()
        .map(parse_wang_set)
        .collect::<Result<Vec<_>>>()?;

    Ok(Tileset {
        id: ids.generate(),
        name: opt_str(json, "name")
            .unwrap_or(DEFAULT_TILESET_NAME)
            .to_string(),
        image_source: opt_str(json, "image").unwrap_or_default().to_string(),
        image_size: Size::new(image_width, image_height),
        tile_size: Size::new(tile_width, tile_height),
        columns,
        tile_count,
        spacing: opt_u32(json, "spacing", CONTEXT)?.unwrap_or(0),
        margin: opt_u32(json, "margin", CONTEXT)?.unwrap_or(0),
        tiles,
        properties: parse_properties(json),
        wang_sets,
    })
}

fn parse_tile(t: &Value) -> Result<TileData> {
    let mut tile = TileData::new(req_u32(t, "id", "tile")?);

    if let Some(frames) = field(t, "animation").and_then(Value::as_array) {
        tile.animation = Some(
            frames
                .iter()
                .map(|f| {
                    Ok(AnimationFrame {
                        tile_id: req_u32(f, "tileid", "animation frame")?,
                        duration: req_u32(f, "duration", "animation frame")?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        );
    }

    if let Some(group) = field(t, "objectgroup") {
        if let Some(objects) = field(group, "objects").and_then(Value::as_array) {
            tile.collision = Some(
                objects
                    .iter()
                    .map(parse_collision_object)
                    .collect::<Result<Vec<_>>>()?,
            );
        }
    }

    tile.probability = opt_f64(t, "probability", "tile")?;
    tile.properties = parse_properties(t);
    Ok(tile)
}

fn parse_collision_object(obj: &Value) -> Result<CollisionShape> {
    const CTX: &str = "collision object";
    let x = opt_f64(obj, "x", CTX)?.unwrap_or(0.0);
    let y = opt_f64(obj, "y", CTX)?.unwrap_or(0.0);
    let width = opt_f64(obj, "width", CTX)?.unwrap_or(0.0);
    let height = opt_f64(obj, "height", CTX)?.unwrap_or(0.0);

    if opt_bool(obj, "ellipse", CTX)?.unwrap_or(false) {
        return Ok(CollisionShape::ellipse(x, y, width, height));
    }
    if let Some(points) = field(obj, "polygon").and_then(Value::as_array) {
        let mut flat = Vec::with_capacity(points.len() * 2);
        for pt in points {
            flat.push(x + opt_f64(pt, "x", CTX)?.unwrap_or(0.0));
            flat.push(y + opt_f64(pt, "y", CTX)?.unwrap_or(0.0));
        }
        return Ok(CollisionShape::polygon(flat));
    }
    Ok(CollisionShape::rect(x, y, width, height))
}

fn parse_wang_set(ws: &Value) -> Result<WangSet> {
    let colors = array(ws, "colors")
        .iter()
        .map(|c| {
            let defaults = WangColor::default();
            Ok(WangColor {
                name: opt_str(c, "name").unwrap_or_default().to_string(),
                color: opt_str(c, "color").unwrap_or(&defaults.color).to_string(),
                tile: opt_i64(c, "tile", "wang color")?.unwrap_or(defaults.tile),
                probability: opt_f64(c, "probability", "wang color")?
                    .unwrap_or(defaults.probability),
                properties: parse_properties(c),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let wang_tiles = array(ws, "wangtiles")
        .iter()
        .map(|wt| {
            let slots: Vec<u32> = array(wt, "wangid")
                .iter()
                .map(|v| v.as_u64().unwrap_or(0) as u32)
                .collect();
            Ok(WangTile {
                tile_id: req_u32(wt, "tileid", "wang tile")?,
                wang_id: wang_id_from_slice(&slots),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WangSet {
        name: opt_str(ws, "name").unwrap_or_default().to_string(),
        ty: WangSetType::from_tag(opt_str(ws, "type").unwrap_or("corner")),
        colors,
        wang_tiles,
        properties: parse_properties(ws),
    })
}

// =============================================================================
// Writing
// =============================================================================

/// Write a standalone Tiled JSON tileset document
pub fn write_tsj(tileset: &Tileset) -> Value {
    let mut obj = tileset_fields(tileset);
    if let Some(map) = obj.as_object_mut() {
        map.insert("type".into(), json!("tileset"));
        map.insert("version".into(), json!(TILED_FORMAT_VERSION));
        map.insert("tiledversion".into(), json!(TILED_VERSION));
    }
    obj
}

/// Serialize a JSON tileset document to a pretty-printed string
pub fn write_tsj_string(tileset: &Tileset) -> Result<String> {
    Ok(serde_json::to_string_pretty(&write_tsj(tileset))?)
}

/// Tileset fields shared by standalone documents and embedded map tilesets
pub(crate) fn tileset_fields(tileset: &Tileset) -> Value {
    let mut obj = json!({
        "name": tileset.name,
        "image": tileset.image_source,
        "imagewidth": tileset.image_size.width,
        "imageheight": tileset.image_size.height,
        "tilewidth": tileset.tile_size.width,
        "tileheight": tileset.tile_size.height,
        "columns": tileset.columns,
        "tilecount": tileset.tile_count,
        "spacing": tileset.spacing,
        "margin": tileset.margin,
    });

    let tiles: Vec<Value> = tileset
        .tiles
        .values()
        .filter(|t| !t.is_empty())
        .map(write_tile)
        .collect();

    if let Some(map) = obj.as_object_mut() {
        if !tiles.is_empty() {
            map.insert("tiles".into(), Value::Array(tiles));
        }
        if !tileset.wang_sets.is_empty() {
            map.insert(
                "wangsets".into(),
                Value::Array(tileset.wang_sets.iter().map(write_wang_set).collect()),
            );
        }
    }
    put_properties(&mut obj, tileset.properties.as_ref());
    obj
}

fn write_tile(tile: &TileData) -> Value {
    let mut obj = JsonMap::new();
    obj.insert("id".into(), json!(tile.local_id));

    if let Some(frames) = &tile.animation {
        obj.insert(
            "animation".into(),
            Value::Array(
                frames
                    .iter()
                    .map(|f| json!({ "tileid": f.tile_id, "duration": f.duration }))
                    .collect(),
            ),
        );
    }
    if let Some(shapes) = &tile.collision {
        let objects: Vec<Value> = shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| write_collision_object(i as u32 + 1, shape))
            .collect();
        obj.insert(
            "objectgroup".into(),
            json!({
                "type": "objectgroup",
                "draworder": "index",
                "name": "",
                "opacity": 1,
                "visible": true,
                "x": 0,
                "y": 0,
                "objects": objects,
            }),
        );
    }
    if let Some(probability) = tile.probability {
        obj.insert("probability".into(), json!(probability));
    }

    let mut value = Value::Object(obj);
    put_properties(&mut value, tile.properties.as_ref());
    value
}

fn write_collision_object(id: u32, shape: &CollisionShape) -> Value {
    let d = |i: usize| shape.data.get(i).copied().unwrap_or(0.0);
    match shape.kind {
        CollisionShapeKind::Rect => json!({
            "id": id, "name": "", "type": "", "rotation": 0, "visible": true,
            "x": d(0), "y": d(1), "width": d(2), "height": d(3),
        }),
        CollisionShapeKind::Ellipse => json!({
            "id": id, "name": "", "type": "", "rotation": 0, "visible": true,
            "x": d(0), "y": d(1), "width": d(2), "height": d(3),
            "ellipse": true,
        }),
        // Points are absolute, so the object itself sits at the origin
        CollisionShapeKind::Polygon => json!({
            "id": id, "name": "", "type": "", "rotation": 0, "visible": true,
            "x": 0, "y": 0, "width": 0, "height": 0,
            "polygon": shape
                .data
                .chunks_exact(2)
                .map(|p| json!({ "x": p[0], "y": p[1] }))
                .collect::<Vec<_>>(),
        }),
    }
}

fn write_wang_set(ws: &WangSet) -> Value {
    let colors: Vec<Value> = ws
        .colors
        .iter()
        .map(|c| {
            let mut obj = json!({
                "name": c.name,
                "color": c.color,
                "tile": c.tile,
                "probability": c.probability,
            });
            put_properties(&mut obj, c.properties.as_ref());
            obj
        })
        .collect();

    let mut obj = json!({
        "name": ws.name,
        "type": ws.ty.as_str(),
        "tile": -1,
        "colors": colors,
        "wangtiles": ws
            .wang_tiles
            .iter()
            .map(|wt| json!({ "tileid": wt.tile_id, "wangid": wt.wang_id }))
            .collect::<Vec<_>>(),
    });
    put_properties(&mut obj, ws.properties.as_ref());
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomap_core::{Property, PropertyValue};
    use pretty_assertions::assert_eq;

    fn sample_json() -> Value {
        json!({
            "name": "terrain",
            "image": "terrain.png",
            "imagewidth": 256,
            "imageheight": 128,
            "tilewidth": 64,
            "tileheight": 32,
            "tiles": [
                {
                    "id": 3,
                    "probability": 0.25,
                    "animation": [
                        { "tileid": 3, "duration": 100 },
                        { "tileid": 4, "duration": 150 }
                    ],
                    "objectgroup": {
                        "objects": [
                            { "x": 1, "y": 2, "width": 10, "height": 5 },
                            { "x": 0, "y": 0, "width": 8, "height": 8, "ellipse": true },
                            { "x": 4, "y": 6, "polygon": [ { "x": 0, "y": 0 }, { "x": 10, "y": 0 }, { "x": 5, "y": 8 } ] }
                        ]
                    },
                    "properties": [ { "name": "solid", "type": "bool", "value": true } ]
                }
            ],
            "wangsets": [
                {
                    "name": "ground",
                    "colors": [ { "name": "grass", "color": "#00ff00", "tile": 0 } ],
                    "wangtiles": [ { "tileid": 0, "wangid": [0, 1, 0, 1, 0, 1, 0, 1] } ]
                }
            ]
        })
    }

    #[test]
    fn test_parse_derives_missing_geometry() {
        let mut ids = IdGenerator::with_session("tsj");
        let tileset = parse_tsj(&sample_json(), &mut ids).unwrap();
        assert_eq!(tileset.columns, 4);
        assert_eq!(tileset.tile_count, 16);
        assert_eq!(tileset.name, "terrain");
        assert_eq!(tileset.spacing, 0);
    }

    #[test]
    fn test_derived_tile_count_saturates() {
        let mut ids = IdGenerator::with_session("tsj");
        let json = json!({
            "tilewidth": 1, "tileheight": 1, "columns": 100000,
            "image": "huge.png", "imagewidth": 100000, "imageheight": 100000
        });
        let tileset = parse_tsj(&json, &mut ids).unwrap();
        assert_eq!(tileset.tile_count, u32::MAX);
    }

    #[test]
    fn test_parse_tile_metadata() {
        let mut ids = IdGenerator::with_session("tsj");
        let tileset = parse_tsj(&sample_json(), &mut ids).unwrap();
        let tile = tileset.tile(3).unwrap();

        assert_eq!(tile.probability, Some(0.25));
        assert_eq!(
            tile.animation.as_deref(),
            Some(
                &[
                    AnimationFrame { tile_id: 3, duration: 100 },
                    AnimationFrame { tile_id: 4, duration: 150 }
                ][..]
            )
        );
        let shapes = tile.collision.as_ref().unwrap();
        assert_eq!(shapes[0], CollisionShape::rect(1.0, 2.0, 10.0, 5.0));
        assert_eq!(shapes[1], CollisionShape::ellipse(0.0, 0.0, 8.0, 8.0));
        assert_eq!(
            shapes[2],
            CollisionShape::polygon(vec![4.0, 6.0, 14.0, 6.0, 9.0, 14.0])
        );
        assert_eq!(
            tile.properties.as_ref().unwrap()["solid"].value,
            PropertyValue::Bool(true)
        );
    }

    #[test]
    fn test_parse_wang_defaults() {
        let mut ids = IdGenerator::with_session("tsj");
        let tileset = parse_tsj(&sample_json(), &mut ids).unwrap();
        let ws = &tileset.wang_sets[0];
        assert_eq!(ws.ty, WangSetType::Corner);
        assert_eq!(ws.colors[0].probability, 1.0);
        assert_eq!(ws.colors[0].tile, 0);
        assert_eq!(ws.wang_tiles[0].wang_id, [0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_missing_tile_size_is_an_error() {
        let mut ids = IdGenerator::with_session("tsj");
        let err = parse_tsj(&json!({ "tilewidth": 32 }), &mut ids).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field 'tileheight' in tileset"
        );
    }

    #[test]
    fn test_defaults_without_image() {
        let mut ids = IdGenerator::with_session("tsj");
        let tileset = parse_tsj(&json!({ "tilewidth": 32, "tileheight": 32 }), &mut ids).unwrap();
        assert_eq!(tileset.name, "Untitled Tileset");
        assert_eq!(tileset.columns, 0);
        assert_eq!(tileset.tile_count, 0);
        assert!(tileset.wang_sets.is_empty());
    }

    #[test]
    fn test_write_then_parse_preserves_tileset() {
        let mut ids = IdGenerator::with_session("tsj");
        let mut original = parse_tsj(&sample_json(), &mut ids).unwrap();
        original.properties = Some(
            [("biome".to_string(), Property::string("biome", "forest"))]
                .into_iter()
                .collect(),
        );
        let written = write_tsj(&original);
        assert_eq!(written["type"], "tileset");

        let mut reparsed = parse_tsj(&written, &mut ids).unwrap();
        reparsed.id = original.id.clone();
        assert_eq!(reparsed, original);
    }
}
