//! Tiled JSON maps (`.tmj`)

use super::json::{
    array, field, opt_bool, opt_f64, opt_str, opt_u32, parse_properties, put_properties, req_u32,
};
use super::tsj::{parse_tsj, tileset_fields};
use super::{
    map_name, JsonResolver, Numbering, TileDataFormat, TILED_FORMAT_VERSION, TILED_VERSION,
};
use crate::compression::{decode_tile_data, encode_tile_data, TileEncoding};
use crate::error::{FormatError, Result};
use isomap_core::{
    IdGenerator, Layer, LayerKind, Map, MapObject, Orientation, Point, RenderOrder, Size,
    TileLayer, TilesetRef,
};
use serde_json::{json, Map as JsonMap, Value};
use std::convert::Infallible;

const CONTEXT: &str = "map";

/// Parse a Tiled JSON map.
///
/// Tilesets with a `source` are loaded through `resolver`; without one such a
/// reference is an error.
pub fn parse_tmj(
    json: &Value,
    ids: &mut IdGenerator,
    mut resolver: Option<&mut JsonResolver<'_>>,
) -> Result<Map> {
    let width = req_u32(json, "width", CONTEXT)?;
    let height = req_u32(json, "height", CONTEXT)?;
    let tile_width = req_u32(json, "tilewidth", CONTEXT)?;
    let tile_height = req_u32(json, "tileheight", CONTEXT)?;

    let orientation = parse_enum::<Orientation>(json, "orientation", "orthogonal")?;
    let render_order = parse_enum::<RenderOrder>(json, "renderorder", "right-down")?;

    let mut tilesets = Vec::new();
    for entry in array(json, "tilesets") {
        let first_gid = req_u32(entry, "firstgid", "tileset reference")?;
        let tileset = match opt_str(entry, "source") {
            Some(source) => {
                let resolve = resolver
                    .as_deref_mut()
                    .ok_or_else(|| FormatError::UnresolvedSource(source.to_string()))?;
                let doc = resolve(source)?;
                parse_tsj(&doc, ids)?
            }
            None => parse_tsj(entry, ids)?,
        };
        tilesets.push(TilesetRef::new(first_gid, tileset));
    }
    tilesets.sort_by_key(|r| r.first_gid);

    let layers = parse_layers(array(json, "layers"), Size::new(width, height), ids)?;

    Ok(Map {
        id: ids.generate(),
        name: map_name(opt_str(json, "class"), opt_str(json, "type")),
        orientation,
        render_order,
        map_size: Size::new(width, height),
        tile_size: Size::new(tile_width, tile_height),
        layers,
        tilesets,
        properties: parse_properties(json),
    })
}

fn parse_enum<T>(json: &Value, name: &'static str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
{
    let tag = opt_str(json, name).unwrap_or(default);
    tag.parse().map_err(|_| FormatError::InvalidField {
        context: CONTEXT,
        field: name.to_string(),
        value: tag.to_string(),
    })
}

fn parse_layers(layers: &[Value], map_size: Size, ids: &mut IdGenerator) -> Result<Vec<Layer>> {
    let mut parsed = Vec::with_capacity(layers.len());
    for lj in layers {
        if let Some(layer) = parse_layer(lj, map_size, ids)? {
            parsed.push(layer);
        }
    }
    Ok(parsed)
}

fn parse_layer(lj: &Value, map_size: Size, ids: &mut IdGenerator) -> Result<Option<Layer>> {
    const CTX: &str = "layer";
    let ty = opt_str(lj, "type").unwrap_or_default();
    let id = ids.generate();

    let kind = match ty {
        "tilelayer" => {
            let width = opt_u32(lj, "width", CTX)?.unwrap_or(map_size.width);
            let height = opt_u32(lj, "height", CTX)?.unwrap_or(map_size.height);
            let mut tiles = TileLayer::new(width, height)?;
            let expected = tiles.data.len();
            match field(lj, "data") {
                Some(Value::Array(cells)) => {
                    if cells.len() != expected {
                        return Err(FormatError::LengthMismatch {
                            expected,
                            actual: cells.len(),
                        });
                    }
                    for (slot, cell) in tiles.data.iter_mut().zip(cells) {
                        *slot = cell
                            .as_u64()
                            .and_then(|v| u32::try_from(v).ok())
                            .ok_or_else(|| FormatError::InvalidTileValue(cell.to_string()))?;
                    }
                }
                Some(Value::String(text)) => {
                    tiles.data = decode_tile_data(
                        text,
                        opt_str(lj, "encoding"),
                        opt_str(lj, "compression"),
                        Some(expected),
                    )?;
                }
                _ => {}
            }
            LayerKind::Tile(tiles)
        }
        "objectgroup" => LayerKind::Object {
            objects: array(lj, "objects")
                .iter()
                .map(|obj| parse_object(obj, ids))
                .collect::<Result<Vec<_>>>()?,
        },
        "imagelayer" => LayerKind::Image {
            image_source: opt_str(lj, "image").unwrap_or_default().to_string(),
        },
        "group" => LayerKind::Group {
            layers: parse_layers(array(lj, "layers"), map_size, ids)?,
        },
        other => {
            tracing::debug!("Skipping unsupported layer type '{}'", other);
            return Ok(None);
        }
    };

    Ok(Some(Layer {
        id,
        name: opt_str(lj, "name").unwrap_or_default().to_string(),
        visible: opt_bool(lj, "visible", CTX)?.unwrap_or(true),
        locked: opt_bool(lj, "locked", CTX)?.unwrap_or(false),
        opacity: opt_f64(lj, "opacity", CTX)?.unwrap_or(1.0),
        offset: Point::new(
            opt_f64(lj, "offsetx", CTX)?.unwrap_or(0.0),
            opt_f64(lj, "offsety", CTX)?.unwrap_or(0.0),
        ),
        properties: parse_properties(lj),
        kind,
    }))
}

fn parse_object(obj: &Value, ids: &mut IdGenerator) -> Result<MapObject> {
    const CTX: &str = "object";
    Ok(MapObject {
        id: ids.generate(),
        name: opt_str(obj, "name").unwrap_or_default().to_string(),
        ty: opt_str(obj, "type")
            .or_else(|| opt_str(obj, "class"))
            .unwrap_or_default()
            .to_string(),
        x: opt_f64(obj, "x", CTX)?.unwrap_or(0.0),
        y: opt_f64(obj, "y", CTX)?.unwrap_or(0.0),
        width: opt_f64(obj, "width", CTX)?.unwrap_or(0.0),
        height: opt_f64(obj, "height", CTX)?.unwrap_or(0.0),
        rotation: opt_f64(obj, "rotation", CTX)?.unwrap_or(0.0),
        gid: opt_u32(obj, "gid", CTX)?,
        visible: opt_bool(obj, "visible", CTX)?.unwrap_or(true),
        properties: parse_properties(obj),
    })
}

// =============================================================================
// Writing
// =============================================================================

/// Write a map as Tiled JSON with inline tile arrays
pub fn write_tmj(map: &Map) -> Value {
    let mut inline =
        |tiles: &TileLayer, obj: &mut JsonMap<String, Value>| -> std::result::Result<(), Infallible> {
            obj.insert("data".into(), json!(tiles.data));
            Ok(())
        };
    match build_map::<Infallible>(map, &mut inline) {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Write a map as Tiled JSON with the given tile data encoding.
///
/// CSV is written as inline arrays, base64 as an encoded string with
/// `encoding`/`compression` tags.
pub fn write_tmj_with(map: &Map, format: TileDataFormat) -> Result<Value> {
    if format.encoding == TileEncoding::Csv {
        return Ok(write_tmj(map));
    }
    let mut encoded = |tiles: &TileLayer, obj: &mut JsonMap<String, Value>| -> Result<()> {
        let compression = format.compression_tag();
        let text = encode_tile_data(&tiles.data, Some(format.encoding.as_str()), compression)?;
        obj.insert("encoding".into(), json!(format.encoding.as_str()));
        if let Some(tag) = compression {
            obj.insert("compression".into(), json!(tag));
        }
        obj.insert("data".into(), json!(text));
        Ok(())
    };
    build_map::<FormatError>(map, &mut encoded)
}

/// Serialize a map to a pretty-printed Tiled JSON string
pub fn write_tmj_string(map: &Map) -> Result<String> {
    Ok(serde_json::to_string_pretty(&write_tmj(map))?)
}

type DataWriter<'a, E> =
    dyn FnMut(&TileLayer, &mut JsonMap<String, Value>) -> std::result::Result<(), E> + 'a;

fn build_map<E>(map: &Map, data: &mut DataWriter<'_, E>) -> std::result::Result<Value, E> {
    let mut numbering = Numbering::new();
    let layers = write_layers(&map.layers, &mut numbering, data)?;

    let tilesets: Vec<Value> = map
        .tilesets
        .iter()
        .map(|r| {
            let mut obj = tileset_fields(&r.tileset);
            if let Some(fields) = obj.as_object_mut() {
                fields.insert("firstgid".into(), json!(r.first_gid));
            }
            obj
        })
        .collect();

    let mut obj = json!({
        "type": "map",
        "class": map.name,
        "version": TILED_FORMAT_VERSION,
        "tiledversion": TILED_VERSION,
        "orientation": map.orientation.as_str(),
        "renderorder": map.render_order.as_str(),
        "width": map.map_size.width,
        "height": map.map_size.height,
        "tilewidth": map.tile_size.width,
        "tileheight": map.tile_size.height,
        "infinite": false,
        "nextlayerid": numbering.next_layer_id(),
        "nextobjectid": numbering.next_object_id(),
        "layers": layers,
        "tilesets": tilesets,
    });
    put_properties(&mut obj, map.properties.as_ref());
    Ok(obj)
}

fn write_layers<E>(
    layers: &[Layer],
    numbering: &mut Numbering,
    data: &mut DataWriter<'_, E>,
) -> std::result::Result<Vec<Value>, E> {
    layers
        .iter()
        .map(|layer| write_layer(layer, numbering, data))
        .collect()
}

fn write_layer<E>(
    layer: &Layer,
    numbering: &mut Numbering,
    data: &mut DataWriter<'_, E>,
) -> std::result::Result<Value, E> {
    let mut obj = JsonMap::new();
    obj.insert("id".into(), json!(numbering.layer()));
    obj.insert("name".into(), json!(layer.name));
    obj.insert("visible".into(), json!(layer.visible));
    if layer.locked {
        obj.insert("locked".into(), json!(true));
    }
    obj.insert("opacity".into(), json!(layer.opacity));
    obj.insert("offsetx".into(), json!(layer.offset.x));
    obj.insert("offsety".into(), json!(layer.offset.y));
    obj.insert("x".into(), json!(0));
    obj.insert("y".into(), json!(0));

    match &layer.kind {
        LayerKind::Tile(tiles) => {
            obj.insert("type".into(), json!("tilelayer"));
            obj.insert("width".into(), json!(tiles.width));
            obj.insert("height".into(), json!(tiles.height));
            data(tiles, &mut obj)?;
        }
        LayerKind::Object { objects } => {
            obj.insert("type".into(), json!("objectgroup"));
            obj.insert("draworder".into(), json!("topdown"));
            obj.insert(
                "objects".into(),
                Value::Array(objects.iter().map(|o| write_object(o, numbering)).collect()),
            );
        }
        LayerKind::Image { image_source } => {
            obj.insert("type".into(), json!("imagelayer"));
            obj.insert("image".into(), json!(image_source));
        }
        LayerKind::Group { layers } => {
            obj.insert("type".into(), json!("group"));
            obj.insert(
                "layers".into(),
                Value::Array(write_layers(layers, numbering, data)?),
            );
        }
    }

    let mut value = Value::Object(obj);
    put_properties(&mut value, layer.properties.as_ref());
    Ok(value)
}

fn write_object(object: &MapObject, numbering: &mut Numbering) -> Value {
    let mut obj = json!({
        "id": numbering.object(),
        "name": object.name,
        "type": object.ty,
        "x": object.x,
        "y": object.y,
        "width": object.width,
        "height": object.height,
        "rotation": object.rotation,
        "visible": object.visible,
    });
    if let (Some(gid), Some(fields)) = (object.gid, obj.as_object_mut()) {
        fields.insert("gid".into(), json!(gid));
    }
    put_properties(&mut obj, object.properties.as_ref());
    obj
}
