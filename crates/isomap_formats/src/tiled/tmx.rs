//! Tiled XML maps (`.tmx`)

use super::tsx::{parse_tileset_node, parse_tsx, write_tileset_element};
use super::xml::{
    attribute, attribute_opt, attribute_or, child, flag_or, number, parse_properties, text_attr,
    XmlWriter,
};
use super::{map_name, Numbering, TileDataFormat, XmlResolver, TILED_FORMAT_VERSION, TILED_VERSION};
use crate::compression::{decode_tile_data, encode_csv, encode_tile_data};
use crate::error::{FormatError, Result};
use isomap_core::{
    IdGenerator, Layer, LayerKind, Map, MapObject, Orientation, Point, RenderOrder, Size,
    TileLayer, TilesetRef,
};
use roxmltree::{Document, Node};
use std::convert::Infallible;
use std::str::FromStr;

const CONTEXT: &str = "map";

/// Parse a `.tmx` document.
///
/// `<tileset source="...">` references are loaded through `resolver`, which
/// returns the referenced `.tsx` text.
pub fn parse_tmx(
    xml: &str,
    ids: &mut IdGenerator,
    mut resolver: Option<&mut XmlResolver<'_>>,
) -> Result<Map> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if !root.has_tag_name("map") {
        return Err(FormatError::MissingMapRoot);
    }

    let width: u32 = attribute(&root, "width", CONTEXT)?;
    let height: u32 = attribute(&root, "height", CONTEXT)?;
    let tile_width: u32 = attribute(&root, "tilewidth", CONTEXT)?;
    let tile_height: u32 = attribute(&root, "tileheight", CONTEXT)?;
    let orientation = parse_enum::<Orientation>(&root, "orientation", "orthogonal")?;
    let render_order = parse_enum::<RenderOrder>(&root, "renderorder", "right-down")?;

    let mut tilesets = Vec::new();
    for node in root
        .children()
        .filter(|n| n.is_element() && n.has_tag_name("tileset"))
    {
        let first_gid: u32 = attribute(&node, "firstgid", "tileset reference")?;
        let tileset = match node.attribute("source") {
            Some(source) => {
                let resolve = resolver
                    .as_deref_mut()
                    .ok_or_else(|| FormatError::UnresolvedSource(source.to_string()))?;
                let text = resolve(source)?;
                parse_tsx(&text, ids)?
            }
            None => parse_tileset_node(&node, ids)?,
        };
        tilesets.push(TilesetRef::new(first_gid, tileset));
    }
    tilesets.sort_by_key(|r| r.first_gid);

    let layers = parse_layers(&root, Size::new(width, height), ids)?;

    Ok(Map {
        id: ids.generate(),
        name: map_name(root.attribute("class"), None),
        orientation,
        render_order,
        map_size: Size::new(width, height),
        tile_size: Size::new(tile_width, tile_height),
        layers,
        tilesets,
        properties: parse_properties(&root),
    })
}

fn parse_enum<T: FromStr>(node: &Node, name: &'static str, default: &str) -> Result<T> {
    let tag = node.attribute(name).unwrap_or(default);
    tag.parse().map_err(|_| FormatError::InvalidField {
        context: CONTEXT,
        field: name.to_string(),
        value: tag.to_string(),
    })
}

/// Layer children of a map or group, in document order
fn parse_layers(parent: &Node, map_size: Size, ids: &mut IdGenerator) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();
    for node in parent.children().filter(Node::is_element) {
        let kind = match node.tag_name().name() {
            "layer" => parse_tile_data(&node, map_size)?,
            "objectgroup" => LayerKind::Object { objects: Vec::new() },
            "imagelayer" => LayerKind::Image {
                image_source: child(&node, "image")
                    .map(|img| text_attr(&img, "source").to_string())
                    .unwrap_or_default(),
            },
            "group" => LayerKind::Group { layers: Vec::new() },
            _ => continue,
        };
        let mut layer = base_layer(&node, kind, ids)?;
        match &mut layer.kind {
            LayerKind::Object { objects } => {
                for obj in node
                    .children()
                    .filter(|n| n.is_element() && n.has_tag_name("object"))
                {
                    objects.push(parse_object(&obj, ids)?);
                }
            }
            LayerKind::Group { layers: nested } => {
                *nested = parse_layers(&node, map_size, ids)?;
            }
            _ => {}
        }
        layers.push(layer);
    }
    Ok(layers)
}

fn base_layer(node: &Node, kind: LayerKind, ids: &mut IdGenerator) -> Result<Layer> {
    const CTX: &str = "layer";
    Ok(Layer {
        id: ids.generate(),
        name: text_attr(node, "name").to_string(),
        visible: flag_or(node, "visible", CTX, true)?,
        locked: flag_or(node, "locked", CTX, false)?,
        opacity: attribute_or(node, "opacity", CTX, 1.0)?,
        offset: Point::new(
            attribute_or(node, "offsetx", CTX, 0.0)?,
            attribute_or(node, "offsety", CTX, 0.0)?,
        ),
        properties: parse_properties(node),
        kind,
    })
}

fn parse_tile_data(node: &Node, map_size: Size) -> Result<LayerKind> {
    let width = attribute_or(node, "width", "layer", map_size.width)?;
    let height = attribute_or(node, "height", "layer", map_size.height)?;
    let mut tiles = TileLayer::new(width, height)?;

    if let Some(data) = child(node, "data") {
        let expected = tiles.data.len();
        tiles.data = decode_tile_data(
            data.text().unwrap_or_default(),
            data.attribute("encoding"),
            data.attribute("compression"),
            Some(expected),
        )?;
    }
    Ok(LayerKind::Tile(tiles))
}

fn parse_object(obj: &Node, ids: &mut IdGenerator) -> Result<MapObject> {
    const CTX: &str = "object";
    Ok(MapObject {
        id: ids.generate(),
        name: text_attr(obj, "name").to_string(),
        ty: obj
            .attribute("type")
            .or_else(|| obj.attribute("class"))
            .unwrap_or_default()
            .to_string(),
        x: attribute_or(obj, "x", CTX, 0.0)?,
        y: attribute_or(obj, "y", CTX, 0.0)?,
        width: attribute_or(obj, "width", CTX, 0.0)?,
        height: attribute_or(obj, "height", CTX, 0.0)?,
        rotation: attribute_or(obj, "rotation", CTX, 0.0)?,
        gid: attribute_opt(obj, "gid", CTX)?,
        visible: flag_or(obj, "visible", CTX, true)?,
        properties: parse_properties(obj),
    })
}

// =============================================================================
// Writing
// =============================================================================

/// Write a map as TMX with CSV tile data
pub fn write_tmx(map: &Map) -> String {
    let mut csv = |data: &[u32]| -> std::result::Result<String, Infallible> { Ok(encode_csv(data)) };
    match build_document::<Infallible>(map, TileDataFormat::CSV, &mut csv) {
        Ok(xml) => xml,
        Err(never) => match never {},
    }
}

/// Write a map as TMX with the given tile data encoding
pub fn write_tmx_with(map: &Map, format: TileDataFormat) -> Result<String> {
    let mut encode = |data: &[u32]| -> Result<String> {
        encode_tile_data(data, Some(format.encoding.as_str()), format.compression_tag())
    };
    build_document::<FormatError>(map, format, &mut encode)
}

type Encoder<'a, E> = dyn FnMut(&[u32]) -> std::result::Result<String, E> + 'a;

/// Layer and object totals, used for `nextlayerid`/`nextobjectid`
fn count_elements(layers: &[Layer]) -> (u32, u32) {
    layers.iter().fold((0, 0), |(l, o), layer| {
        let (nested_layers, nested_objects) = count_elements(layer.children());
        let objects = layer.objects().map_or(0, |objs| objs.len() as u32);
        (l + 1 + nested_layers, o + objects + nested_objects)
    })
}

fn build_document<E>(
    map: &Map,
    format: TileDataFormat,
    encode: &mut Encoder<'_, E>,
) -> std::result::Result<String, E> {
    let (layer_total, object_total) = count_elements(&map.layers);

    let mut w = XmlWriter::new();
    w.open(
        "map",
        &[
            ("version", TILED_FORMAT_VERSION.to_string()),
            ("tiledversion", TILED_VERSION.to_string()),
            ("class", map.name.clone()),
            ("orientation", map.orientation.as_str().to_string()),
            ("renderorder", map.render_order.as_str().to_string()),
            ("width", map.map_size.width.to_string()),
            ("height", map.map_size.height.to_string()),
            ("tilewidth", map.tile_size.width.to_string()),
            ("tileheight", map.tile_size.height.to_string()),
            ("infinite", "0".to_string()),
            ("nextlayerid", (layer_total + 1).to_string()),
            ("nextobjectid", (object_total + 1).to_string()),
        ],
    );
    w.properties(map.properties.as_ref());
    for tileset_ref in &map.tilesets {
        write_tileset_element(&mut w, &tileset_ref.tileset, Some(tileset_ref.first_gid));
    }

    let mut numbering = Numbering::new();
    for layer in &map.layers {
        write_layer(&mut w, layer, &mut numbering, format, encode)?;
    }
    w.close("map");
    Ok(w.finish())
}

fn layer_attrs(layer: &Layer, id: u32) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("id", id.to_string()), ("name", layer.name.clone())];
    if let Some(tiles) = layer.as_tile() {
        attrs.push(("width", tiles.width.to_string()));
        attrs.push(("height", tiles.height.to_string()));
    }
    if !layer.visible {
        attrs.push(("visible", "0".to_string()));
    }
    if layer.locked {
        attrs.push(("locked", "1".to_string()));
    }
    if layer.opacity < 1.0 {
        attrs.push(("opacity", number(layer.opacity)));
    }
    if layer.offset.x != 0.0 {
        attrs.push(("offsetx", number(layer.offset.x)));
    }
    if layer.offset.y != 0.0 {
        attrs.push(("offsety", number(layer.offset.y)));
    }
    attrs
}

fn write_layer<E>(
    w: &mut XmlWriter,
    layer: &Layer,
    numbering: &mut Numbering,
    format: TileDataFormat,
    encode: &mut Encoder<'_, E>,
) -> std::result::Result<(), E> {
    let attrs = layer_attrs(layer, numbering.layer());
    let tag = match &layer.kind {
        LayerKind::Tile(_) => "layer",
        LayerKind::Object { .. } => "objectgroup",
        LayerKind::Image { .. } => "imagelayer",
        LayerKind::Group { .. } => "group",
    };

    w.open(tag, &attrs);
    w.properties(layer.properties.as_ref());
    match &layer.kind {
        LayerKind::Tile(tiles) => {
            let mut data_attrs = vec![("encoding", format.encoding.as_str().to_string())];
            if let Some(compression) = format.compression_tag() {
                data_attrs.push(("compression", compression.to_string()));
            }
            let text = encode(&tiles.data)?;
            w.open("data", &data_attrs);
            w.text(&text);
            w.close("data");
        }
        LayerKind::Object { objects } => {
            for object in objects {
                write_object(w, object, numbering.object());
            }
        }
        LayerKind::Image { image_source } => {
            w.empty("image", &[("source", image_source.clone())]);
        }
        LayerKind::Group { layers } => {
            for nested in layers {
                write_layer(w, nested, numbering, format, encode)?;
            }
        }
    }
    w.close(tag);
    Ok(())
}

fn write_object(w: &mut XmlWriter, object: &MapObject, id: u32) {
    let mut attrs = vec![
        ("id", id.to_string()),
        ("name", object.name.clone()),
        ("type", object.ty.clone()),
        ("x", number(object.x)),
        ("y", number(object.y)),
    ];
    if object.width != 0.0 {
        attrs.push(("width", number(object.width)));
    }
    if object.height != 0.0 {
        attrs.push(("height", number(object.height)));
    }
    if object.rotation != 0.0 {
        attrs.push(("rotation", number(object.rotation)));
    }
    if let Some(gid) = object.gid {
        attrs.push(("gid", gid.to_string()));
    }
    if !object.visible {
        attrs.push(("visible", "0".to_string()));
    }

    match object.properties.as_ref().filter(|p| !p.is_empty()) {
        Some(properties) => {
            w.open("object", &attrs);
            w.properties(Some(properties));
            w.close("object");
        }
        None => w.empty("object", &attrs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{encode_base64, TileCompression};
    use crate::tiled::test_support::{sample_map, strip_ids};
    use isomap_core::{LayerType, PropertyValue, FLIP_HORIZONTAL};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const TMX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="isometric" renderorder="right-down" width="2" height="2" tilewidth="64" tileheight="32" class="Outpost">
  <properties>
    <property name="night" type="bool" value="true"/>
  </properties>
  <tileset firstgid="1" name="ground" tilewidth="64" tileheight="32" tilecount="4" columns="2">
    <image source="ground.png" width="128" height="64"/>
  </tileset>
  <objectgroup name="Spawns" visible="0">
    <object name="start" class="spawn" x="32" y="16"/>
  </objectgroup>
  <layer name="Floor" opacity="0.75" offsetx="2">
    <data encoding="csv">
1,2,
2147483649,0
</data>
  </layer>
  <group name="Upper" locked="1">
    <imagelayer name="Clouds">
      <image source="clouds.png"/>
    </imagelayer>
  </group>
</map>
"#;

    #[test]
    fn test_parse_map_attributes() {
        let mut ids = IdGenerator::with_session("tmx");
        let map = parse_tmx(TMX, &mut ids, None).unwrap();

        assert_eq!(map.name, "Outpost");
        assert_eq!(map.orientation, Orientation::Isometric);
        assert_eq!(map.map_size, Size::new(2, 2));
        assert_eq!(
            map.properties.as_ref().unwrap()["night"].value,
            PropertyValue::Bool(true)
        );
        assert_eq!(map.tilesets[0].tileset.name, "ground");
        assert_eq!(map.tilesets[0].tileset.tile_count, 4);
    }

    #[test]
    fn test_layers_in_document_order() {
        let mut ids = IdGenerator::with_session("tmx");
        let map = parse_tmx(TMX, &mut ids, None).unwrap();

        let kinds: Vec<LayerType> = map.layers.iter().map(Layer::layer_type).collect();
        assert_eq!(kinds, vec![LayerType::Object, LayerType::Tile, LayerType::Group]);

        let spawns = &map.layers[0];
        assert!(!spawns.visible);
        assert_eq!(spawns.objects().unwrap()[0].ty, "spawn");

        let floor = &map.layers[1];
        assert_eq!(floor.opacity, 0.75);
        assert_eq!(floor.offset, Point::new(2.0, 0.0));
        assert_eq!(
            floor.as_tile().unwrap().data,
            vec![1, 2, 1 | FLIP_HORIZONTAL, 0]
        );

        let upper = &map.layers[2];
        assert!(upper.locked);
        assert_eq!(
            upper.children()[0].kind,
            LayerKind::Image {
                image_source: "clouds.png".into()
            }
        );
    }

    #[test]
    fn test_compressed_data() {
        let encoded = encode_base64(&[3, 0, 0, 4], Some(TileCompression::Zlib)).unwrap();
        let xml = format!(
            r#"<map width="2" height="2" tilewidth="32" tileheight="32"><layer name="a"><data encoding="base64" compression="zlib">
   {encoded}
</data></layer></map>"#
        );
        let mut ids = IdGenerator::with_session("tmx");
        let map = parse_tmx(&xml, &mut ids, None).unwrap();
        assert_eq!(map.orientation, Orientation::Orthogonal);
        assert_eq!(map.name, "Imported Map");
        assert_eq!(map.layers[0].as_tile().unwrap().data, vec![3, 0, 0, 4]);
    }

    #[test]
    fn test_missing_map_root() {
        let mut ids = IdGenerator::with_session("tmx");
        let err = parse_tmx("<tileset/>", &mut ids, None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid TMX: no <map> root element");
    }

    #[test]
    fn test_data_length_mismatch() {
        let xml = r#"<map width="2" height="2" tilewidth="32" tileheight="32"><layer><data encoding="csv">1,2,3</data></layer></map>"#;
        let mut ids = IdGenerator::with_session("tmx");
        let err = parse_tmx(xml, &mut ids, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV tile data length mismatch: expected 4, got 3"
        );
    }

    #[test]
    fn test_external_tileset_resolution() {
        let xml = r#"<map width="1" height="1" tilewidth="32" tileheight="32"><tileset firstgid="1" source="walls.tsx"/></map>"#;
        let mut ids = IdGenerator::with_session("tmx");

        assert!(matches!(
            parse_tmx(xml, &mut ids, None),
            Err(FormatError::UnresolvedSource(source)) if source == "walls.tsx"
        ));

        let mut resolver = |source: &str| -> Result<String> {
            assert_eq!(source, "walls.tsx");
            Ok(r#"<tileset name="walls" tilewidth="32" tileheight="32" tilecount="2" columns="2"/>"#.to_string())
        };
        let map = parse_tmx(xml, &mut ids, Some(&mut resolver)).unwrap();
        assert_eq!(map.tilesets[0].tileset.name, "walls");
    }

    #[test]
    fn test_writer_header_and_defaults() {
        let mut ids = IdGenerator::with_session("tmx");
        let xml = write_tmx(&sample_map(&mut ids));

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<map version=\"1.10\" tiledversion=\"1.10.0\" class=\"Sample\""));
        assert!(xml.contains("infinite=\"0\""));
        assert!(xml.contains("nextlayerid=\"6\" nextobjectid=\"3\""));
        assert!(xml.contains("value=\"rain &amp; &quot;fog&quot;\""));
        assert!(xml.contains("<layer id=\"1\" name=\"Ground\" width=\"3\" height=\"2\" opacity=\"0.5\" offsetx=\"4\" offsety=\"-8\">"));
        assert!(xml.contains("<data encoding=\"csv\">\n      2147483649,2,0,0,5,17\n    </data>"));
        assert!(xml.contains("<imagelayer id=\"3\" name=\"Image Layer\" visible=\"0\">"));
        // Zero-sized objects omit width and height
        assert!(xml.contains("<object id=\"2\" name=\"spawn\" type=\"\" x=\"1\" y=\"2\" rotation=\"45\" visible=\"0\"/>"));
    }

    #[test]
    fn test_round_trip() {
        let mut ids = IdGenerator::with_session("tmx");
        let mut original = sample_map(&mut ids);
        let mut reparsed = parse_tmx(&write_tmx(&original), &mut ids, None).unwrap();

        strip_ids(&mut original);
        strip_ids(&mut reparsed);
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_multiline_map_property_round_trip() {
        let mut ids = IdGenerator::with_session("tmx");
        let mut map = sample_map(&mut ids);
        let briefing = "Reach the lighthouse.\nAvoid the reef.";
        map.properties
            .get_or_insert_with(Default::default)
            .insert("briefing".into(), isomap_core::Property::string("briefing", briefing));

        let reparsed = parse_tmx(&write_tmx(&map), &mut ids, None).unwrap();
        assert_eq!(
            reparsed.properties.unwrap()["briefing"].value,
            PropertyValue::String(briefing.into())
        );
    }

    #[test_case(TileDataFormat::base64(None) ; "base64")]
    #[test_case(TileDataFormat::base64(Some(TileCompression::Zlib)) ; "zlib")]
    #[test_case(TileDataFormat::base64(Some(TileCompression::Gzip)) ; "gzip")]
    fn test_encoded_round_trip(format: TileDataFormat) {
        let mut ids = IdGenerator::with_session("tmx");
        let mut original = sample_map(&mut ids);
        let xml = write_tmx_with(&original, format).unwrap();
        assert!(xml.contains("encoding=\"base64\""));

        let mut reparsed = parse_tmx(&xml, &mut ids, None).unwrap();
        strip_ids(&mut original);
        strip_ids(&mut reparsed);
        assert_eq!(reparsed, original);
    }
}
