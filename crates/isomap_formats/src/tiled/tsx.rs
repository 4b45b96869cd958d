//! Tiled XML tileset (`.tsx`, and `<tileset>` elements embedded in `.tmx` maps)

use super::tsj::DEFAULT_TILESET_NAME;
use super::xml::{
    attribute, attribute_opt, attribute_or, child, children, number, parse_properties, text_attr,
    XmlWriter,
};
use super::{TILED_FORMAT_VERSION, TILED_VERSION};
use crate::error::{FormatError, Result};
use isomap_core::{
    AnimationFrame, CollisionShape, CollisionShapeKind, IdGenerator, Size, TileData, Tileset,
    WangColor, WangSet, WangSetType, WangTile, WANG_SLOTS,
};
use roxmltree::{Document, Node};
use std::collections::BTreeMap;

const CONTEXT: &str = "tileset";

/// Parse a standalone `.tsx` document
pub fn parse_tsx(xml: &str, ids: &mut IdGenerator) -> Result<Tileset> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if !root.has_tag_name("tileset") {
        return Err(FormatError::MissingTilesetRoot);
    }
    parse_tileset_node(&root, ids)
}

/// Parse a `<tileset>` element carrying its own attributes and children
pub(crate) fn parse_tileset_node(node: &Node, ids: &mut IdGenerator) -> Result<Tileset> {
    let tile_width: u32 = attribute(node, "tilewidth", CONTEXT)?;
    let tile_height: u32 = attribute(node, "tileheight", CONTEXT)?;

    let image = child(node, "image");
    let (image_source, image_width, image_height) = match &image {
        Some(img) => (
            text_attr(img, "source").to_string(),
            attribute_or(img, "width", "image", 0u32)?,
            attribute_or(img, "height", "image", 0u32)?,
        ),
        None => (String::new(), 0, 0),
    };

    let columns = match attribute_opt::<u32>(node, "columns", CONTEXT)? {
        Some(columns) => columns,
        None if image_width > 0 && tile_width > 0 => image_width / tile_width,
        None => 0,
    };
    let tile_count = match attribute_opt::<u32>(node, "tilecount", CONTEXT)? {
        Some(count) => count,
        None if columns > 0 && tile_height > 0 => {
            columns.saturating_mul(image_height / tile_height)
        }
        None => 0,
    };

    let mut tiles = BTreeMap::new();
    for t in children(node, "tile") {
        let tile = parse_tile(&t)?;
        tiles.insert(tile.local_id, tile);
    }

    let wang_sets = match child(node, "wangsets") {
        Some(sets) => children(&sets, "wangset")
            .map(|ws| parse_wang_set(&ws))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(Tileset {
        id: ids.generate(),
        name: node
            .attribute("name")
            .unwrap_or(DEFAULT_TILESET_NAME)
            .to_string(),
        image_source,
        image_size: Size::new(image_width, image_height),
        tile_size: Size::new(tile_width, tile_height),
        columns,
        tile_count,
        spacing: attribute_or(node, "spacing", CONTEXT, 0)?,
        margin: attribute_or(node, "margin", CONTEXT, 0)?,
        tiles,
        properties: parse_properties(node),
        wang_sets,
    })
}

fn parse_tile(t: &Node) -> Result<TileData> {
    let mut tile = TileData::new(attribute(t, "id", "tile")?);

    if let Some(animation) = child(t, "animation") {
        tile.animation = Some(
            children(&animation, "frame")
                .map(|f| {
                    Ok(AnimationFrame {
                        tile_id: attribute(&f, "tileid", "animation frame")?,
                        duration: attribute(&f, "duration", "animation frame")?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        );
    }

    if let Some(group) = child(t, "objectgroup") {
        let shapes = children(&group, "object")
            .map(|obj| parse_collision_object(&obj))
            .collect::<Result<Vec<_>>>()?;
        if !shapes.is_empty() {
            tile.collision = Some(shapes);
        }
    }

    tile.probability = attribute_opt(t, "probability", "tile")?;
    tile.properties = parse_properties(t);
    Ok(tile)
}

fn parse_collision_object(obj: &Node) -> Result<CollisionShape> {
    const CTX: &str = "collision object";
    let x = attribute_or(obj, "x", CTX, 0.0)?;
    let y = attribute_or(obj, "y", CTX, 0.0)?;
    let width = attribute_or(obj, "width", CTX, 0.0)?;
    let height = attribute_or(obj, "height", CTX, 0.0)?;

    if child(obj, "ellipse").is_some() {
        return Ok(CollisionShape::ellipse(x, y, width, height));
    }
    if let Some(polygon) = child(obj, "polygon") {
        let mut points = Vec::new();
        for pair in text_attr(&polygon, "points").split_whitespace() {
            let (px, py) = pair.split_once(',').ok_or_else(|| FormatError::InvalidField {
                context: CTX,
                field: "points".to_string(),
                value: pair.to_string(),
            })?;
            let parse = |v: &str| {
                v.trim().parse::<f64>().map_err(|_| FormatError::InvalidField {
                    context: CTX,
                    field: "points".to_string(),
                    value: pair.to_string(),
                })
            };
            points.push(x + parse(px)?);
            points.push(y + parse(py)?);
        }
        return Ok(CollisionShape::polygon(points));
    }
    Ok(CollisionShape::rect(x, y, width, height))
}

fn parse_wang_set(ws: &Node) -> Result<WangSet> {
    const CTX: &str = "wang set";
    let defaults = WangColor::default();

    let colors = children(ws, "wangcolor")
        .map(|c| {
            Ok(WangColor {
                name: text_attr(&c, "name").to_string(),
                color: c.attribute("color").unwrap_or(&defaults.color).to_string(),
                tile: attribute_or(&c, "tile", CTX, defaults.tile)?,
                probability: attribute_or(&c, "probability", CTX, defaults.probability)?,
                properties: parse_properties(&c),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let wang_tiles = children(ws, "wangtile")
        .map(|wt| {
            let mut wang_id = [0u32; WANG_SLOTS];
            let slots = text_attr(&wt, "wangid").split(',').map(str::trim);
            for (slot, text) in wang_id.iter_mut().zip(slots) {
                *slot = text.parse().unwrap_or(0);
            }
            Ok(WangTile {
                tile_id: attribute(&wt, "tileid", CTX)?,
                wang_id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WangSet {
        name: text_attr(ws, "name").to_string(),
        ty: WangSetType::from_tag(ws.attribute("type").unwrap_or("corner")),
        colors,
        wang_tiles,
        properties: parse_properties(ws),
    })
}

// =============================================================================
// Writing
// =============================================================================

/// Write a standalone `.tsx` document
pub fn write_tsx(tileset: &Tileset) -> String {
    let mut w = XmlWriter::new();
    write_tileset_element(&mut w, tileset, None);
    w.finish()
}

/// Emit a `<tileset>` element; embedded tilesets carry `firstgid`
pub(crate) fn write_tileset_element(w: &mut XmlWriter, tileset: &Tileset, first_gid: Option<u32>) {
    let mut attrs = Vec::new();
    match first_gid {
        Some(first_gid) => attrs.push(("firstgid", first_gid.to_string())),
        None => {
            attrs.push(("version", TILED_FORMAT_VERSION.to_string()));
            attrs.push(("tiledversion", TILED_VERSION.to_string()));
        }
    }
    attrs.push(("name", tileset.name.clone()));
    attrs.push(("tilewidth", tileset.tile_size.width.to_string()));
    attrs.push(("tileheight", tileset.tile_size.height.to_string()));
    if tileset.spacing != 0 {
        attrs.push(("spacing", tileset.spacing.to_string()));
    }
    if tileset.margin != 0 {
        attrs.push(("margin", tileset.margin.to_string()));
    }
    attrs.push(("tilecount", tileset.tile_count.to_string()));
    attrs.push(("columns", tileset.columns.to_string()));

    w.open("tileset", &attrs);
    w.properties(tileset.properties.as_ref());
    w.empty(
        "image",
        &[
            ("source", tileset.image_source.clone()),
            ("width", tileset.image_size.width.to_string()),
            ("height", tileset.image_size.height.to_string()),
        ],
    );
    for tile in tileset.tiles.values().filter(|t| !t.is_empty()) {
        write_tile(w, tile);
    }
    if !tileset.wang_sets.is_empty() {
        w.open("wangsets", &[]);
        for ws in &tileset.wang_sets {
            write_wang_set(w, ws);
        }
        w.close("wangsets");
    }
    w.close("tileset");
}

fn write_tile(w: &mut XmlWriter, tile: &TileData) {
    let mut attrs = vec![("id", tile.local_id.to_string())];
    if let Some(probability) = tile.probability {
        attrs.push(("probability", probability.to_string()));
    }
    w.open("tile", &attrs);
    w.properties(tile.properties.as_ref());

    if let Some(shapes) = &tile.collision {
        w.open("objectgroup", &[("draworder", "index".to_string())]);
        for (i, shape) in shapes.iter().enumerate() {
            write_collision_object(w, i + 1, shape);
        }
        w.close("objectgroup");
    }
    if let Some(frames) = &tile.animation {
        w.open("animation", &[]);
        for frame in frames {
            w.empty(
                "frame",
                &[
                    ("tileid", frame.tile_id.to_string()),
                    ("duration", frame.duration.to_string()),
                ],
            );
        }
        w.close("animation");
    }
    w.close("tile");
}

fn write_collision_object(w: &mut XmlWriter, id: usize, shape: &CollisionShape) {
    let d = |i: usize| number(shape.data.get(i).copied().unwrap_or(0.0));
    match shape.kind {
        CollisionShapeKind::Rect => w.empty(
            "object",
            &[
                ("id", id.to_string()),
                ("x", d(0)),
                ("y", d(1)),
                ("width", d(2)),
                ("height", d(3)),
            ],
        ),
        CollisionShapeKind::Ellipse => {
            w.open(
                "object",
                &[
                    ("id", id.to_string()),
                    ("x", d(0)),
                    ("y", d(1)),
                    ("width", d(2)),
                    ("height", d(3)),
                ],
            );
            w.empty("ellipse", &[]);
            w.close("object");
        }
        CollisionShapeKind::Polygon => {
            // Absolute points, so the object sits at the origin
            let points = shape
                .data
                .chunks_exact(2)
                .map(|p| format!("{},{}", number(p[0]), number(p[1])))
                .collect::<Vec<_>>()
                .join(" ");
            w.open(
                "object",
                &[("id", id.to_string()), ("x", "0".into()), ("y", "0".into())],
            );
            w.empty("polygon", &[("points", points)]);
            w.close("object");
        }
    }
}

fn write_wang_set(w: &mut XmlWriter, ws: &WangSet) {
    w.open(
        "wangset",
        &[
            ("name", ws.name.clone()),
            ("type", ws.ty.as_str().to_string()),
            ("tile", "-1".to_string()),
        ],
    );
    w.properties(ws.properties.as_ref());
    for color in &ws.colors {
        let attrs = [
            ("name", color.name.clone()),
            ("color", color.color.clone()),
            ("tile", color.tile.to_string()),
            ("probability", number(color.probability)),
        ];
        if color.properties.as_ref().is_some_and(|p| !p.is_empty()) {
            w.open("wangcolor", &attrs);
            w.properties(color.properties.as_ref());
            w.close("wangcolor");
        } else {
            w.empty("wangcolor", &attrs);
        }
    }
    for tile in &ws.wang_tiles {
        let wang_id = tile
            .wang_id
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        w.empty(
            "wangtile",
            &[("tileid", tile.tile_id.to_string()), ("wangid", wang_id)],
        );
    }
    w.close("wangset");
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomap_core::{Property, PropertyValue};
    use pretty_assertions::assert_eq;

    const TSX: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.0" name="dungeon" tilewidth="32" tileheight="32" spacing="1" margin="2">
  <image source="dungeon.png" width="132" height="66"/>
  <tile id="1" probability="0.3">
    <properties>
      <property name="kind" value="wall"/>
    </properties>
    <objectgroup draworder="index">
      <object id="1" x="2" y="4">
        <polygon points="0,0 8,0 4,6"/>
      </object>
      <object id="2" x="1" y="1" width="6" height="6">
        <ellipse/>
      </object>
    </objectgroup>
    <animation>
      <frame tileid="1" duration="200"/>
      <frame tileid="2" duration="100"/>
    </animation>
  </tile>
  <wangsets>
    <wangset name="floors" type="edge" tile="-1">
      <wangcolor name="stone" color="#808080" tile="0" probability="1"/>
      <wangtile tileid="0" wangid="1,0,1,0,1,0,1,0"/>
    </wangset>
  </wangsets>
</tileset>
"##;

    #[test]
    fn test_parse_tsx() {
        let mut ids = IdGenerator::with_session("tsx");
        let tileset = parse_tsx(TSX, &mut ids).unwrap();

        assert_eq!(tileset.name, "dungeon");
        assert_eq!((tileset.spacing, tileset.margin), (1, 2));
        assert_eq!(tileset.columns, 4);
        assert_eq!(tileset.tile_count, 8);

        let tile = tileset.tile(1).unwrap();
        assert_eq!(tile.probability, Some(0.3));
        assert_eq!(
            tile.properties.as_ref().unwrap()["kind"].value,
            PropertyValue::String("wall".into())
        );
        let shapes = tile.collision.as_ref().unwrap();
        assert_eq!(
            shapes[0],
            CollisionShape::polygon(vec![2.0, 4.0, 10.0, 4.0, 6.0, 10.0])
        );
        assert_eq!(shapes[1], CollisionShape::ellipse(1.0, 1.0, 6.0, 6.0));
        assert_eq!(tile.animation.as_ref().unwrap().len(), 2);

        let ws = &tileset.wang_sets[0];
        assert_eq!(ws.ty, WangSetType::Edge);
        assert_eq!(ws.colors[0].color, "#808080");
        assert_eq!(ws.wang_tiles[0].wang_id, [1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_derived_tile_count_saturates() {
        let mut ids = IdGenerator::with_session("tsx");
        let xml = r#"<tileset name="huge" tilewidth="1" tileheight="1" columns="100000">
  <image source="huge.png" width="100000" height="100000"/>
</tileset>"#;
        let tileset = parse_tsx(xml, &mut ids).unwrap();
        assert_eq!(tileset.tile_count, u32::MAX);
    }

    #[test]
    fn test_missing_root() {
        let mut ids = IdGenerator::with_session("tsx");
        let err = parse_tsx("<map/>", &mut ids).unwrap_err();
        assert_eq!(err.to_string(), "Invalid TSX: no <tileset> root element");
    }

    #[test]
    fn test_malformed_xml() {
        let mut ids = IdGenerator::with_session("tsx");
        assert!(matches!(
            parse_tsx("<tileset", &mut ids),
            Err(FormatError::Xml(_))
        ));
    }

    #[test]
    fn test_writer_omits_zero_spacing() {
        let mut ids = IdGenerator::with_session("tsx");
        let mut tileset = parse_tsx(TSX, &mut ids).unwrap();
        tileset.spacing = 0;
        tileset.margin = 0;
        let xml = write_tsx(&tileset);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tileset version=\"1.10\""));
        assert!(!xml.contains("spacing="));
        assert!(!xml.contains("margin="));
        assert!(xml.contains("<image source=\"dungeon.png\" width=\"132\" height=\"66\"/>"));
    }

    #[test]
    fn test_write_then_parse_preserves_tileset() {
        let mut ids = IdGenerator::with_session("tsx");
        let mut original = parse_tsx(TSX, &mut ids).unwrap();
        original.wang_sets[0].colors[0].properties = Some(
            [("speed".to_string(), Property::float("speed", 0.75))]
                .into_iter()
                .collect(),
        );

        let mut reparsed = parse_tsx(&write_tsx(&original), &mut ids).unwrap();
        reparsed.id = original.id.clone();
        assert_eq!(reparsed, original);
    }
}
