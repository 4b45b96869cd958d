//! Turning imported sprite atlases into tilesets

use isomap_core::{
    insert_property, AnimationFrame, IdGenerator, Property, PropertyBag, Size, TileData, Tileset,
    TilesetOptions,
};
use isomap_formats::atlas::{AtlasData, DEFAULT_FRAME_DURATION};
use std::path::Path;

/// Tile size used when an atlas has no frames
pub const DEFAULT_ATLAS_TILE_SIZE: Size = Size::new(32, 32);

/// Name given to atlases whose image has no usable file stem
pub const DEFAULT_ATLAS_NAME: &str = "Atlas";

/// Property carrying a frame tag's name on its animated tile
pub const ANIMATION_NAME_PROPERTY: &str = "animationName";

/// Tile size from the first frame's untrimmed size
pub fn infer_tile_size(atlas: &AtlasData) -> Size {
    atlas
        .frames
        .first()
        .map(|frame| Size::new(frame.source_size.w, frame.source_size.h))
        .filter(|size| size.width > 0 && size.height > 0)
        .unwrap_or(DEFAULT_ATLAS_TILE_SIZE)
}

/// Build a tileset over the atlas image.
///
/// `image_source` is where the editor stored the image; `image_size` its
/// pixel size. Each frame tag becomes an animation on the tile at its first
/// frame, clipped to the tileset.
pub fn atlas_to_tileset(
    ids: &mut IdGenerator,
    atlas: &AtlasData,
    image_source: impl Into<String>,
    image_size: Size,
    tile_size_override: Option<Size>,
) -> Tileset {
    let tile_size = tile_size_override.unwrap_or_else(|| infer_tile_size(atlas));
    let name = Path::new(&atlas.image)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_ATLAS_NAME)
        .to_string();

    let mut tileset = Tileset::new(
        ids,
        TilesetOptions {
            name,
            image_source: image_source.into(),
            image_size,
            tile_size,
            ..Default::default()
        },
    );

    for tag in &atlas.tags {
        if tag.from >= tileset.tile_count {
            tracing::debug!(
                "Skipping frame tag {} starting past the last tile ({} >= {})",
                tag.name,
                tag.from,
                tileset.tile_count
            );
            continue;
        }
        let last = tag.to.min(tileset.tile_count - 1);
        let animation = (tag.from..=last)
            .map(|tile_id| AnimationFrame {
                tile_id,
                duration: atlas
                    .frames
                    .get(tile_id as usize)
                    .and_then(|frame| frame.duration)
                    .unwrap_or(DEFAULT_FRAME_DURATION),
            })
            .collect();

        let mut properties = PropertyBag::new();
        insert_property(
            &mut properties,
            Property::string(ANIMATION_NAME_PROPERTY, tag.name.clone()),
        );
        tileset.tiles.insert(
            tag.from,
            TileData {
                animation: Some(animation),
                properties: Some(properties),
                ..TileData::new(tag.from)
            },
        );
    }

    tileset
}
