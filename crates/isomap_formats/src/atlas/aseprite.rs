use super::{meta, meta_image, meta_size, parse_frames, AtlasData, FrameTag, Slice};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;

/// Default frame duration in milliseconds
pub const DEFAULT_FRAME_DURATION: u32 = 100;

/// Parse an Aseprite JSON export (`--format json-array` or `json-hash`)
pub fn parse_aseprite(json: &Value) -> Result<AtlasData> {
    let meta = meta(json);
    let mut frames = parse_frames(json)?;
    for frame in &mut frames {
        frame.duration.get_or_insert(DEFAULT_FRAME_DURATION);
    }

    let tags = match meta.get("frameTags") {
        Some(tags) => Vec::<FrameTag>::deserialize(tags)?,
        None => Vec::new(),
    };
    let slices = match meta.get("slices") {
        Some(slices) => Vec::<Slice>::deserialize(slices)?,
        None => Vec::new(),
    };

    Ok(AtlasData {
        image: meta_image(meta),
        image_size: meta_size(meta)?,
        frames,
        tags,
        slices,
        scale: 1.0,
    })
}
