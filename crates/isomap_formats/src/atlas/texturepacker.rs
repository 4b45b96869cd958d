use super::{meta, meta_image, meta_size, parse_frames, AtlasData};
use crate::error::Result;
use isomap_core::Point;
use serde_json::Value;

/// Parse a TexturePacker JSON export (array or hash flavour)
pub fn parse_texture_packer(json: &Value) -> Result<AtlasData> {
    let meta = meta(json);
    let mut frames = parse_frames(json)?;
    for frame in &mut frames {
        frame.pivot.get_or_insert(Point::new(0.5, 0.5));
    }

    Ok(AtlasData {
        image: meta_image(meta),
        image_size: meta_size(meta)?,
        frames,
        tags: Vec::new(),
        slices: Vec::new(),
        scale: parse_scale(meta.get("scale")),
    })
}

/// `meta.scale` is usually a string such as `"0.5"`
fn parse_scale(value: Option<&Value>) -> f64 {
    let scale = match value {
        None | Some(Value::Null) => Some(1.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    scale.unwrap_or_else(|| {
        tracing::debug!("Unreadable atlas scale {:?}, using 1", value);
        1.0
    })
}
