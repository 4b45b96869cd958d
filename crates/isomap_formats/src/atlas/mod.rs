//! Sprite atlas descriptions exported by Aseprite and TexturePacker

mod aseprite;
mod texturepacker;

pub use aseprite::{parse_aseprite, DEFAULT_FRAME_DURATION};
pub use texturepacker::parse_texture_packer;

use crate::error::{FormatError, Result};
use isomap_core::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pixel rectangle inside an atlas image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSize {
    pub w: u32,
    pub h: u32,
}

/// One packed sprite
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasFrame {
    /// Position in the frame list
    pub index: usize,
    pub filename: String,
    pub frame: AtlasRect,
    pub rotated: bool,
    pub trimmed: bool,
    /// Trimmed area inside the untrimmed sprite
    pub sprite_source_size: AtlasRect,
    /// Untrimmed sprite size
    pub source_size: AtlasSize,
    /// Display time in milliseconds (Aseprite only)
    pub duration: Option<u32>,
    /// Normalized anchor (TexturePacker only)
    pub pivot: Option<Point>,
}

/// Playback direction of a frame tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationDirection {
    #[default]
    #[serde(rename = "forward")]
    Forward,
    #[serde(rename = "reverse")]
    Reverse,
    #[serde(rename = "pingpong")]
    PingPong,
    #[serde(rename = "pingpong_reverse")]
    PingPongReverse,
}

/// Named frame range `from..=to`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrameTag {
    pub name: String,
    pub from: u32,
    pub to: u32,
    #[serde(default)]
    pub direction: AnimationDirection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SliceKey {
    pub frame: u32,
    pub bounds: AtlasRect,
    #[serde(default)]
    pub pivot: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Slice {
    pub name: String,
    #[serde(default = "default_slice_color")]
    pub color: String,
    #[serde(default)]
    pub keys: Vec<SliceKey>,
}

fn default_slice_color() -> String {
    "#0000ffff".to_string()
}

/// A parsed atlas document
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasData {
    pub image: String,
    pub image_size: AtlasSize,
    pub frames: Vec<AtlasFrame>,
    pub tags: Vec<FrameTag>,
    pub slices: Vec<Slice>,
    pub scale: f64,
}

/// Frame entry as written by both exporters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    #[serde(default)]
    filename: Option<String>,
    frame: AtlasRect,
    #[serde(default)]
    rotated: bool,
    #[serde(default)]
    trimmed: bool,
    #[serde(default)]
    sprite_source_size: Option<AtlasRect>,
    #[serde(default)]
    source_size: Option<AtlasSize>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    pivot: Option<Point>,
}

impl RawFrame {
    fn into_frame(self, index: usize, filename: String) -> AtlasFrame {
        let frame = self.frame;
        AtlasFrame {
            index,
            filename,
            frame,
            rotated: self.rotated,
            trimmed: self.trimmed,
            sprite_source_size: self.sprite_source_size.unwrap_or(AtlasRect {
                x: 0,
                y: 0,
                w: frame.w,
                h: frame.h,
            }),
            source_size: self.source_size.unwrap_or(AtlasSize {
                w: frame.w,
                h: frame.h,
            }),
            duration: self.duration,
            pivot: self.pivot,
        }
    }
}

/// Read `frames` in either list form or filename-keyed hash form.
///
/// Hash entries keep document order so frame indices match the exporter's.
fn parse_frames(json: &Value) -> Result<Vec<AtlasFrame>> {
    match json.get("frames") {
        Some(Value::Array(list)) => list
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let raw = RawFrame::deserialize(entry)?;
                let filename = raw.filename.clone().unwrap_or_default();
                Ok(raw.into_frame(index, filename))
            })
            .collect(),
        Some(Value::Object(hash)) => hash
            .iter()
            .enumerate()
            .map(|(index, (filename, entry))| {
                let raw = RawFrame::deserialize(entry)?;
                Ok(raw.into_frame(index, filename.clone()))
            })
            .collect(),
        Some(other) => Err(FormatError::InvalidAtlas(format!(
            "frames must be an array or object, got {other}"
        ))),
        None => Err(FormatError::InvalidAtlas("missing frames".to_string())),
    }
}

/// The `meta` object, or an empty one
fn meta(json: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    json.get("meta").unwrap_or(&EMPTY)
}

fn meta_image(meta: &Value) -> String {
    meta.get("image")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn meta_size(meta: &Value) -> Result<AtlasSize> {
    match meta.get("size") {
        Some(size) => Ok(AtlasSize::deserialize(size)?),
        None => Ok(AtlasSize::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_defaults_from_frame_rect() {
        let doc = json!({ "frames": [ { "frame": { "x": 4, "y": 8, "w": 16, "h": 24 } } ] });
        let frames = parse_frames(&doc).unwrap();
        let f = &frames[0];
        assert_eq!(f.filename, "");
        assert!(!f.rotated && !f.trimmed);
        assert_eq!(f.sprite_source_size, AtlasRect { x: 0, y: 0, w: 16, h: 24 });
        assert_eq!(f.source_size, AtlasSize { w: 16, h: 24 });
        assert_eq!(f.duration, None);
    }

    #[test]
    fn test_hash_frames_keep_document_order() {
        let doc = json!({ "frames": {
            "zeta.png": { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 } },
            "alpha.png": { "frame": { "x": 8, "y": 0, "w": 8, "h": 8 } }
        }});
        let frames = parse_frames(&doc).unwrap();
        assert_eq!(frames[0].filename, "zeta.png");
        assert_eq!(frames[1].index, 1);
    }

    #[test]
    fn test_missing_frames() {
        let err = parse_frames(&json!({ "meta": {} })).unwrap_err();
        assert_eq!(err.to_string(), "Invalid atlas: missing frames");
    }
}
