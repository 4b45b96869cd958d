//! Interchange formats for isomap
//!
//! - Tile data codecs (CSV, base64 with optional zlib/gzip)
//! - GID resolution and remapping between tileset layouts
//! - Tiled TMX/TSX (XML) and TMJ/TSJ (JSON) readers and writers
//! - The native `isomap-project` JSON format
//! - Aseprite and TexturePacker sprite atlas readers
//! - Import format detection

pub mod atlas;
pub mod compression;
pub mod detect;
mod error;
pub mod gid;
pub mod native;
pub mod tiled;

pub use atlas::{
    parse_aseprite, parse_texture_packer, AnimationDirection, AtlasData, AtlasFrame, AtlasRect,
    AtlasSize, FrameTag, Slice, SliceKey,
};
pub use compression::{decode_tile_data, encode_tile_data, TileCompression, TileEncoding};
pub use detect::{detect_format, ImportFormat};
pub use error::{FormatError, NativeError, Result};
pub use gid::{remap_tile_data, resolve_gid, ResolvedGid};
pub use native::{
    deserialize_project, deserialize_project_from_str, serialize_project,
    serialize_project_to_string, FORMAT_MAGIC, SCHEMA_VERSION,
};
pub use tiled::tmj::{parse_tmj, write_tmj, write_tmj_string, write_tmj_with};
pub use tiled::tmx::{parse_tmx, write_tmx, write_tmx_with};
pub use tiled::tsj::{parse_tsj, write_tsj, write_tsj_string};
pub use tiled::tsx::{parse_tsx, write_tsx};
pub use tiled::{JsonResolver, TileDataFormat, XmlResolver};
