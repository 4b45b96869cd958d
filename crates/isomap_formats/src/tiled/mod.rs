//! Tiled map and tileset transcoders.
//!
//! Two document families are supported:
//! - JSON (`.tmj` maps, `.tsj` tilesets) read from a `serde_json::Value` tree
//! - XML (`.tmx` maps, `.tsx` tilesets) read with `roxmltree`
//!
//! External tileset references are never loaded from disk here. Callers hand
//! in a resolver closure that turns a `source` path into a document.

pub(crate) mod json;
pub mod tmj;
pub mod tmx;
pub mod tsj;
pub mod tsx;
pub(crate) mod xml;

use crate::compression::{TileCompression, TileEncoding};
use crate::error::Result;
use serde_json::Value;

/// Format version written into every document
pub const TILED_FORMAT_VERSION: &str = "1.10";
/// Tiled release written into every document
pub const TILED_VERSION: &str = "1.10.0";

/// Name given to maps whose document carries none
pub const IMPORTED_MAP_NAME: &str = "Imported Map";

/// Resolves an external JSON tileset `source` to its parsed document
pub type JsonResolver<'a> = dyn FnMut(&str) -> Result<Value> + 'a;

/// Resolves an external XML tileset `source` to its document text
pub type XmlResolver<'a> = dyn FnMut(&str) -> Result<String> + 'a;

/// How tile layer payloads are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileDataFormat {
    pub encoding: TileEncoding,
    /// Only meaningful for base64
    pub compression: Option<TileCompression>,
}

impl TileDataFormat {
    pub const CSV: TileDataFormat = TileDataFormat {
        encoding: TileEncoding::Csv,
        compression: None,
    };

    pub fn base64(compression: Option<TileCompression>) -> Self {
        Self {
            encoding: TileEncoding::Base64,
            compression,
        }
    }

    /// Compression tag to write, if any
    pub(crate) fn compression_tag(&self) -> Option<&'static str> {
        match self.encoding {
            TileEncoding::Csv => None,
            TileEncoding::Base64 => self.compression.as_ref().map(TileCompression::as_str),
        }
    }
}

/// Sequential Tiled ids for layers and objects handed out while writing
#[derive(Debug)]
pub(crate) struct Numbering {
    next_layer: u32,
    next_object: u32,
}

impl Numbering {
    pub(crate) fn new() -> Self {
        Self {
            next_layer: 1,
            next_object: 1,
        }
    }

    pub(crate) fn layer(&mut self) -> u32 {
        let id = self.next_layer;
        self.next_layer += 1;
        id
    }

    pub(crate) fn object(&mut self) -> u32 {
        let id = self.next_object;
        self.next_object += 1;
        id
    }

    pub(crate) fn next_layer_id(&self) -> u32 {
        self.next_layer
    }

    pub(crate) fn next_object_id(&self) -> u32 {
        self.next_object
    }
}

/// Map name from a `class` attribute, or a `type` that is not the literal "map"
pub(crate) fn map_name(class: Option<&str>, ty: Option<&str>) -> String {
    class
        .filter(|c| !c.is_empty())
        .or_else(|| ty.filter(|t| !t.is_empty() && *t != "map"))
        .unwrap_or(IMPORTED_MAP_NAME)
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_name_precedence() {
        assert_eq!(map_name(Some("Town"), Some("map")), "Town");
        assert_eq!(map_name(None, Some("map")), "Imported Map");
        assert_eq!(map_name(None, Some("dungeon")), "dungeon");
        assert_eq!(map_name(Some(""), None), "Imported Map");
    }

    #[test]
    fn test_compression_tag_only_for_base64() {
        assert_eq!(TileDataFormat::CSV.compression_tag(), None);
        let format = TileDataFormat {
            encoding: TileEncoding::Csv,
            compression: Some(TileCompression::Zlib),
        };
        assert_eq!(format.compression_tag(), None);
        assert_eq!(
            TileDataFormat::base64(Some(TileCompression::Gzip)).compression_tag(),
            Some("gzip")
        );
    }

    #[test]
    fn test_numbering_is_sequential() {
        let mut numbering = Numbering::new();
        assert_eq!(numbering.layer(), 1);
        assert_eq!(numbering.layer(), 2);
        assert_eq!(numbering.object(), 1);
        assert_eq!(numbering.next_layer_id(), 3);
        assert_eq!(numbering.next_object_id(), 2);
    }
}
