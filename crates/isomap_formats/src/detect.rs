//! Guessing what kind of document a dropped or opened file is

use crate::native::FORMAT_MAGIC;
use serde_json::Value;
use std::path::Path;

/// File kinds the editor knows how to import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportFormat {
    NativeProject,
    TiledMapXml,
    TiledMapJson,
    TiledTilesetXml,
    TiledTilesetJson,
    Aseprite,
    TexturePacker,
    Image,
    Unknown,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Detect a file's format from its name, sniffing `.json` content.
pub fn detect_format(filename: &str, content: &str) -> ImportFormat {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "tmx" => ImportFormat::TiledMapXml,
        "tsx" => ImportFormat::TiledTilesetXml,
        "tmj" => ImportFormat::TiledMapJson,
        "tsj" => ImportFormat::TiledTilesetJson,
        "json" => match serde_json::from_str::<Value>(content) {
            Ok(json) => sniff_json(&json),
            Err(e) => {
                tracing::debug!("Could not parse {} as JSON: {}", filename, e);
                ImportFormat::Unknown
            }
        },
        ext if IMAGE_EXTENSIONS.contains(&ext) => ImportFormat::Image,
        _ => ImportFormat::Unknown,
    }
}

fn sniff_json(json: &Value) -> ImportFormat {
    if json.get("_format").and_then(Value::as_str) == Some(FORMAT_MAGIC) {
        return ImportFormat::NativeProject;
    }

    let app = json
        .get("meta")
        .and_then(|meta| meta.get("app"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if app.contains("Aseprite") || app.contains("aseprite") {
        return ImportFormat::Aseprite;
    }
    if app.contains("Texture") || app.contains("texturepacker") {
        return ImportFormat::TexturePacker;
    }

    let has_layers = json.get("layers").is_some();
    if json.get("tilewidth").is_some() && !has_layers {
        ImportFormat::TiledTilesetJson
    } else if has_layers {
        ImportFormat::TiledMapJson
    } else {
        ImportFormat::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("level.tmx", ImportFormat::TiledMapXml ; "tmx")]
    #[test_case("tiles.TSX", ImportFormat::TiledTilesetXml ; "uppercase tsx")]
    #[test_case("level.tmj", ImportFormat::TiledMapJson ; "tmj")]
    #[test_case("tiles.tsj", ImportFormat::TiledTilesetJson ; "tsj")]
    #[test_case("hero.png", ImportFormat::Image ; "png")]
    #[test_case("photo.jpeg", ImportFormat::Image ; "jpeg")]
    #[test_case("notes.txt", ImportFormat::Unknown ; "unknown extension")]
    #[test_case("Makefile", ImportFormat::Unknown ; "no extension")]
    fn test_detect_by_extension(name: &str, expected: ImportFormat) {
        assert_eq!(detect_format(name, ""), expected);
    }

    #[test_case(r#"{"_format":"isomap-project","_version":1}"#, ImportFormat::NativeProject ; "native")]
    #[test_case(r#"{"frames":{},"meta":{"app":"https://www.aseprite.org/"}}"#, ImportFormat::Aseprite ; "aseprite")]
    #[test_case(r#"{"frames":[],"meta":{"app":"https://www.codeandweb.com/texturepacker"}}"#, ImportFormat::TexturePacker ; "texturepacker")]
    #[test_case(r#"{"meta":{"app":"TexturePacker"}}"#, ImportFormat::TexturePacker ; "texturepacker name")]
    #[test_case(r#"{"tilewidth":32,"tileheight":32,"image":"a.png"}"#, ImportFormat::TiledTilesetJson ; "tileset")]
    #[test_case(r#"{"tilewidth":32,"layers":[]}"#, ImportFormat::TiledMapJson ; "map")]
    #[test_case(r#"{"hello":"world"}"#, ImportFormat::Unknown ; "unrelated object")]
    #[test_case("not json at all", ImportFormat::Unknown ; "unparseable")]
    fn test_detect_json_by_content(content: &str, expected: ImportFormat) {
        assert_eq!(detect_format("data.json", content), expected);
    }
}
