//! Error types for format parsing and writing

use std::io;
use thiserror::Error;

/// Result type alias for format operations
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors raised while decoding or encoding Tiled documents and tile data
#[derive(Error, Debug)]
pub enum FormatError {
    /// Tile data `encoding` tag other than csv/base64
    #[error("Unsupported tile data encoding: {0}")]
    UnsupportedEncoding(String),

    /// Tile data `compression` tag other than zlib/gzip
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    /// Decoded binary payload is not a whole number of 32-bit cells
    #[error("Invalid tile data byte length: {0} (must be multiple of 4)")]
    InvalidByteLength(usize),

    #[error("CSV tile data length mismatch: expected {expected}, got {actual}")]
    CsvLengthMismatch { expected: usize, actual: usize },

    #[error("Tile data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid tile value in CSV data: {0}")]
    InvalidTileValue(String),

    #[error("Invalid base64 tile data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Compression stream failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid TMX: no <map> root element")]
    MissingMapRoot,

    #[error("Invalid TSX: no <tileset> root element")]
    MissingTilesetRoot,

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field or attribute is absent
    #[error("Missing required field '{field}' in {context}")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },

    /// A field is present but has the wrong type or an unparseable value
    #[error("Invalid value '{value}' for '{field}' in {context}")]
    InvalidField {
        context: &'static str,
        field: String,
        value: String,
    },

    /// An external tileset is referenced but no resolver was supplied
    #[error("External tileset \"{0}\" requires a resolver")]
    UnresolvedSource(String),

    /// The resolver failed to produce an external document
    #[error("Failed to resolve \"{path}\": {message}")]
    Resolve { path: String, message: String },

    /// Model construction rejected decoded values
    #[error(transparent)]
    Model(#[from] isomap_core::ModelError),

    /// Atlas document without a usable frame list
    #[error("Invalid atlas: {0}")]
    InvalidAtlas(String),
}

impl FormatError {
    /// Convenience constructor for resolver implementations
    pub fn resolve(path: impl Into<String>, message: impl ToString) -> Self {
        FormatError::Resolve {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Errors raised while validating and decoding a native project document
#[derive(Error, Debug)]
pub enum NativeError {
    #[error("Invalid project data: expected an object")]
    NotAnObject,

    #[error("Not an isomap project file (missing format marker)")]
    MissingFormatMarker,

    #[error("Invalid project data: missing schema version")]
    MissingVersion,

    #[error("Project version {version} is newer than supported version {supported}")]
    UnsupportedVersion { version: u64, supported: u32 },

    #[error("Invalid project data: missing tilesets array")]
    MissingTilesets,

    #[error("Invalid project data: missing maps array")]
    MissingMaps,

    #[error("Invalid tile layer \"{name}\": width must be a positive number")]
    InvalidLayerWidth { name: String },

    #[error("Invalid tile layer \"{name}\": height must be a positive number")]
    InvalidLayerHeight { name: String },

    #[error("Invalid tile layer \"{name}\": missing data array")]
    MissingLayerData { name: String },

    /// `data` does not hold exactly `width * height` cells
    #[error("Tile data length mismatch: expected {expected}, got {actual}")]
    LayerDataLength { expected: usize, actual: usize },

    #[error("Unknown layer type: {0}")]
    UnknownLayerType(String),

    /// Structurally valid document whose fields do not match the model
    #[error("Invalid project data: {0}")]
    Malformed(#[from] serde_json::Error),
}
