//! Validation errors raised by the model factories

use thiserror::Error;

/// Errors that can occur when constructing model values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid map dimensions: {width}x{height} (must be positive)")]
    InvalidMapDimensions { width: u32, height: u32 },

    #[error("Invalid tile dimensions: {width}x{height} (must be positive)")]
    InvalidTileDimensions { width: u32, height: u32 },

    #[error("Invalid tile layer dimensions: {width}x{height} (must be positive)")]
    InvalidTileLayerDimensions { width: u32, height: u32 },
}

/// Result type for model construction
pub type Result<T> = std::result::Result<T, ModelError>;
