//! Tile data encoding: CSV text or little-endian u32 cells in base64,
//! optionally zlib or gzip compressed.

use crate::error::{FormatError, Result};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::fmt;
use std::io::{Read, Write};

/// Textual encoding of a tile data payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TileEncoding {
    #[default]
    Csv,
    Base64,
}

impl TileEncoding {
    /// Parse an `encoding` tag. A missing tag means CSV.
    pub fn from_tag(tag: Option<&str>) -> Result<Self> {
        match tag {
            None | Some("csv") => Ok(TileEncoding::Csv),
            Some("base64") => Ok(TileEncoding::Base64),
            Some(other) => Err(FormatError::UnsupportedEncoding(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileEncoding::Csv => "csv",
            TileEncoding::Base64 => "base64",
        }
    }
}

impl fmt::Display for TileEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression applied to base64 payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileCompression {
    Zlib,
    Gzip,
}

impl TileCompression {
    /// Parse a `compression` tag. A missing or empty tag means uncompressed.
    pub fn from_tag(tag: Option<&str>) -> Result<Option<Self>> {
        match tag {
            None | Some("") => Ok(None),
            Some("zlib") => Ok(Some(TileCompression::Zlib)),
            Some("gzip") => Ok(Some(TileCompression::Gzip)),
            Some(other) => Err(FormatError::UnsupportedCompression(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileCompression::Zlib => "zlib",
            TileCompression::Gzip => "gzip",
        }
    }
}

impl fmt::Display for TileCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode tile data from its tagged textual form.
///
/// `expected_len`, when given, must equal the number of decoded cells.
pub fn decode_tile_data(
    text: &str,
    encoding: Option<&str>,
    compression: Option<&str>,
    expected_len: Option<usize>,
) -> Result<Vec<u32>> {
    match TileEncoding::from_tag(encoding)? {
        TileEncoding::Csv => decode_csv(text, expected_len),
        TileEncoding::Base64 => {
            let compression = TileCompression::from_tag(compression)?;
            decode_base64(text, compression, expected_len)
        }
    }
}

/// Encode tile data into its tagged textual form
pub fn encode_tile_data(
    data: &[u32],
    encoding: Option<&str>,
    compression: Option<&str>,
) -> Result<String> {
    match TileEncoding::from_tag(encoding)? {
        TileEncoding::Csv => Ok(encode_csv(data)),
        TileEncoding::Base64 => {
            let compression = TileCompression::from_tag(compression)?;
            encode_base64(data, compression)
        }
    }
}

/// Parse comma separated cells, tolerating whitespace and newlines
pub fn decode_csv(text: &str, expected_len: Option<usize>) -> Result<Vec<u32>> {
    let values = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_cell)
        .collect::<Result<Vec<u32>>>()?;

    if let Some(expected) = expected_len {
        if values.len() != expected {
            return Err(FormatError::CsvLengthMismatch {
                expected,
                actual: values.len(),
            });
        }
    }
    Ok(values)
}

/// Cells are unsigned; negative values wrap the way 32-bit tools write them
fn parse_cell(text: &str) -> Result<u32> {
    text.parse::<u32>()
        .or_else(|_| text.parse::<i64>().map(|v| v as u32))
        .map_err(|_| FormatError::InvalidTileValue(text.to_string()))
}

pub fn encode_csv(data: &[u32]) -> String {
    data.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode base64 → optional decompression → little-endian u32 cells
pub fn decode_base64(
    text: &str,
    compression: Option<TileCompression>,
    expected_len: Option<usize>,
) -> Result<Vec<u32>> {
    let raw = BASE64_STANDARD.decode(text.trim())?;
    let bytes = match compression {
        None => raw,
        Some(TileCompression::Zlib) => {
            let mut out = Vec::new();
            ZlibDecoder::new(raw.as_slice()).read_to_end(&mut out)?;
            out
        }
        Some(TileCompression::Gzip) => {
            let mut out = Vec::new();
            GzDecoder::new(raw.as_slice()).read_to_end(&mut out)?;
            out
        }
    };

    if bytes.len() % 4 != 0 {
        return Err(FormatError::InvalidByteLength(bytes.len()));
    }

    let cells: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if let Some(expected) = expected_len {
        if cells.len() != expected {
            return Err(FormatError::LengthMismatch {
                expected,
                actual: cells.len(),
            });
        }
    }
    Ok(cells)
}

/// Little-endian u32 cells → optional compression → base64
pub fn encode_base64(data: &[u32], compression: Option<TileCompression>) -> Result<String> {
    let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();

    let output = match compression {
        None => bytes,
        Some(TileCompression::Zlib) => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()?
        }
        Some(TileCompression::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()?
        }
    };

    Ok(BASE64_STANDARD.encode(output))
}
