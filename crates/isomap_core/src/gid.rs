//! Global tile id (GID) encoding
//!
//! A raw cell value packs a 29-bit tile id in the low bits and three flip
//! flags in the top bits, using the same bit positions as Tiled.

use serde::{Deserialize, Serialize};

/// Bit flag for horizontal flip (mirror on Y axis)
pub const FLIP_HORIZONTAL: u32 = 0x8000_0000;
/// Bit flag for vertical flip (mirror on X axis)
pub const FLIP_VERTICAL: u32 = 0x4000_0000;
/// Bit flag for diagonal flip (anti-diagonal transpose, combined with H/V for rotations)
pub const FLIP_DIAGONAL: u32 = 0x2000_0000;
/// Mask to extract just the tile id (without flip flags)
pub const GID_MASK: u32 = 0x1FFF_FFFF;
/// Mask for all flip flags
pub const FLAG_MASK: u32 = FLIP_HORIZONTAL | FLIP_VERTICAL | FLIP_DIAGONAL;

/// The three flip flags carried by a raw cell value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlipFlags {
    pub horizontal: bool,
    pub vertical: bool,
    pub diagonal: bool,
}

impl FlipFlags {
    /// No flips
    pub const NONE: FlipFlags = FlipFlags {
        horizontal: false,
        vertical: false,
        diagonal: false,
    };

    /// Only the horizontal flip set
    pub const fn horizontal() -> Self {
        FlipFlags {
            horizontal: true,
            vertical: false,
            diagonal: false,
        }
    }

    /// Only the vertical flip set
    pub const fn vertical() -> Self {
        FlipFlags {
            horizontal: false,
            vertical: true,
            diagonal: false,
        }
    }

    /// Only the diagonal flip set
    pub const fn diagonal() -> Self {
        FlipFlags {
            horizontal: false,
            vertical: false,
            diagonal: true,
        }
    }

    /// Pack these flags into their bit positions
    pub const fn bits(self) -> u32 {
        let mut bits = 0;
        if self.horizontal {
            bits |= FLIP_HORIZONTAL;
        }
        if self.vertical {
            bits |= FLIP_VERTICAL;
        }
        if self.diagonal {
            bits |= FLIP_DIAGONAL;
        }
        bits
    }

    pub const fn is_empty(self) -> bool {
        !(self.horizontal || self.vertical || self.diagonal)
    }
}

/// Extract the tile id from a raw cell value (strips flip flags)
#[inline]
pub fn extract_gid(raw: u32) -> u32 {
    raw & GID_MASK
}

/// Read the flip flags from a raw cell value
#[inline]
pub fn extract_flip_flags(raw: u32) -> FlipFlags {
    FlipFlags {
        horizontal: raw & FLIP_HORIZONTAL != 0,
        vertical: raw & FLIP_VERTICAL != 0,
        diagonal: raw & FLIP_DIAGONAL != 0,
    }
}

/// Build a raw cell value from a tile id and flip flags.
///
/// Bits of `gid` above the 29-bit id range are discarded.
#[inline]
pub fn compose_gid(gid: u32, flags: FlipFlags) -> u32 {
    (gid & GID_MASK) | flags.bits()
}

/// Toggle horizontal flip on a raw cell value
#[inline]
pub fn toggle_flip_horizontal(raw: u32) -> u32 {
    raw ^ FLIP_HORIZONTAL
}

/// Toggle vertical flip on a raw cell value
#[inline]
pub fn toggle_flip_vertical(raw: u32) -> u32 {
    raw ^ FLIP_VERTICAL
}
