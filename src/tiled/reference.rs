//! # Tile References
//!
//! Tile layer data stores one 32-bit global tile id per map cell. The top four
//! bits are flags:
//!
//! | bit | meaning                                   |
//! |-----|-------------------------------------------|
//! | 31  | flipped horizontally                      |
//! | 30  | flipped vertically                        |
//! | 29  | flipped diagonally (folded into H and V)  |
//! | 28  | rotated 120 degrees (kept as-is)          |
//!
//! Gid 0 is an empty cell.
//!
//! The diagonal flag is approximated as a flip on both axes. That matches the
//! rendering of a diagonal flip only for cells that are symmetric about their
//! diagonal, so every occurrence is reported to the caller.

use crate::error::{MinimiseError, Result};
use crate::graphics::tiles::{CanonicalSet, Transform};

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
pub const ROTATED_HEXAGONAL_120: u32 = 0x1000_0000;
pub const ALL_FLAGS: u32 =
    FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY | ROTATED_HEXAGONAL_120;

/// Flip state carried by a reference, as a transform of the stored tile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipFlags {
    pub horizontal: bool,
    pub vertical: bool,
}

impl FlipFlags {
    pub const NONE: FlipFlags = FlipFlags {
        horizontal: false,
        vertical: false,
    };

    pub fn as_transform(self) -> Transform {
        Transform::from_flips(self.horizontal, self.vertical)
    }

    pub fn implied_by(transform: Transform) -> Self {
        let (horizontal, vertical) = transform.flips();
        FlipFlags {
            horizontal,
            vertical,
        }
    }

    pub fn xor(self, other: FlipFlags) -> FlipFlags {
        FlipFlags {
            horizontal: self.horizontal ^ other.horizontal,
            vertical: self.vertical ^ other.vertical,
        }
    }

    fn bits(self) -> u32 {
        let mut bits = 0;
        if self.horizontal {
            bits |= FLIPPED_HORIZONTALLY;
        }
        if self.vertical {
            bits |= FLIPPED_VERTICALLY;
        }
        bits
    }
}

/// A raw layer data value split into its parts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedReference {
    pub gid: u32,
    /// Horizontal and vertical flips, with the diagonal flag already folded in
    pub flags: FlipFlags,
    pub diagonal: bool,
    pub rotated: bool,
}

impl DecodedReference {
    pub fn decode(raw: u32) -> Self {
        let diagonal = raw & FLIPPED_DIAGONALLY != 0;
        let flags = FlipFlags {
            horizontal: (raw & FLIPPED_HORIZONTALLY != 0) ^ diagonal,
            vertical: (raw & FLIPPED_VERTICALLY != 0) ^ diagonal,
        };
        DecodedReference {
            gid: raw & !ALL_FLAGS,
            flags,
            diagonal,
            rotated: raw & ROTATED_HEXAGONAL_120 != 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gid == 0
    }
}

/// Global gid of a raw layer value, flags stripped
pub fn gid_of(raw: u32) -> u32 {
    raw & !ALL_FLAGS
}

/// Result of rewriting one layer value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemappedReference {
    pub value: u32,
    /// The diagonal flag was approximated as a flip on both axes
    pub diagonal_folded: bool,
    /// The rotation flag was set and has been carried over unchanged
    pub rotation_kept: bool,
}

impl RemappedReference {
    fn unchanged(value: u32) -> Self {
        RemappedReference {
            value,
            diagonal_folded: false,
            rotation_kept: false,
        }
    }
}

/// Rewrites `raw` so it points at the canonical cell of its tile and carries
/// the net flip needed to reproduce the original orientation.
///
/// `first_gid` is the gid of local tile 0 in the tileset that owns `raw`.
/// Empty references are returned bit-for-bit unchanged.
pub fn remap_reference(
    raw: u32,
    first_gid: u32,
    set: &CanonicalSet,
) -> Result<RemappedReference> {
    let decoded = DecodedReference::decode(raw);
    if decoded.is_empty() {
        return Ok(RemappedReference::unchanged(raw));
    }

    let local = decoded
        .gid
        .checked_sub(first_gid)
        .ok_or(MinimiseError::OutOfRange {
            index: decoded.gid,
            count: set.original_count(),
        })?;
    let resolution = set
        .resolution(local as usize)
        .ok_or(MinimiseError::OutOfRange {
            index: local,
            count: set.original_count(),
        })?;

    let new_gid = resolution.canonical_index as u32 + first_gid;
    let new_flags = decoded
        .flags
        .xor(FlipFlags::implied_by(resolution.transform));

    let mut value = new_gid | new_flags.bits();
    if decoded.rotated {
        value |= ROTATED_HEXAGONAL_120;
    }

    Ok(RemappedReference {
        value,
        diagonal_folded: decoded.diagonal,
        rotation_kept: decoded.rotated,
    })
}
