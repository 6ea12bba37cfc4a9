//! # Tile Cells
//!
//! A tileset bitmap is cut into fixed-size square cells. Two cells are the same
//! tile when their colour channels match pixel for pixel, either directly or
//! after one of the four flip transforms.

use std::hash::{Hash, Hasher};

pub mod dedup;
pub mod grid;
pub mod packer;
pub mod variants;

pub use dedup::{build_canonical_set, CanonicalSet, Resolution};
pub use grid::{extract_grid, CellGrid};
pub use packer::{emit_canonical_image, pack_dimensions};
pub use variants::{flip_variants, transform_cell};

/// Default cell side length in pixels
pub const DEFAULT_CELL_SIZE: u32 = 8;

/// RGBA pixel whose fourth channel is padding. Equality and hashing only look
/// at the three colour channels.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub pad: u8,
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8, pad: u8) -> Self {
        Pixel { r, g, b, pad }
    }

    pub fn from_rgba(rgba: [u8; 4]) -> Self {
        Pixel::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.pad]
    }

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl PartialEq for Pixel {
    fn eq(&self, other: &Self) -> bool {
        self.rgb() == other.rgb()
    }
}

impl Eq for Pixel {}

impl Hash for Pixel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rgb().hash(state);
    }
}

/// A square block of pixels, stored row-major
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    size: u32,
    pixels: Vec<Pixel>,
}

impl Cell {
    /// Builds a cell from `size * size` row-major pixels.
    ///
    /// Panics if the pixel count does not match the side length.
    pub fn new(size: u32, pixels: Vec<Pixel>) -> Self {
        assert_eq!(
            pixels.len(),
            (size * size) as usize,
            "cell of side {} needs {} pixels",
            size,
            size * size
        );
        Cell { size, pixels }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        debug_assert!(x < self.size && y < self.size);
        self.pixels[(y * self.size + x) as usize]
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Colour channels of every pixel in row-major order, padding excluded.
    pub(crate) fn colour_key(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.pixels.iter().map(|p| p.rgb())
    }
}

/// Geometric relation between a cell and its canonical cell.
///
/// The declaration order is the tie-break order used while matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transform {
    Identity,
    HorizontalFlip,
    VerticalFlip,
    Both,
}

impl Transform {
    pub const ALL: [Transform; 4] = [
        Transform::Identity,
        Transform::HorizontalFlip,
        Transform::VerticalFlip,
        Transform::Both,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Horizontal and vertical flip components of this transform
    pub fn flips(self) -> (bool, bool) {
        match self {
            Transform::Identity => (false, false),
            Transform::HorizontalFlip => (true, false),
            Transform::VerticalFlip => (false, true),
            Transform::Both => (true, true),
        }
    }

    pub fn from_flips(horizontal: bool, vertical: bool) -> Self {
        match (horizontal, vertical) {
            (false, false) => Transform::Identity,
            (true, false) => Transform::HorizontalFlip,
            (false, true) => Transform::VerticalFlip,
            (true, true) => Transform::Both,
        }
    }

    /// Net transform of applying `self` and then `other`. Flips commute, so
    /// this is an XOR of the components.
    pub fn then(self, other: Transform) -> Transform {
        let (h1, v1) = self.flips();
        let (h2, v2) = other.flips();
        Transform::from_flips(h1 ^ h2, v1 ^ v2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_equality_ignores_padding() {
        assert_eq!(Pixel::new(1, 2, 3, 0), Pixel::new(1, 2, 3, 255));
        assert_ne!(Pixel::new(1, 2, 3, 0), Pixel::new(1, 2, 4, 0));
    }

    #[test]
    fn transforms_compose_as_flip_xor() {
        for a in Transform::ALL {
            assert_eq!(a.then(a), Transform::Identity);
            assert_eq!(a.then(Transform::Identity), a);
        }
        assert_eq!(
            Transform::HorizontalFlip.then(Transform::VerticalFlip),
            Transform::Both
        );
        assert_eq!(
            Transform::Both.then(Transform::HorizontalFlip),
            Transform::VerticalFlip
        );
    }

    #[test]
    fn transform_order_matches_tie_break() {
        let mut sorted = Transform::ALL;
        sorted.sort();
        assert_eq!(sorted, Transform::ALL);
    }
}
