//! Output grid layout and repacked image generation.

use image::{Rgba, RgbaImage};

use super::{CanonicalSet, Transform};
use crate::error::{MinimiseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackLayout {
    /// Width of the output grid in cells
    pub columns: u32,
    /// Height of the output grid in cells
    pub rows: u32,
    pub cell_size: u32,
}

impl PackLayout {
    pub fn for_count(count: usize, cell_size: u32) -> Result<Self> {
        let (columns, rows) = pack_dimensions(count)?;
        Ok(PackLayout {
            columns,
            rows,
            cell_size,
        })
    }

    /// Output image size in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.columns * self.cell_size, self.rows * self.cell_size)
    }

    /// Pixel origin of the cell at `index`
    pub fn origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (
            (index % self.columns) * self.cell_size,
            (index / self.columns) * self.cell_size,
        )
    }
}

/// Picks `(width, height)` in cells with `width * height == count` and the
/// two sides as close as possible, width never smaller than height.
///
/// A prime count packs into a single row.
pub fn pack_dimensions(count: usize) -> Result<(u32, u32)> {
    if count == 0 {
        return Err(MinimiseError::Packing);
    }

    let mut height = integer_sqrt(count);
    while count % height != 0 {
        height -= 1;
    }
    Ok(((count / height) as u32, height as u32))
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// Lays the canonical cells out row-major into a new image, with no blank cells.
pub fn emit_canonical_image(set: &CanonicalSet, layout: &PackLayout) -> Result<RgbaImage> {
    if set.is_empty() {
        return Err(MinimiseError::Packing);
    }
    debug_assert_eq!((layout.columns * layout.rows) as usize, set.len());

    let (width, height) = layout.dimensions();
    let mut output = RgbaImage::new(width, height);

    for index in 0..set.len() {
        let cell = &set.variants(index)[Transform::Identity.index()];
        let (origin_x, origin_y) = layout.origin(index);
        for y in 0..cell.size() {
            for x in 0..cell.size() {
                output.put_pixel(origin_x + x, origin_y + y, Rgba(cell.pixel(x, y).to_rgba()));
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::tiles::{build_canonical_set, CellGrid};

    #[test]
    fn near_square_dimensions() {
        assert_eq!(pack_dimensions(1).unwrap(), (1, 1));
        assert_eq!(pack_dimensions(6).unwrap(), (3, 2));
        assert_eq!(pack_dimensions(7).unwrap(), (7, 1));
        assert_eq!(pack_dimensions(16).unwrap(), (4, 4));
        assert_eq!(pack_dimensions(12).unwrap(), (4, 3));
        assert_eq!(pack_dimensions(18).unwrap(), (6, 3));
    }

    #[test]
    fn every_count_packs_exactly() {
        for count in 1..=500 {
            let (width, height) = pack_dimensions(count).unwrap();
            assert_eq!((width * height) as usize, count);
            assert!(width >= height);
            // No factor pair is closer to square
            for h in (height + 1)..=width {
                if h <= (count as u32) / h {
                    assert_ne!(count as u32 % h, 0, "count {} has closer pair", count);
                }
            }
        }
    }

    #[test]
    fn zero_count_fails() {
        assert!(matches!(pack_dimensions(0), Err(MinimiseError::Packing)));
    }

    #[test]
    fn emission_places_cells_row_major() {
        // Six distinct solid cells in a single row
        let source = RgbaImage::from_fn(48, 8, |x, _| Rgba([(x / 8) as u8 * 10, 1, 2, 255]));
        let set = build_canonical_set(&CellGrid::from_image(&source, 8).unwrap());
        let layout = PackLayout::for_count(set.len(), 8).unwrap();
        let output = emit_canonical_image(&set, &layout).unwrap();

        assert_eq!(output.dimensions(), (24, 16));
        assert_eq!(output.get_pixel(0, 0), &Rgba([0, 1, 2, 255]));
        assert_eq!(output.get_pixel(23, 7), &Rgba([20, 1, 2, 255]));
        assert_eq!(output.get_pixel(0, 8), &Rgba([30, 1, 2, 255]));
        assert_eq!(output.get_pixel(17, 15), &Rgba([50, 1, 2, 255]));
    }
}
