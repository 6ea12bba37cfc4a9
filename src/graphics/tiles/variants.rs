//! Flip variants of a cell.

use super::{Cell, Transform};

/// Returns a copy of `cell` with `transform` applied.
pub fn transform_cell(cell: &Cell, transform: Transform) -> Cell {
    let size = cell.size();
    let last = size - 1;
    let (flip_x, flip_y) = transform.flips();

    let mut pixels = Vec::with_capacity(cell.pixels().len());
    for y in 0..size {
        let src_y = if flip_y { last - y } else { y };
        for x in 0..size {
            let src_x = if flip_x { last - x } else { x };
            pixels.push(cell.pixel(src_x, src_y));
        }
    }
    Cell::new(size, pixels)
}

/// The four variants of `cell`, indexed by [`Transform::index`].
pub fn flip_variants(cell: &Cell) -> [Cell; 4] {
    Transform::ALL.map(|transform| transform_cell(cell, transform))
}
