//! Slices a decoded RGBA bitmap into a row-major grid of cells.

use image::RgbaImage;

use super::{Cell, Pixel};
use crate::error::{MinimiseError, Result};

const BYTES_PER_PIXEL: usize = 4;

/// Cells of a tileset image in row-major order. `width * height == cells.len()`.
#[derive(Clone, Debug)]
pub struct CellGrid {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: u32, y: u32) -> &Cell {
        &self.cells[(y * self.width + x) as usize]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn from_image(image: &RgbaImage, cell_size: u32) -> Result<Self> {
        let (width, height) = image.dimensions();
        extract_grid(
            width,
            height,
            width as usize * BYTES_PER_PIXEL,
            image.as_raw(),
            cell_size,
        )
    }
}

/// Extracts `(width / cell_size) x (height / cell_size)` cells from an RGBA
/// buffer whose rows are `stride` bytes apart.
pub fn extract_grid(
    width: u32,
    height: u32,
    stride: usize,
    buffer: &[u8],
    cell_size: u32,
) -> Result<CellGrid> {
    if cell_size == 0 || width % cell_size != 0 || height % cell_size != 0 {
        return Err(MinimiseError::Dimension {
            width,
            height,
            cell_size,
        });
    }
    let row_bytes = width as usize * BYTES_PER_PIXEL;
    let required = match height as usize {
        0 => Some(0),
        rows => stride.checked_mul(rows - 1).and_then(|n| n.checked_add(row_bytes)),
    };
    if stride < row_bytes || required.map_or(true, |required| buffer.len() < required) {
        return Err(MinimiseError::Buffer {
            width,
            height,
            stride,
            len: buffer.len(),
        });
    }

    let grid_width = width / cell_size;
    let grid_height = height / cell_size;
    let mut cells = Vec::with_capacity((grid_width * grid_height) as usize);

    for cell_y in 0..grid_height {
        for cell_x in 0..grid_width {
            let mut pixels = Vec::with_capacity((cell_size * cell_size) as usize);
            for y in 0..cell_size {
                let row = (cell_y * cell_size + y) as usize * stride;
                for x in 0..cell_size {
                    let offset = row + (cell_x * cell_size + x) as usize * BYTES_PER_PIXEL;
                    let rgba = [
                        buffer[offset],
                        buffer[offset + 1],
                        buffer[offset + 2],
                        buffer[offset + 3],
                    ];
                    pixels.push(Pixel::from_rgba(rgba));
                }
            }
            cells.push(Cell::new(cell_size, pixels));
        }
    }

    Ok(CellGrid {
        width: grid_width,
        height: grid_height,
        cell_size,
        cells,
    })
}
