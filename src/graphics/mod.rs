//! Graphics processing for tileset images
//!
//! Cell extraction, flip-aware deduplication and repacking of tileset bitmaps.

pub mod tiles;

pub use tiles::{Cell, CellGrid, Pixel, Transform};
