//! Error taxonomy for tileset minimisation.

use std::{io, path::PathBuf};

use image::ImageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MinimiseError>;

#[derive(Debug, Error)]
pub enum MinimiseError {
    #[error(
        "Image dimensions ({width}x{height}) do not split evenly into {cell_size}x{cell_size} tiles; please modify the image before proceeding"
    )]
    Dimension {
        width: u32,
        height: u32,
        cell_size: u32,
    },

    #[error(
        "Pixel buffer of {len} bytes with a row stride of {stride} cannot hold a {width}x{height} RGBA image"
    )]
    Buffer {
        width: u32,
        height: u32,
        stride: usize,
        len: usize,
    },

    #[error("Tile dimensions in tileset '{}' are {width}x{height}, not {cell_size}x{cell_size} - cannot minimise", .path.display())]
    TileSize {
        path: PathBuf,
        width: u64,
        height: u64,
        cell_size: u32,
    },

    #[error("Failed to load image file '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("Failed to write output image '{}': {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid document '{}': {message}", .path.display())]
    Schema { path: PathBuf, message: String },

    #[error("File '{}' has unsupported extension '{extension}' - must be {expected}", .path.display())]
    UnsupportedExtension {
        path: PathBuf,
        extension: String,
        expected: &'static str,
    },

    #[error("Tile index {index} is out of range for a tileset of {count} tiles")]
    OutOfRange { index: u32, count: usize },

    #[error("Cannot pack zero tiles into an output image")]
    Packing,

    #[error("PNG optimisation failed: {0}")]
    Optimise(String),
}

impl MinimiseError {
    pub(crate) fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MinimiseError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MinimiseError::Io {
            path: path.into(),
            source,
        }
    }
}
