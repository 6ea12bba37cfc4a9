//! Tileset minimisation for Tiled maps.
//!
//! Finds tiles that are pixel-identical directly or after a flip, keeps one
//! canonical copy of each, repacks the survivors into a smaller image and
//! rewrites map layer references with the flip flags needed to keep the map
//! looking the same.

pub mod codec;
pub mod config;
pub mod error;
pub mod graphics;
pub mod logging;
pub mod paths;
pub mod tiled;

pub use codec::{BitmapCodec, ImageCodec};
pub use config::{MinimiseConfig, OutputFormat};
pub use error::{MinimiseError, Result};
pub use tiled::{minimise_image_file, minimise_map_file, minimise_tileset_file, Outcome, Report};
