//! Tiled Map Minimisation
//!
//! Drives a minimisation run: tileset images are decoded, reduced and repacked,
//! tileset documents get their descriptive fields updated and map layers have
//! every tile reference rewritten to the canonical tiles.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::codec::BitmapCodec;
use crate::config::MinimiseConfig;
use crate::error::Result;
use crate::graphics::tiles::packer::PackLayout;
use crate::graphics::tiles::{build_canonical_set, emit_canonical_image, CellGrid};
use crate::paths::{self, MIN_SUFFIX};

pub mod document;
pub mod map;
pub mod reference;
pub mod tileset;

pub use map::minimise_map_file;
pub use reference::{remap_reference, DecodedReference, FlipFlags, RemappedReference};
pub use tileset::minimise_tileset_file;

/// Result of a run. Nothing is written when every tileset is already minimal.
#[derive(Debug)]
pub enum Outcome {
    AlreadyMinimal,
    Minimised(Report),
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub tilesets: Vec<TilesetReport>,
    /// Files written, in order. Empty for dry runs.
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TilesetReport {
    pub tileset: PathBuf,
    pub original_tiles: usize,
    pub unique_tiles: usize,
    pub columns: u32,
    pub rows: u32,
    pub image: PathBuf,
}

impl TilesetReport {
    /// Reduction as a whole percentage of the original tile count
    pub fn reduction_percent(&self) -> u32 {
        if self.original_tiles == 0 {
            return 0;
        }
        let removed = (self.original_tiles - self.unique_tiles) as f32;
        (removed / self.original_tiles as f32 * 100.0).round() as u32
    }

    pub(crate) fn log(&self) {
        info!(
            "Reduced number of tiles in '{}': {}->{} (-{}%)",
            self.tileset.display(),
            self.original_tiles,
            self.unique_tiles,
            self.reduction_percent()
        );
    }
}

/// Minimises a bare tileset image with no documents, writing `<stem>_min.<ext>`
/// next to it.
pub fn minimise_image_file(
    path: &Path,
    config: &MinimiseConfig,
    codec: &dyn BitmapCodec,
) -> Result<Outcome> {
    let image = codec.decode(path)?;
    let grid = CellGrid::from_image(&image, config.cell_size)?;
    drop(image);

    let set = build_canonical_set(&grid);
    if set.is_already_minimal() {
        info!("Image '{}' is already minimised; nothing to do.", path.display());
        return Ok(Outcome::AlreadyMinimal);
    }

    let layout = PackLayout::for_count(set.len(), config.cell_size)?;
    let output_path = PathBuf::from(paths::replace_extension_with_suffix(
        &path.to_string_lossy(),
        MIN_SUFFIX,
        config.output_format.extension(),
    ));

    let mut written = Vec::new();
    if !config.dry_run {
        let output = emit_canonical_image(&set, &layout)?;
        codec.encode(&output_path, &output)?;
        written.push(output_path.clone());
    }

    let report = TilesetReport {
        tileset: path.to_path_buf(),
        original_tiles: set.original_count(),
        unique_tiles: set.len(),
        columns: layout.columns,
        rows: layout.rows,
        image: output_path,
    };
    report.log();

    Ok(Outcome::Minimised(Report {
        tilesets: vec![report],
        written,
    }))
}
