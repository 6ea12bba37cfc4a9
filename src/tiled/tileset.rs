//! # Tileset Minimisation
//!
//! Minimises the image of one tileset, either a standalone `.tsj` document or
//! a tileset embedded in a map, and updates the tileset's descriptive fields.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::document::{self, TILESET_EXTENSIONS};
use super::{Outcome, Report, TilesetReport};
use crate::codec::BitmapCodec;
use crate::config::MinimiseConfig;
use crate::error::{MinimiseError, Result};
use crate::graphics::tiles::dedup::build_canonical_set_filtered;
use crate::graphics::tiles::packer::PackLayout;
use crate::graphics::tiles::{emit_canonical_image, CanonicalSet, CellGrid};
use crate::paths::{self, MIN_SUFFIX};

/// A tileset whose image was reduced. The repacked image is held in memory
/// until [`MinimisedTileset::write_image`] is called.
#[derive(Debug)]
pub struct MinimisedTileset {
    pub set: CanonicalSet,
    pub output: RgbaImage,
    pub report: TilesetReport,
}

impl MinimisedTileset {
    pub fn write_image(&self, codec: &dyn BitmapCodec) -> Result<()> {
        codec.encode(&self.report.image, &self.output)
    }
}

/// Minimises the tileset described by `tileset`, rewriting its fields in place.
///
/// Relative image paths resolve against `base_dir`. `label` names the tileset
/// in messages. `in_use` is asked, per grid position, whether the cell should
/// take part; positions it rejects are dropped from the output.
///
/// Nothing is written to disk. Returns `None` when every cell is already
/// unique or when `in_use` rejects every cell, leaving `tileset` as it was.
pub fn minimise_tileset_object<F>(
    tileset: &mut Map<String, Value>,
    label: &Path,
    base_dir: &Path,
    config: &MinimiseConfig,
    codec: &dyn BitmapCodec,
    in_use: F,
) -> Result<Option<MinimisedTileset>>
where
    F: FnMut(usize) -> bool,
{
    let image_rel = document::require_str(tileset, "image", label)?.to_string();
    check_tile_size(tileset, label, config.cell_size)?;

    let image_path = paths::resolve_relative(base_dir, &image_rel);
    let image = codec.decode(&image_path)?;
    let grid = CellGrid::from_image(&image, config.cell_size)?;
    drop(image);

    let set = build_canonical_set_filtered(&grid, in_use);
    if set.is_empty() {
        warn!(path = %label.display(), "no tile of this tileset is in use; leaving it unchanged");
        return Ok(None);
    }
    if set.is_already_minimal() {
        info!("Tileset '{}' is already minimised; nothing to do.", label.display());
        return Ok(None);
    }

    let layout = PackLayout::for_count(set.len(), config.cell_size)?;
    let (output_width, output_height) = layout.dimensions();

    let new_image_rel = paths::replace_extension_with_suffix(
        &image_rel,
        MIN_SUFFIX,
        config.output_format.extension(),
    );
    let new_image_path = paths::resolve_relative(base_dir, &new_image_rel);
    let output = emit_canonical_image(&set, &layout)?;

    let new_name = tileset
        .get("name")
        .and_then(Value::as_str)
        .map(|name| format!("{}{}", name, MIN_SUFFIX));
    match new_name {
        Some(new_name) => document::update_str(tileset, "name", new_name, label),
        None => warn!(path = %label.display(), "could not find 'name' field in tileset file"),
    }
    document::update_u64(tileset, "imagewidth", output_width as u64, label);
    document::update_u64(tileset, "imageheight", output_height as u64, label);
    document::update_u64(tileset, "tilecount", set.len() as u64, label);
    document::update_u64(tileset, "columns", layout.columns as u64, label);
    tileset.insert("image".to_string(), Value::String(new_image_rel));

    let report = TilesetReport {
        tileset: label.to_path_buf(),
        original_tiles: set.original_count(),
        unique_tiles: set.len(),
        columns: layout.columns,
        rows: layout.rows,
        image: new_image_path,
    };
    report.log();

    Ok(Some(MinimisedTileset {
        set,
        output,
        report,
    }))
}

/// Declared tile size must match the configured cell size. Missing sizes are
/// assumed to match.
fn check_tile_size(tileset: &Map<String, Value>, label: &Path, cell_size: u32) -> Result<()> {
    match (
        document::get_u64(tileset, "tilewidth"),
        document::get_u64(tileset, "tileheight"),
    ) {
        (Some(width), Some(height)) => {
            if width != cell_size as u64 || height != cell_size as u64 {
                return Err(MinimiseError::TileSize {
                    path: label.to_path_buf(),
                    width,
                    height,
                    cell_size,
                });
            }
        }
        _ => warn!(
            path = %label.display(),
            "No tile dimensions found in tileset file; proceeding on the assumption that tiles are {}x{}",
            cell_size,
            cell_size
        ),
    }
    Ok(())
}

/// Loads a standalone tileset document, checking its extension.
pub fn load_tileset_document(path: &Path) -> Result<Value> {
    document::check_extension(path, TILESET_EXTENSIONS, ".tsj/.json")?;
    document::read_document(path)
}

/// Output path of a rewritten document: `tiles.tsj` -> `tiles_min.tsj`
pub fn output_document_path(path: &Path) -> PathBuf {
    PathBuf::from(paths::join_with_suffix(&path.to_string_lossy(), MIN_SUFFIX))
}

/// Minimises a standalone tileset document and writes `<name>_min.<ext>` next
/// to it.
pub fn minimise_tileset_file(
    path: &Path,
    config: &MinimiseConfig,
    codec: &dyn BitmapCodec,
) -> Result<Outcome> {
    let mut doc = load_tileset_document(path)?;
    let base_dir = paths::base_dir_of(path);
    let tileset = document::root_object(&mut doc, path)?;

    let minimised = match minimise_tileset_object(tileset, path, &base_dir, config, codec, |_| true)? {
        Some(minimised) => minimised,
        None => return Ok(Outcome::AlreadyMinimal),
    };

    let output_path = output_document_path(path);
    let mut written = Vec::new();
    if !config.dry_run {
        minimised.write_image(codec)?;
        written.push(minimised.report.image.clone());
        document::write_document(&output_path, &doc)?;
        written.push(output_path);
    }

    Ok(Outcome::Minimised(Report {
        tilesets: vec![minimised.report],
        written,
    }))
}
