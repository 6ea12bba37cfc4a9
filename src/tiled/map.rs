//! # Map Minimisation
//!
//! Minimises every tileset a map uses and rewrites the map's tile layers so
//! the map renders the same with the reduced tilesets.
//!
//! A tileset owns the global ids `[firstgid, firstgid + tiles)`, cut short by
//! the next tileset's `firstgid`. References outside every reduced tileset's
//! range are left alone. Reduced tilesets keep their `firstgid`, so the gaps
//! they leave are harmless.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::document::{self, MAP_EXTENSIONS};
use super::reference::{gid_of, remap_reference};
use super::tileset::{
    load_tileset_document, minimise_tileset_object, output_document_path, MinimisedTileset,
};
use super::{Outcome, Report};
use crate::codec::BitmapCodec;
use crate::config::MinimiseConfig;
use crate::error::{MinimiseError, Result};
use crate::graphics::tiles::CanonicalSet;
use crate::paths::{self, MIN_SUFFIX};

#[derive(Debug, Clone)]
enum TilesetKind {
    /// External `.tsj` document, path relative to the map
    External(String),
    /// Tileset object stored inline in the map's `tilesets` array
    Embedded,
}

#[derive(Debug, Clone)]
struct TilesetEntry {
    index: usize,
    first_gid: u32,
    kind: TilesetKind,
}

/// Gid range of one reduced tileset and how to rewrite references into it
struct RemapTarget<'a> {
    first_gid: u32,
    end_gid: u32,
    set: &'a CanonicalSet,
}

impl RemapTarget<'_> {
    fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid < self.end_gid
    }
}

/// A reduced tileset waiting to be written
struct ReducedTileset {
    first_gid: u32,
    end_gid: u32,
    minimised: MinimisedTileset,
    /// Output path and content of an external tileset document
    document: Option<(PathBuf, Value)>,
}

/// Minimises every tileset of the map at `path` and writes
/// `<name>_min.<ext>` next to it.
///
/// Every tileset is validated and reduced before anything is written. When no
/// tileset can be reduced nothing is written at all.
pub fn minimise_map_file(
    path: &Path,
    config: &MinimiseConfig,
    codec: &dyn BitmapCodec,
) -> Result<Outcome> {
    document::check_extension(path, MAP_EXTENSIONS, ".tmj/.json")?;
    let mut doc = document::read_document(path)?;
    let base_dir = paths::base_dir_of(path);
    let root = document::root_object(&mut doc, path)?;

    let entries = read_tileset_entries(root, path)?;
    let used = if config.prune_unused {
        Some(collect_used_gids(root, path)?)
    } else {
        None
    };

    let mut reduced = Vec::new();
    let mut new_sources = Vec::new();

    for (order, entry) in entries.iter().enumerate() {
        let next_first_gid = entries.get(order + 1).map(|next| next.first_gid);
        let first_gid = entry.first_gid;
        let in_use = |position: usize| {
            used.as_ref()
                .map_or(true, |used| gid_in_use(used, first_gid, position))
        };

        match &entry.kind {
            TilesetKind::External(source) => {
                let tileset_path = paths::resolve_relative(&base_dir, source);
                let mut tileset_doc = load_tileset_document(&tileset_path)?;
                let tileset_base = paths::base_dir_of(&tileset_path);
                let object = document::root_object(&mut tileset_doc, &tileset_path)?;

                if let Some(minimised) = minimise_tileset_object(
                    object,
                    &tileset_path,
                    &tileset_base,
                    config,
                    codec,
                    in_use,
                )? {
                    new_sources.push((entry.index, paths::join_with_suffix(source, MIN_SUFFIX)));
                    reduced.push(ReducedTileset {
                        first_gid,
                        end_gid: range_end(first_gid, &minimised.set, next_first_gid),
                        minimised,
                        document: Some((output_document_path(&tileset_path), tileset_doc)),
                    });
                }
            }
            TilesetKind::Embedded => {
                let label = PathBuf::from(format!("{}#tilesets[{}]", path.display(), entry.index));
                let object = embedded_tileset(root, entry.index, path)?;

                if let Some(minimised) =
                    minimise_tileset_object(object, &label, &base_dir, config, codec, in_use)?
                {
                    reduced.push(ReducedTileset {
                        first_gid,
                        end_gid: range_end(first_gid, &minimised.set, next_first_gid),
                        minimised,
                        document: None,
                    });
                }
            }
        }
    }

    if reduced.is_empty() {
        info!("Map '{}' is already minimised; nothing to do.", path.display());
        return Ok(Outcome::AlreadyMinimal);
    }

    let targets: Vec<RemapTarget<'_>> = reduced
        .iter()
        .map(|tileset| RemapTarget {
            first_gid: tileset.first_gid,
            end_gid: tileset.end_gid,
            set: &tileset.minimised.set,
        })
        .collect();

    let layers = root
        .get_mut("layers")
        .ok_or_else(|| MinimiseError::schema(path, "could not find 'layers' array"))?;
    for_each_layer_data(layers, "", path, &mut |layer, data| {
        remap_layer_data(layer, data, &targets)
    })?;

    let tilesets = root
        .get_mut("tilesets")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| MinimiseError::schema(path, "could not find 'tilesets' array"))?;
    for (index, new_source) in new_sources {
        if let Some(entry) = tilesets.get_mut(index).and_then(Value::as_object_mut) {
            entry.insert("source".to_string(), Value::String(new_source));
        }
    }

    let mut reports = Vec::new();
    let mut written = Vec::new();

    for tileset in &reduced {
        if !config.dry_run {
            tileset.minimised.write_image(codec)?;
            written.push(tileset.minimised.report.image.clone());
            if let Some((document_path, tileset_doc)) = &tileset.document {
                document::write_document(document_path, tileset_doc)?;
                written.push(document_path.clone());
            }
        }
        reports.push(tileset.minimised.report.clone());
    }
    if !config.dry_run {
        let output_path = output_document_path(path);
        document::write_document(&output_path, &doc)?;
        written.push(output_path);
    }

    Ok(Outcome::Minimised(Report {
        tilesets: reports,
        written,
    }))
}

fn range_end(first_gid: u32, set: &CanonicalSet, next_first_gid: Option<u32>) -> u32 {
    let end = first_gid.saturating_add(set.original_count() as u32);
    next_first_gid.map_or(end, |next| end.min(next))
}

/// Whether the tile at `position` of a tileset starting at `first_gid` is
/// referenced. Positions whose gid would overflow are never in use.
fn gid_in_use(used: &HashSet<u32>, first_gid: u32, position: usize) -> bool {
    u32::try_from(position)
        .ok()
        .and_then(|position| first_gid.checked_add(position))
        .map_or(false, |gid| used.contains(&gid))
}

fn embedded_tileset<'a>(
    root: &'a mut Map<String, Value>,
    index: usize,
    path: &Path,
) -> Result<&'a mut Map<String, Value>> {
    root.get_mut("tilesets")
        .and_then(Value::as_array_mut)
        .and_then(|tilesets| tilesets.get_mut(index))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| MinimiseError::schema(path, format!("tileset {} is not an object", index)))
}

/// Reads the `tilesets` array, sorted by `firstgid`.
fn read_tileset_entries(root: &Map<String, Value>, path: &Path) -> Result<Vec<TilesetEntry>> {
    let tilesets = root
        .get("tilesets")
        .and_then(Value::as_array)
        .ok_or_else(|| MinimiseError::schema(path, "could not find 'tilesets' array"))?;

    let mut entries = Vec::with_capacity(tilesets.len());
    for (index, tileset) in tilesets.iter().enumerate() {
        let object = tileset.as_object().ok_or_else(|| {
            MinimiseError::schema(path, format!("tileset {} is not an object", index))
        })?;
        let first_gid = document::require_u32(object, "firstgid", path)?;

        let kind = match object.get("source") {
            Some(source) => {
                let source = source.as_str().ok_or_else(|| {
                    MinimiseError::schema(path, format!("tileset {}: 'source' is not a string", index))
                })?;
                TilesetKind::External(source.to_string())
            }
            None if object.contains_key("image") => TilesetKind::Embedded,
            None => {
                warn!(
                    path = %path.display(),
                    tileset = index,
                    "tileset has neither 'source' nor 'image' (image collection?); skipping"
                );
                continue;
            }
        };

        entries.push(TilesetEntry {
            index,
            first_gid,
            kind,
        });
    }

    entries.sort_by_key(|entry| entry.first_gid);
    Ok(entries)
}

/// Every non-empty gid referenced by any tile layer
fn collect_used_gids(root: &mut Map<String, Value>, path: &Path) -> Result<HashSet<u32>> {
    let layers = root
        .get_mut("layers")
        .ok_or_else(|| MinimiseError::schema(path, "could not find 'layers' array"))?;

    let mut used = HashSet::new();
    for_each_layer_data(layers, "", path, &mut |layer, data| {
        for (entry, value) in data.iter().enumerate() {
            let gid = gid_of(raw_reference(value, layer, entry)?);
            if gid != 0 {
                used.insert(gid);
            }
        }
        Ok(())
    })?;
    Ok(used)
}

/// Where a layer's tile data sits, for error messages
struct LayerLocation<'a> {
    path: &'a Path,
    layer: &'a str,
}

impl LayerLocation<'_> {
    fn error(&self, message: impl std::fmt::Display) -> MinimiseError {
        MinimiseError::schema(self.path, format!("layer {}: {}", self.layer, message))
    }
}

type LayerVisitor<'v> = dyn FnMut(&LayerLocation<'_>, &mut Vec<Value>) -> Result<()> + 'v;

/// Calls `visit` with the tile data of every tile layer, descending into
/// group layers and the chunks of infinite maps. Layers are named by their
/// index path, e.g. `2/0` for the first child of the third top-level layer.
fn for_each_layer_data(
    layers: &mut Value,
    prefix: &str,
    path: &Path,
    visit: &mut LayerVisitor<'_>,
) -> Result<()> {
    let layers = layers.as_array_mut().ok_or_else(|| {
        let message = if prefix.is_empty() {
            "'layers' is not an array".to_string()
        } else {
            format!("layer {}: 'layers' is not an array", prefix)
        };
        MinimiseError::schema(path, message)
    })?;

    for (index, layer) in layers.iter_mut().enumerate() {
        let name = if prefix.is_empty() {
            index.to_string()
        } else {
            format!("{}/{}", prefix, index)
        };
        let location = LayerLocation {
            path,
            layer: &name,
        };
        let object = layer
            .as_object_mut()
            .ok_or_else(|| location.error("not an object"))?;

        let layer_type = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("tilelayer")
            .to_string();

        match layer_type.as_str() {
            "tilelayer" => {
                if let Some(chunks) = object.get_mut("chunks") {
                    let chunks = chunks
                        .as_array_mut()
                        .ok_or_else(|| location.error("'chunks' is not an array"))?;
                    for chunk in chunks {
                        let data = chunk
                            .get_mut("data")
                            .and_then(Value::as_array_mut)
                            .ok_or_else(|| location.error("chunk has no 'data' array"))?;
                        visit(&location, data)?;
                    }
                } else {
                    let data = object
                        .get_mut("data")
                        .and_then(Value::as_array_mut)
                        .ok_or_else(|| {
                            location.error(
                                "could not find 'data' array (base64 layer data is not supported)",
                            )
                        })?;
                    visit(&location, data)?;
                }
            }
            "group" => {
                let children = object
                    .get_mut("layers")
                    .ok_or_else(|| location.error("group has no 'layers' array"))?;
                for_each_layer_data(children, &name, path, visit)?;
            }
            other => debug!(layer = %name, layer_type = other, "skipping non-tile layer"),
        }
    }

    Ok(())
}

fn raw_reference(value: &Value, location: &LayerLocation<'_>, entry: usize) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| location.error(format!("entry {} is not a 32-bit tile id", entry)))
}

fn remap_layer_data(
    location: &LayerLocation<'_>,
    data: &mut [Value],
    targets: &[RemapTarget<'_>],
) -> Result<()> {
    for (entry, value) in data.iter_mut().enumerate() {
        let raw = raw_reference(value, location, entry)?;
        let gid = gid_of(raw);
        if gid == 0 {
            continue;
        }
        let Some(target) = targets.iter().find(|target| target.contains(gid)) else {
            continue;
        };

        let remapped = remap_reference(raw, target.first_gid, target.set)?;
        if remapped.rotation_kept {
            warn!(
                layer = %location.layer,
                entry,
                "tile rotation is not supported; rotation flag left as-is"
            );
        }
        if remapped.diagonal_folded {
            warn!(
                layer = %location.layer,
                entry,
                "diagonal flip is not supported; approximated as a horizontal and vertical flip"
            );
        }
        *value = Value::from(remapped.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gid_past_u32_max_is_not_in_use() {
        let used: HashSet<u32> = [u32::MAX, 3].into_iter().collect();
        assert!(gid_in_use(&used, 1, 2));
        assert!(!gid_in_use(&used, 1, 1));
        assert!(gid_in_use(&used, u32::MAX - 1, 1));
        assert!(!gid_in_use(&used, u32::MAX - 1, 2));
    }

    #[test]
    fn entries_sort_by_first_gid_and_skip_collections() {
        let doc = json!({
            "tilesets": [
                {"firstgid": 40, "source": "b.tsj"},
                {"firstgid": 1, "image": "a.png"},
                {"firstgid": 90, "tiles": []}
            ]
        });
        let entries = read_tileset_entries(doc.as_object().unwrap(), Path::new("m.tmj")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].index, entries[0].first_gid), (1, 1));
        assert!(matches!(entries[1].kind, TilesetKind::External(ref s) if s == "b.tsj"));
    }

    #[test]
    fn missing_first_gid_is_a_schema_error() {
        let doc = json!({"tilesets": [{"source": "a.tsj"}]});
        let err = read_tileset_entries(doc.as_object().unwrap(), Path::new("m.tmj")).unwrap_err();
        assert!(err.to_string().contains("'firstgid'"));
    }

    #[test]
    fn visits_groups_and_chunks() {
        let mut layers = json!([
            {"type": "tilelayer", "data": [1, 2]},
            {"type": "objectgroup", "objects": []},
            {"type": "group", "layers": [
                {"type": "tilelayer", "chunks": [{"data": [3]}, {"data": [4, 5]}]}
            ]}
        ]);
        let mut seen = Vec::new();
        for_each_layer_data(&mut layers, "", Path::new("m.tmj"), &mut |location, data| {
            seen.push((location.layer.to_string(), data.len()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                ("0".to_string(), 2),
                ("2/0".to_string(), 1),
                ("2/0".to_string(), 2)
            ]
        );
    }

    #[test]
    fn missing_layer_data_names_the_layer() {
        let mut layers = json!([
            {"type": "tilelayer", "data": [1]},
            {"type": "tilelayer", "data": "eJxjYGBgAAAABAAB", "encoding": "base64"}
        ]);
        let err = for_each_layer_data(&mut layers, "", Path::new("m.tmj"), &mut |_, _| Ok(()))
            .unwrap_err();
        assert!(err.to_string().contains("layer 1"));
        assert!(err.to_string().contains("'data'"));
    }
}
