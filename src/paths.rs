//! Path helpers for naming output files.
//!
//! Document fields hold paths as strings relative to the document, so these
//! work on `&str` and keep the separators the document already uses.

use std::path::{Path, PathBuf};

/// Suffix appended to the stem of every output file
pub const MIN_SUFFIX: &str = "_min";

fn file_name_start(path: &str) -> usize {
    path.rfind(['/', '\\']).map_or(0, |i| i + 1)
}

fn extension_dot(path: &str) -> Option<usize> {
    let start = file_name_start(path);
    path[start..]
        .rfind('.')
        .filter(|&i| i > 0)
        .map(|i| start + i)
}

/// Extension including the leading dot, or `""`
pub fn extension_of(path: &str) -> &str {
    extension_dot(path).map_or("", |i| &path[i..])
}

pub fn strip_extension(path: &str) -> &str {
    extension_dot(path).map_or(path, |i| &path[..i])
}

/// Inserts `suffix` before the final extension: `maps/a.tmj` -> `maps/a_min.tmj`
pub fn join_with_suffix(path: &str, suffix: &str) -> String {
    format!("{}{}{}", strip_extension(path), suffix, extension_of(path))
}

/// Replaces the extension with `suffix` and `extension`: `a.png` -> `a_min.bmp`
pub fn replace_extension_with_suffix(path: &str, suffix: &str, extension: &str) -> String {
    format!("{}{}.{}", strip_extension(path), suffix, extension)
}

/// Resolves a document-relative path against the document's directory.
pub fn resolve_relative(base_dir: &Path, relative: &str) -> PathBuf {
    let relative = Path::new(relative);
    if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        base_dir.join(relative)
    }
}

/// Directory a document's relative paths are resolved against
pub fn base_dir_of(document: &Path) -> PathBuf {
    document
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_only_looks_at_file_name() {
        assert_eq!(extension_of("maps/level.tmj"), ".tmj");
        assert_eq!(extension_of("some.dir/level"), "");
        assert_eq!(extension_of(".hidden"), "");
        assert_eq!(extension_of("a.b.json"), ".json");
    }

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(join_with_suffix("maps/level.tmj", MIN_SUFFIX), "maps/level_min.tmj");
        assert_eq!(join_with_suffix("..\\tiles.tsj", MIN_SUFFIX), "..\\tiles_min.tsj");
        assert_eq!(join_with_suffix("noext", MIN_SUFFIX), "noext_min");
    }

    #[test]
    fn image_extension_is_replaced() {
        assert_eq!(
            replace_extension_with_suffix("../img/tiles.png", MIN_SUFFIX, "bmp"),
            "../img/tiles_min.bmp"
        );
    }

    #[test]
    fn relative_paths_join_base() {
        let base = Path::new("/data/maps");
        assert_eq!(
            resolve_relative(base, "../tiles.png"),
            PathBuf::from("/data/maps/../tiles.png")
        );
        assert_eq!(resolve_relative(base, "/abs.png"), PathBuf::from("/abs.png"));
    }
}
