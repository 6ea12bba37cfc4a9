//! JSON document access for Tiled map and tileset files.

use std::{fs, path::Path};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{MinimiseError, Result};
use crate::paths::extension_of;

pub const TILESET_EXTENSIONS: &[&str] = &[".tsj", ".json"];
pub const MAP_EXTENSIONS: &[&str] = &[".tmj", ".json"];

/// Fails unless `path` ends in one of `allowed`.
pub fn check_extension(path: &Path, allowed: &[&str], expected: &'static str) -> Result<()> {
    let text = path.to_string_lossy();
    let extension = extension_of(&text);
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(extension)) {
        return Ok(());
    }
    Err(MinimiseError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: extension.to_string(),
        expected,
    })
}

pub fn read_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| MinimiseError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| MinimiseError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let text = serde_json::to_string(document).map_err(|source| MinimiseError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|e| MinimiseError::io(path, e))
}

/// The top-level object of a document
pub fn root_object<'a>(document: &'a mut Value, path: &Path) -> Result<&'a mut Map<String, Value>> {
    document
        .as_object_mut()
        .ok_or_else(|| MinimiseError::schema(path, "top level is not a JSON object"))
}

pub fn require_str<'a>(object: &'a Map<String, Value>, field: &str, path: &Path) -> Result<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| MinimiseError::schema(path, format!("could not find string field '{}'", field)))
}

pub fn require_u32(object: &Map<String, Value>, field: &str, path: &Path) -> Result<u32> {
    object
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            MinimiseError::schema(path, format!("could not find unsigned field '{}'", field))
        })
}

pub fn get_u64(object: &Map<String, Value>, field: &str) -> Option<u64> {
    object.get(field).and_then(Value::as_u64)
}

/// Overwrites an unsigned field, warning instead when it is absent or not unsigned.
pub fn update_u64(object: &mut Map<String, Value>, field: &str, value: u64, path: &Path) {
    match object.get_mut(field) {
        Some(slot) if slot.is_u64() => *slot = Value::from(value),
        _ => warn!(
            path = %path.display(),
            "could not find '{}' field in tileset file",
            field
        ),
    }
}

/// Overwrites a string field, warning instead when it is absent or not a string.
pub fn update_str(object: &mut Map<String, Value>, field: &str, value: String, path: &Path) {
    match object.get_mut(field) {
        Some(slot) if slot.is_string() => *slot = Value::String(value),
        _ => warn!(
            path = %path.display(),
            "could not find '{}' field in tileset file",
            field
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn extension_check() {
        assert!(check_extension(Path::new("a/b.tsj"), TILESET_EXTENSIONS, ".tsj/.json").is_ok());
        assert!(check_extension(Path::new("b.JSON"), TILESET_EXTENSIONS, ".tsj/.json").is_ok());
        let err = check_extension(Path::new("b.tsx"), TILESET_EXTENSIONS, ".tsj/.json").unwrap_err();
        assert!(matches!(err, MinimiseError::UnsupportedExtension { ref extension, .. } if extension == ".tsx"));
    }

    #[test]
    fn missing_fields_are_schema_errors() {
        let doc = json!({"image": 3, "firstgid": -1});
        let object = doc.as_object().unwrap();
        let path = PathBuf::from("t.tsj");

        let err = require_str(object, "image", &path).unwrap_err();
        assert!(err.to_string().contains("'image'"));
        assert!(require_u32(object, "firstgid", &path).is_err());
        assert!(require_u32(object, "columns", &path).is_err());
    }

    #[test]
    fn updates_only_existing_fields() {
        let mut doc = json!({"tilecount": 10, "name": "tiles"});
        let object = doc.as_object_mut().unwrap();
        let path = PathBuf::from("t.tsj");

        update_u64(object, "tilecount", 4, &path);
        update_u64(object, "columns", 2, &path);
        update_str(object, "name", "tiles_min".into(), &path);

        assert_eq!(doc, json!({"tilecount": 4, "name": "tiles_min"}));
    }
}
