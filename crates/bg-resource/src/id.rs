//! Dotted resource ids.
//!
//! A resource id such as `passive.resistor_0805` names the file
//! `passive/resistor_0805.json` below the directory of its resource type.

use std::path::{Component, Path, PathBuf};

use crate::cache::RESOURCE_EXTENSION;
use crate::error::LoadError;

/// Check that `id` is a well-formed dotted id.
pub fn validate(id: &str) -> Result<(), LoadError> {
    if id.is_empty() {
        return Err(LoadError::InvalidId { reason: "id is empty" });
    }
    for segment in id.split('.') {
        if segment.is_empty() {
            return Err(LoadError::InvalidId {
                reason: "id has an empty segment",
            });
        }
        if segment.contains(['/', '\\']) {
            return Err(LoadError::InvalidId {
                reason: "id segment contains a path separator",
            });
        }
    }
    Ok(())
}

/// Iterate the segments of a dotted id, rejecting malformed ones.
pub fn segments(id: &str) -> Result<impl Iterator<Item = &str>, LoadError> {
    validate(id)?;
    Ok(id.split('.'))
}

/// Relative file path for `id`, including the resource file extension.
pub fn to_relative_path(id: &str) -> Result<PathBuf, LoadError> {
    let mut path: PathBuf = segments(id)?.collect();
    let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    file_name.push(".");
    file_name.push(RESOURCE_EXTENSION);
    path.set_file_name(file_name);
    Ok(path)
}

/// Inverse of [`to_relative_path`]: `None` if `path` is not a resource file path.
pub fn from_relative_path(path: &Path) -> Option<String> {
    if path.extension()? != RESOURCE_EXTENSION {
        return None;
    }
    let stem = path.with_extension("");
    let mut parts = Vec::new();
    for component in stem.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str()?;
                if part.contains('.') {
                    return None;
                }
                parts.push(part);
            }
            _ => return None,
        }
    }
    let id = parts.join(".");
    validate(&id).ok()?;
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_id_becomes_nested_path() {
        let path = to_relative_path("passive.smd.r0805").unwrap();
        assert_eq!(path, Path::new("passive").join("smd").join("r0805.json"));
    }

    #[test]
    fn single_segment_id() {
        assert_eq!(to_relative_path("led").unwrap(), PathBuf::from("led.json"));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for bad in ["", ".led", "led.", "a..b", "a/b", "..\\up"] {
            assert!(
                matches!(to_relative_path(bad), Err(LoadError::InvalidId { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn path_maps_back_to_id() {
        let path = to_relative_path("connectors.jst.ph2").unwrap();
        assert_eq!(from_relative_path(&path).as_deref(), Some("connectors.jst.ph2"));
        assert_eq!(from_relative_path(Path::new("notes.txt")), None);
        assert_eq!(from_relative_path(Path::new("has.dot.json")), None);
        assert_eq!(from_relative_path(Path::new(".json")), None);
        assert_eq!(from_relative_path(&Path::new("..").join("up.json")), None);
    }

    #[test]
    fn validate_matches_segment_rules() {
        assert!(validate("passive.r0805").is_ok());
        assert!(matches!(validate("a..b"), Err(LoadError::InvalidId { .. })));
        assert!(matches!(validate(""), Err(LoadError::InvalidId { .. })));
    }
}
