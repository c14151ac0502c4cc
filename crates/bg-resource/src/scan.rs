//! Directory scan listing the resource ids present on disk.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::id;

/// Sorted ids of every resource file below `dir`. A missing directory yields
/// no ids; unreadable entries are logged and skipped.
pub(crate) fn scan_ids(dir: &Path) -> Vec<String> {
    let mut ids = Vec::new();
    if dir.is_dir() {
        walk(dir, dir, &mut ids);
    } else {
        warn!(dir = %dir.display(), "resource directory does not exist");
    }
    ids.sort();
    ids
}

fn walk(root: &Path, dir: &Path, ids: &mut Vec<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), "skipping unreadable directory: {err}");
            return;
        }
    };
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(dir = %dir.display(), "skipping unreadable entry: {err}");
                continue;
            }
        };
        if path.is_dir() {
            walk(root, &path, ids);
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        match id::from_relative_path(relative) {
            Some(found) => ids.push(found),
            None => warn!(path = %path.display(), "ignoring file that is not a resource"),
        }
    }
}
