//! Directory listing shared by installation detection and discovery.

use crate::error::{IoOp, Result, WtfError};
use camino::{Utf8Path, Utf8PathBuf};
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// A direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirChild {
    pub name: String,
    pub is_dir: bool,
}

/// A direct child whose name is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChild {
    pub name: OsString,
    pub is_dir: bool,
}

/// Everything directly inside one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Sorted by name
    pub children: Vec<DirChild>,
    /// Sorted by name
    pub raw_children: Vec<RawChild>,
}

/// Read the direct children of `dir`, keeping entries with non UTF-8 names apart.
///
/// Symlinks count as directories when they point at one.
pub fn read_children(dir: &Utf8Path) -> Result<Listing> {
    let entries = fs::read_dir(dir).map_err(|e| WtfError::io(IoOp::ReadDir, dir, e))?;

    let mut listing = Listing::default();
    for entry in entries {
        let entry = entry.map_err(|e| WtfError::io(IoOp::ReadDir, dir, e))?;

        let file_type = entry
            .file_type()
            .map_err(|e| WtfError::io(IoOp::ReadDir, display_path(&entry.path()), e))?;
        let is_dir = if file_type.is_symlink() {
            entry.path().is_dir()
        } else {
            file_type.is_dir()
        };

        match entry.file_name().into_string() {
            Ok(name) => listing.children.push(DirChild { name, is_dir }),
            Err(name) => listing.raw_children.push(RawChild { name, is_dir }),
        }
    }

    listing.children.sort_by(|a, b| a.name.cmp(&b.name));
    listing.raw_children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

/// List the direct children of `dir`, sorted by name.
///
/// Entries whose names are not valid UTF-8 cannot name a version, account, server or
/// character, and are skipped.
pub fn list_children(dir: &Utf8Path) -> Result<Vec<DirChild>> {
    let listing = read_children(dir)?;
    for raw in &listing.raw_children {
        tracing::warn!("Skipping non UTF-8 entry {:?} in {}", raw.name, dir);
    }
    Ok(listing.children)
}

/// `path` for messages and events, with invalid UTF-8 replaced.
pub fn display_path(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from(path.to_string_lossy().into_owned())
}

/// Names of the direct child directories of `dir`, sorted.
pub fn child_dir_names(dir: &Utf8Path) -> Result<Vec<String>> {
    Ok(list_children(dir)?
        .into_iter()
        .filter(|c| c.is_dir)
        .map(|c| c.name)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_children_are_sorted_and_typed() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        fs::create_dir(dir.join("b_dir")).unwrap();
        fs::create_dir(dir.join("a_dir")).unwrap();
        fs::write(dir.join("c_file.txt"), "x").unwrap();

        let children = list_children(&dir).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a_dir", "b_dir", "c_file.txt"]);
        assert!(children[0].is_dir);
        assert!(!children[2].is_dir);

        assert_eq!(child_dir_names(&dir).unwrap(), ["a_dir", "b_dir"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_kept_apart() {
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let raw = std::ffi::OsStr::from_bytes(b"Caf\xe9.lua");
        if fs::write(dir.as_std_path().join(raw), "x").is_err() {
            // Filesystem only accepts UTF-8 names
            return;
        }
        fs::write(dir.join("Plain.lua"), "x").unwrap();

        let listing = read_children(&dir).unwrap();
        assert_eq!(listing.children.len(), 1);
        assert_eq!(
            listing.raw_children,
            [RawChild {
                name: raw.to_os_string(),
                is_dir: false
            }]
        );
        assert_eq!(list_children(&dir).unwrap().len(), 1);
        assert_eq!(
            display_path(&dir.as_std_path().join(raw)),
            dir.join("Caf\u{FFFD}.lua")
        );
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().join("missing")).unwrap();

        let err = list_children(&dir).unwrap_err();
        assert!(matches!(err, WtfError::Io { op: IoOp::ReadDir, .. }));
    }
}
