//! Installation detection: finding the directory that holds the client versions.
//!
//! An installation root is any directory with at least one direct child directory named
//! after a [`GameVersion`] folder (`_retail_`, `_classic_era_`, ...). This module provides:
//! - [`is_installation_root`]: the validity predicate
//! - [`available_versions`]: the versions actually present under a root
//! - [`default_installation_path`]: the usual install location per platform
//! - [`DirectoryCursor`] and [`locate_installation`]: an explicit ascend/descend loop
//!   driven by an external chooser, used when no default location works
//!
//! # Examples
//!
//! ```ignore
//! use wtfcopy::services::install_detection::{
//!     default_installation_path, InstallationRoot, Platform,
//! };
//!
//! let guess = default_installation_path(Platform::current(), dirs::home_dir().as_deref());
//! let root = guess.and_then(InstallationRoot::open);
//! ```

use crate::error::{Result, WtfError};
use crate::models::GameVersion;
use crate::services::dir_listing::{child_dir_names, list_children};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;

/// Platforms with a known default install location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

/// The usual install location for `platform`.
///
/// Linux installs are assumed to live in a Bottles prefix under the user's home
/// directory, so that case needs `home_dir`.
pub fn default_installation_path(
    platform: Platform,
    home_dir: Option<&Path>,
) -> Option<Utf8PathBuf> {
    match platform {
        Platform::MacOs => Some(Utf8PathBuf::from("/Applications/World of Warcraft")),
        Platform::Windows => Some(Utf8PathBuf::from("C:\\World of Warcraft")),
        Platform::Linux => {
            let home = Utf8Path::from_path(home_dir?)?;
            Some(home.join(
                ".var/app/com.usebottles.bottles/data/bottles/bottles/WoW/drive_c/Program Files (x86)/World of Warcraft",
            ))
        }
        Platform::Other => None,
    }
}

/// Where manual browsing starts: the chosen drive on Windows, `/` elsewhere.
///
/// Only the first character of `drive` is used, so `"d"`, `"D:"` and `"D:\"` all
/// give `D:\`. A blank answer falls back to `C:\`.
pub fn browse_start(platform: Platform, drive: Option<&str>) -> Utf8PathBuf {
    match platform {
        Platform::Windows => {
            let letter = drive
                .and_then(|d| d.trim().chars().next())
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('C');
            Utf8PathBuf::from(format!("{}:\\", letter))
        }
        _ => Utf8PathBuf::from("/"),
    }
}

/// Whether `dir` directly contains at least one recognized version directory.
///
/// Missing or unreadable directories are simply not roots.
pub fn is_installation_root(dir: &Utf8Path) -> bool {
    match list_children(dir) {
        Ok(children) => children
            .iter()
            .any(|c| c.is_dir && GameVersion::from_folder_name(&c.name).is_some()),
        Err(e) => {
            tracing::debug!("{} is not an installation root: {}", dir, e);
            false
        }
    }
}

/// Recognized version directories under `root`, in [`GameVersion`] declaration order.
pub fn available_versions(root: &Utf8Path) -> Result<Vec<GameVersion>> {
    let mut versions: Vec<GameVersion> = child_dir_names(root)?
        .iter()
        .filter_map(|name| GameVersion::from_folder_name(name))
        .collect();
    versions.sort();
    versions.dedup();
    Ok(versions)
}

/// A validated installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRoot {
    path: Utf8PathBuf,
}

impl InstallationRoot {
    /// Returns `None` unless `path` passes [`is_installation_root`].
    pub fn open(path: impl Into<Utf8PathBuf>) -> Option<Self> {
        let path = path.into();
        if is_installation_root(&path) {
            Some(Self { path })
        } else {
            None
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn available_versions(&self) -> Result<Vec<GameVersion>> {
        available_versions(&self.path)
    }
}

/// A move chosen while browsing for an installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Go to the parent directory
    Ascend,
    /// Enter the named child directory
    Descend(String),
    /// Give up browsing
    Abort,
}

/// Current position while browsing the filesystem for an installation root.
#[derive(Debug, Clone)]
pub struct DirectoryCursor {
    current: Utf8PathBuf,
}

impl DirectoryCursor {
    pub fn new(start: impl Into<Utf8PathBuf>) -> Self {
        Self {
            current: start.into(),
        }
    }

    pub fn current(&self) -> &Utf8Path {
        &self.current
    }

    /// Sorted names of the directories that can be descended into.
    pub fn child_directories(&self) -> Result<Vec<String>> {
        child_dir_names(&self.current)
    }

    /// Move to the parent directory. A filesystem root stays where it is.
    pub fn ascend(&mut self) -> &Utf8Path {
        if let Some(parent) = self.current.parent() {
            self.current = parent.to_path_buf();
        }
        &self.current
    }

    pub fn descend(&mut self, child: &str) -> &Utf8Path {
        self.current.push(child);
        &self.current
    }
}

/// Browse from `start` until an installation root is reached.
///
/// `choose` is shown the current directory and its child directories and picks the next
/// move. The directory reached after each move is checked, and the first root found is
/// returned. `Navigation::Abort` ends the loop with `Ok(None)`. There is no depth limit.
pub fn locate_installation<F, E>(
    start: impl Into<Utf8PathBuf>,
    mut choose: F,
) -> Result<Option<InstallationRoot>, E>
where
    F: FnMut(&Utf8Path, &[String]) -> Result<Navigation, E>,
    E: From<WtfError>,
{
    let mut cursor = DirectoryCursor::new(start);

    loop {
        let children = cursor.child_directories()?;
        let next = match choose(cursor.current(), &children)? {
            Navigation::Ascend => cursor.ascend(),
            Navigation::Descend(child) => cursor.descend(&child),
            Navigation::Abort => {
                tracing::info!("Installation search aborted at {}", cursor.current());
                return Ok(None);
            }
        };
        tracing::debug!("Browsing {}", next);

        if let Some(root) = InstallationRoot::open(next) {
            tracing::info!("Found installation root at {}", root.path());
            return Ok(Some(root));
        }
    }
}
