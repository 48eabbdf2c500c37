//! Error types shared by the discovery and migration services.
//!
//! The core only distinguishes two situations:
//! - [`ErrorKind::FatalIo`]: a path the algorithm expected to work with could not be
//!   read, written or removed. Nothing is retried and nothing is rolled back.
//! - [`ErrorKind::EmptyResult`]: a version has no character configurations yet. This is
//!   a normal discovery outcome that the caller turns into a "log in first" message.

use crate::models::GameVersion;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io;
use thiserror::Error;

/// Filesystem action that failed, used for error messages and progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    ReadDir,
    Copy,
    Read,
    Write,
    Remove,
    CreateDir,
    Walk,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            IoOp::ReadDir => "list directory",
            IoOp::Copy => "copy",
            IoOp::Read => "read",
            IoOp::Write => "write",
            IoOp::Remove => "remove",
            IoOp::CreateDir => "create directory",
            IoOp::Walk => "walk",
        };
        f.write_str(verb)
    }
}

/// Broad classification of a [`WtfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FatalIo,
    EmptyResult,
}

/// Errors returned by the installation, discovery and migration services
#[derive(Error, Debug)]
pub enum WtfError {
    #[error("Failed to {op} {path}: {source}")]
    Io {
        op: IoOp,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "No character configurations found in {version}. Try logging into a character on this version of the client first"
    )]
    NoIdentities { version: GameVersion },
}

impl WtfError {
    pub fn io(op: IoOp, path: impl AsRef<Utf8Path>, source: io::Error) -> Self {
        WtfError::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WtfError::Io { .. } => ErrorKind::FatalIo,
            WtfError::NoIdentities { .. } => ErrorKind::EmptyResult,
        }
    }
}

pub type Result<T, E = WtfError> = std::result::Result<T, E>;
