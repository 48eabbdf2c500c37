//! Data models for WTFCopy.
//!
//! - [`GameVersion`]: the closed set of client folders (`_retail_`, `_classic_era_`, ...)
//! - [`Identity`]: an (account, server, character) triple discovered on disk
//! - [`CopyTarget`]: a version plus an identity, used as migration source or destination
//! - [`UserConfig`]: user preferences loaded from `wtfcopy.yaml`
//!
//! The layout constants (`ACCOUNT_ARTIFACTS`, `SAVED_VARIABLES_DIR`, ...) mirror the
//! client's own file layout and must match it exactly.

pub mod config;
pub mod install;

pub use config::UserConfig;
pub use install::{
    ACCOUNT_ARTIFACTS, ACCOUNT_DIR, CACHE_MARKER, CHARACTER_ARTIFACTS, CopyTarget, GameVersion,
    Identity, SAVED_VARIABLES_DIR, SAVED_VARIABLES_EXTENSION, WTF_DIR,
};
