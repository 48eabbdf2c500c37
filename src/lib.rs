// WTFCopy - Copy World of Warcraft character configuration between characters
//
// This is the library crate containing discovery, migration and supporting types.
// The binary crate (main.rs) provides the interactive terminal entry point.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod progress;
pub mod services;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{ErrorKind, WtfError};
pub use models::{CopyTarget, GameVersion, Identity, UserConfig};
pub use progress::{MigrationEvent, ProgressReporter};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
