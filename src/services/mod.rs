//! Services module - the filesystem work behind WTFCopy.
//!
//! Everything here is independent of the terminal UI. Inputs are explicit parameters,
//! progress goes through [`crate::progress::ProgressReporter`], and failures come back as
//! [`crate::error::WtfError`] instead of ending the process.
//!
//! # Components
//!
//! - [`install_detection`]: validates installation roots, lists the versions present,
//!   knows the default install location per platform, and drives manual browsing.
//! - [`discovery`]: walks `WTF/Account/<account>/<server>/<character>` to enumerate the
//!   identities of a version.
//! - [`migration`]: the [`MigrationService`] that copies configuration between two
//!   identities and invalidates client caches.
//! - [`substitution`]: the [`IdentityRewriter`] used by the migration to update
//!   character/server keys inside saved-variable files.
//!
//! # Usage Example
//!
//! ```ignore
//! use wtfcopy::progress::TracingReporter;
//! use wtfcopy::services::{discover, InstallationRoot, MigrationService};
//!
//! let root = InstallationRoot::open("/Applications/World of Warcraft").unwrap();
//! let retail = discover(root.path(), GameVersion::Retail)?;
//! let report = MigrationService::new()
//!     .migrate(root.path(), &source, &destination, &mut TracingReporter)?;
//! ```

pub mod dir_listing;
pub mod discovery;
pub mod install_detection;
pub mod migration;
pub mod substitution;

pub use discovery::{IdentitySet, discover, identities_for};
pub use install_detection::{
    DirectoryCursor, InstallationRoot, Navigation, Platform, available_versions, browse_start,
    default_installation_path, is_installation_root, locate_installation,
};
pub use migration::{MigrationPhase, MigrationReport, MigrationService};
pub use substitution::IdentityRewriter;
