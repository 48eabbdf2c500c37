use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Directory under each version that holds all client configuration.
pub const WTF_DIR: &str = "WTF";

/// Directory under [`WTF_DIR`] that holds one directory per account.
pub const ACCOUNT_DIR: &str = "Account";

/// Reserved directory name for add-on data. Never an account or a server.
pub const SAVED_VARIABLES_DIR: &str = "SavedVariables";

/// Marker the client uses to validate its cached settings. Removing it forces a rebuild.
pub const CACHE_MARKER: &str = "cache.md5";

/// Extension of saved-variable files, which are copied and rewritten.
pub const SAVED_VARIABLES_EXTENSION: &str = "lua";

/// Account-wide files: keybindings, account settings and account macros.
pub const ACCOUNT_ARTIFACTS: [&str; 3] =
    ["bindings-cache.wtf", "config-cache.wtf", "macros-cache.txt"];

/// Character files: enabled add-ons, character settings, UI layout and character macros.
pub const CHARACTER_ARTIFACTS: [&str; 4] = [
    "AddOns.txt",
    "config-cache.wtf",
    "layout-local.txt",
    "macros-cache.txt",
];

/// A recognized client installation folder.
///
/// The declaration order is the order versions are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameVersion {
    Retail,
    RetailPtr,
    Classic,
    ClassicPtr,
    ClassicBeta,
    ClassicEra,
    ClassicEraPtr,
}

impl GameVersion {
    pub const ALL: [GameVersion; 7] = [
        GameVersion::Retail,
        GameVersion::RetailPtr,
        GameVersion::Classic,
        GameVersion::ClassicPtr,
        GameVersion::ClassicBeta,
        GameVersion::ClassicEra,
        GameVersion::ClassicEraPtr,
    ];

    /// Folder name inside the installation root, e.g. `_retail_`.
    pub fn folder_name(self) -> &'static str {
        match self {
            GameVersion::Retail => "_retail_",
            GameVersion::RetailPtr => "_ptr_",
            GameVersion::Classic => "_classic_",
            GameVersion::ClassicPtr => "_classic_ptr_",
            GameVersion::ClassicBeta => "_classic_beta_",
            GameVersion::ClassicEra => "_classic_era_",
            GameVersion::ClassicEraPtr => "_classic_era_ptr_",
        }
    }

    /// Human-readable name shown when choosing a version.
    pub fn label(self) -> &'static str {
        match self {
            GameVersion::Retail => "Retail",
            GameVersion::RetailPtr => "Retail PTR",
            GameVersion::Classic => "Classic",
            GameVersion::ClassicPtr => "Classic PTR",
            GameVersion::ClassicBeta => "Classic Beta",
            GameVersion::ClassicEra => "Classic Era",
            GameVersion::ClassicEraPtr => "Classic Era PTR",
        }
    }

    /// Exact, case-sensitive match against a folder name.
    pub fn from_folder_name(name: &str) -> Option<GameVersion> {
        Self::ALL.into_iter().find(|v| v.folder_name() == name)
    }

    /// `<root>/<version>/WTF/Account`
    pub fn account_scope(self, root: &Utf8Path) -> Utf8PathBuf {
        root.join(self.folder_name()).join(WTF_DIR).join(ACCOUNT_DIR)
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One character's configuration namespace, named verbatim after its directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub account: String,
    pub server: String,
    pub character: String,
}

impl Identity {
    pub fn new(
        account: impl Into<String>,
        server: impl Into<String>,
        character: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            server: server.into(),
            character: character.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.character, self.server, self.account)
    }
}

/// Source or destination of a migration: a version plus an identity in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub version: GameVersion,
    pub identity: Identity,
}

impl CopyTarget {
    pub fn new(version: GameVersion, identity: Identity) -> Self {
        Self { version, identity }
    }

    /// `<root>/<version>/WTF/Account/<account>`
    pub fn account_dir(&self, root: &Utf8Path) -> Utf8PathBuf {
        self.version
            .account_scope(root)
            .join(&self.identity.account)
    }

    /// `<root>/<version>/WTF/Account/<account>/<server>/<character>`
    pub fn character_dir(&self, root: &Utf8Path) -> Utf8PathBuf {
        self.account_dir(root)
            .join(&self.identity.server)
            .join(&self.identity.character)
    }
}

impl fmt::Display for CopyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ Version: {}, Account: {}, Server: {}, Character: {} }}",
            self.version, self.identity.account, self.identity.server, self.identity.character
        )
    }
}
