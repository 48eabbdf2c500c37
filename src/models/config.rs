use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// User configuration from `wtfcopy.yaml`
///
/// Every field can also be set through a `WTFCOPY_<FIELD>` environment variable,
/// e.g. `WTFCOPY_DEBUG_MODE=true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Last installation root the user confirmed
    #[serde(default)]
    pub install_directory: Option<Utf8PathBuf>,

    #[serde(default = "default_true")]
    pub remember_install_directory: bool,

    #[serde(default)]
    pub debug_mode: bool,

    /// Wait for Enter before exiting so a double-clicked console window stays open
    #[serde(default = "default_pause_on_exit")]
    pub pause_on_exit: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            install_directory: None,
            remember_install_directory: true,
            debug_mode: false,
            pause_on_exit: default_pause_on_exit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pause_on_exit() -> bool {
    cfg!(target_os = "windows")
}
