//! WTFCopy - Copy World of Warcraft character configuration
//!
//! Main entry point for the interactive terminal tool.
//!
//! # Overview
//!
//! This binary wires the library together:
//! - Configuration loading ([`ConfigManager`], `wtfcopy.yaml` + `WTFCOPY_*` variables)
//! - Logging infrastructure (rotating file logs + warnings on stderr)
//! - The interactive workflow ([`WorkflowController`] with [`InquireSelector`])
//!
//! # Execution Flow
//!
//! 1. Parse command line arguments
//! 2. Load the user configuration
//! 3. Initialize logging → `<config dir>/logs/wtfcopy.<date>`
//! 4. Locate the installation (command line, remembered, default, or browsing)
//! 5. Pick source and destination characters, confirm, migrate
//! 6. Optionally wait for Enter, then exit
//!
//! # Exit Codes
//!
//! - `0`: migration completed
//! - `1`: cancelled, declined, or the chosen version has no characters
//! - `2`: fatal error

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::{self, BufRead};
use std::process::ExitCode;
use wtfcopy::ui::{ConsoleReporter, InquireSelector, WorkflowController, WorkflowOptions};
use wtfcopy::{APP_NAME, ConfigManager, VERSION};

/// Copy keybindings, macros, UI layout and add-on settings between WoW characters
#[derive(Parser, Debug)]
#[command(name = "wtfcopy", version, about)]
struct Cli {
    /// Installation root (the folder containing _retail_, _classic_, ...)
    #[arg(long)]
    root: Option<Utf8PathBuf>,

    /// Where to start browsing when no installation is found
    #[arg(long)]
    browse_from: Option<Utf8PathBuf>,

    /// Directory holding wtfcopy.yaml
    #[arg(long)]
    config_dir: Option<Utf8PathBuf>,

    /// Directory for log files [default: <config dir>/logs]
    #[arg(long)]
    log_dir: Option<Utf8PathBuf>,

    /// Verbose logging, also shown on the console
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Until the user config is loaded, pause where a double-clicked console would close
    let mut pause_on_exit = cfg!(windows);
    let result = run(cli, &mut pause_on_exit);

    ExitCode::from(finish(result, pause_on_exit, pause))
}

/// Report a fatal error, wait for Enter when asked to, and pick the exit code.
fn finish(result: Result<u8>, pause_on_exit: bool, wait: impl FnOnce() -> Result<()>) -> u8 {
    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Fatal error: {:#}", e);
            eprintln!("Error: {:#}", e);
            2
        }
    };

    if pause_on_exit {
        if let Err(e) = wait() {
            tracing::warn!("{:#}", e);
        }
    }
    code
}

fn run(cli: Cli, pause_on_exit: &mut bool) -> Result<u8> {
    let config_dir = cli.config_dir.unwrap_or_else(ConfigManager::default_dir);
    let config_manager = ConfigManager::new(&config_dir)?;
    let user_config = config_manager.load_user_config()?;
    *pause_on_exit = user_config.pause_on_exit;

    let debug_mode = cli.debug || user_config.debug_mode;
    let log_dir = cli.log_dir.unwrap_or_else(|| config_dir.join("logs"));
    let _guard = wtfcopy::logging::setup_logging(&log_dir, APP_NAME, debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let options = WorkflowOptions {
        root_override: cli.root,
        browse_from: cli.browse_from,
        remembered_root: user_config.install_directory.clone(),
        ..WorkflowOptions::for_current_platform()
    };
    let mut controller =
        WorkflowController::new(InquireSelector, options).with_config_manager(config_manager);

    let outcome = controller
        .run(&mut ConsoleReporter)
        .context("WTFCopy stopped, files copied before the error were kept")?;
    tracing::info!("Finished with {:?}", outcome);

    Ok(outcome.exit_code())
}

/// Keep a double-clicked console window open until Enter is pressed
fn pause() -> Result<()> {
    println!("Press Enter to continue...");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::Cell;

    #[test]
    fn test_fatal_error_still_pauses() {
        let paused = Cell::new(false);
        let code = finish(Err(anyhow!("disk gone")), true, || {
            paused.set(true);
            Ok(())
        });

        assert_eq!(code, 2);
        assert!(paused.get());
    }

    #[test]
    fn test_outcome_code_is_kept() {
        let paused = Cell::new(false);
        let code = finish(Ok(1), false, || {
            paused.set(true);
            Ok(())
        });

        assert_eq!(code, 1);
        assert!(!paused.get());
    }

    #[test]
    fn test_failed_pause_does_not_change_code() {
        assert_eq!(finish(Ok(0), true, || Err(anyhow!("stdin closed"))), 0);
    }
}
