// Workflow Controller - drives one interactive migration from start to finish
//
// This module contains the WorkflowController which coordinates between:
// - the Selector (user choices and status lines)
// - install detection (default location, remembered location, manual browsing)
// - discovery (identities of the chosen versions)
// - the MigrationService (file work)
//
// It never exits the process. The result is a RunOutcome that main() turns into an
// exit code.

use crate::config::ConfigManager;
use crate::error::WtfError;
use crate::models::{CopyTarget, GameVersion};
use crate::progress::ProgressReporter;
use crate::services::{
    IdentitySet, InstallationRoot, MigrationReport, MigrationService, Navigation, Platform,
    browse_start, default_installation_path, discover, locate_installation,
};
use crate::ui::prompt::{Notice, PromptError, Selector};
use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Option offered while browsing to go to the parent directory
pub const GO_UP_OPTION: &str = ".. (go back)";

/// How an interactive run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every migration phase completed
    Completed(MigrationReport),

    /// The user backed out before anything was written
    Cancelled,

    /// The chosen version has no character configurations yet
    NoIdentities(GameVersion),
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed(_) => 0,
            RunOutcome::Cancelled | RunOutcome::NoIdentities(_) => 1,
        }
    }
}

/// Errors that stop the workflow
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Wtf(#[from] WtfError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Which side of the migration is being chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Destination,
}

impl Role {
    fn preposition(self) -> &'static str {
        match self {
            Role::Source => "from",
            Role::Destination => "to",
        }
    }
}

/// Inputs that decide where the installation is looked for
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub platform: Platform,
    pub home_dir: Option<PathBuf>,
    /// Root given on the command line
    pub root_override: Option<Utf8PathBuf>,
    /// Root remembered from an earlier run
    pub remembered_root: Option<Utf8PathBuf>,
    /// Where manual browsing starts instead of the drive or filesystem root
    pub browse_from: Option<Utf8PathBuf>,
}

impl WorkflowOptions {
    pub fn for_current_platform() -> Self {
        Self {
            platform: Platform::current(),
            home_dir: dirs::home_dir(),
            root_override: None,
            remembered_root: None,
            browse_from: None,
        }
    }
}

/// Interactive workflow: locate the installation, choose source and destination,
/// confirm, then migrate.
pub struct WorkflowController<S: Selector> {
    selector: S,
    options: WorkflowOptions,
    config_manager: Option<ConfigManager>,
    service: MigrationService,
}

impl<S: Selector> WorkflowController<S> {
    pub fn new(selector: S, options: WorkflowOptions) -> Self {
        Self {
            selector,
            options,
            config_manager: None,
            service: MigrationService::new(),
        }
    }

    /// Save the confirmed installation root through `config_manager`.
    pub fn with_config_manager(mut self, config_manager: ConfigManager) -> Self {
        self.config_manager = Some(config_manager);
        self
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Run the whole workflow.
    ///
    /// Cancellation and versions without characters are outcomes, not errors. Fatal
    /// filesystem errors and broken prompts are returned as errors.
    pub fn run(
        &mut self,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<RunOutcome, WorkflowError> {
        match self.run_steps(reporter) {
            Ok(outcome) => Ok(outcome),
            Err(WorkflowError::Prompt(PromptError::Cancelled)) => {
                tracing::info!("Cancelled by user");
                Ok(RunOutcome::Cancelled)
            }
            Err(WorkflowError::Wtf(WtfError::NoIdentities { version })) => {
                let message = WtfError::NoIdentities { version }.to_string();
                self.selector.notify(Notice::Error, &message);
                Ok(RunOutcome::NoIdentities(version))
            }
            Err(e) => {
                self.selector.notify(Notice::Error, &e.to_string());
                Err(e)
            }
        }
    }

    fn run_steps(
        &mut self,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<RunOutcome, WorkflowError> {
        let Some(root) = self.resolve_root()? else {
            return Ok(RunOutcome::Cancelled);
        };
        self.selector.notify(
            Notice::Info,
            &format!("WoW Install Directory: {}", root.path()),
        );

        let versions = root.available_versions()?;

        self.selector.notify(
            Notice::Info,
            "First, pick the Version, Account, Server, and Character to copy configuration data from.",
        );
        let source = self.select_target(&root, &versions, Role::Source)?;

        self.selector.notify(
            Notice::Info,
            "Next, pick the Version, Account, Server, and Character to apply that configuration data to.",
        );
        let destination = self.select_target(&root, &versions, Role::Destination)?;

        self.selector.notify(Notice::Info, &format!("Source: {}", source));
        self.selector
            .notify(Notice::Info, &format!("Destination: {}", destination));

        if source == destination {
            self.selector.notify(
                Notice::Warning,
                "Source and destination are the same character, nothing to copy.",
            );
            return Ok(RunOutcome::Cancelled);
        }

        let question = format!(
            "Overwrite {}-{}'s Keybindings, Macros, and SavedVariables? This can cause data loss - make a backup if unsure!",
            destination.identity.character, destination.identity.server
        );
        if !self.selector.confirm(&question, false)? {
            return Ok(RunOutcome::Cancelled);
        }

        let report = self
            .service
            .migrate(root.path(), &source, &destination, reporter)?;
        self.selector
            .notify(Notice::Success, "All files copied successfully!");
        Ok(RunOutcome::Completed(report))
    }

    /// Find the installation root: command line, remembered, platform default, then browsing.
    fn resolve_root(&mut self) -> Result<Option<InstallationRoot>, WorkflowError> {
        if let Some(path) = self.options.root_override.clone() {
            match InstallationRoot::open(path.clone()) {
                Some(root) => {
                    self.remember(&root);
                    return Ok(Some(root));
                }
                None => self.selector.notify(
                    Notice::Warning,
                    &format!("{} does not contain a WoW installation", path),
                ),
            }
        }

        let candidates = [
            self.options.remembered_root.clone(),
            default_installation_path(self.options.platform, self.options.home_dir.as_deref()),
        ];
        let detected = candidates.into_iter().flatten().find_map(InstallationRoot::open);

        let root = match detected {
            Some(root) => {
                self.selector.notify(
                    Notice::Success,
                    &format!("Found WoW install. Location: {}", root.path()),
                );
                if self.selector.confirm("Is this directory correct?", true)? {
                    Some(root)
                } else {
                    self.browse()?
                }
            }
            None => self.browse()?,
        };

        if let Some(root) = &root {
            self.remember(root);
        }
        Ok(root)
    }

    fn browse(&mut self) -> Result<Option<InstallationRoot>, WorkflowError> {
        let start = match self.options.browse_from.clone() {
            Some(dir) => dir,
            None => {
                let drive = match self.options.platform {
                    Platform::Windows => {
                        Some(self.selector.text("Which drive is WoW located on? e.g. C, D")?)
                    }
                    _ => None,
                };
                browse_start(self.options.platform, drive.as_deref())
            }
        };
        let selector = &mut self.selector;

        locate_installation::<_, WorkflowError>(start, |current, children| {
            let mut options = vec![GO_UP_OPTION.to_string()];
            options.extend(children.iter().cloned());

            let prompt = format!("Select a WoW Install directory (in {})", current);
            let choice = selector.select(&prompt, &options)?;
            Ok(if choice == GO_UP_OPTION {
                Navigation::Ascend
            } else {
                Navigation::Descend(choice)
            })
        })
    }

    fn remember(&self, root: &InstallationRoot) {
        if let Some(manager) = &self.config_manager {
            if let Err(e) = manager.remember_install_directory(root.path()) {
                tracing::warn!("Could not save install directory: {:#}", e);
            }
        }
    }

    /// Choose version, account, server and character for one side of the migration.
    fn select_target(
        &mut self,
        root: &InstallationRoot,
        versions: &[GameVersion],
        role: Role,
    ) -> Result<CopyTarget, WorkflowError> {
        let preposition = role.preposition();

        let labels: Vec<String> = versions.iter().map(|v| version_option(*v)).collect();
        let chosen = self
            .selector
            .select(&format!("WoW Version to copy {}", preposition), &labels)?;
        let version = versions
            .iter()
            .zip(&labels)
            .find_map(|(v, label)| (*label == chosen).then_some(*v))
            .ok_or_else(|| invalid_choice(&chosen))?;

        let identities: IdentitySet = discover(root.path(), version)?;

        let account = self.choose(
            &format!("Account to copy {}", preposition),
            identities.accounts(),
        )?;
        let server = self.choose(
            &format!("Server to copy {}", preposition),
            identities.servers(&account),
        )?;
        let character = self.choose(
            &format!("Character to copy {}", preposition),
            identities.characters(&account, &server),
        )?;

        let identity = identities
            .find(&account, &server, &character)
            .cloned()
            .ok_or_else(|| invalid_choice(&character))?;
        Ok(CopyTarget::new(version, identity))
    }

    /// Ask for one of `options` and make sure the answer is one of them.
    fn choose(&mut self, prompt: &str, options: Vec<String>) -> Result<String, WorkflowError> {
        let choice = self.selector.select(prompt, &options)?;
        if options.contains(&choice) {
            Ok(choice)
        } else {
            Err(invalid_choice(&choice))
        }
    }
}

/// Option text for a version, e.g. `Retail (_retail_)`
pub fn version_option(version: GameVersion) -> String {
    format!("{} ({})", version.label(), version.folder_name())
}

fn invalid_choice(choice: &str) -> WorkflowError {
    WorkflowError::Prompt(PromptError::Failed(format!(
        "'{}' is not one of the offered options",
        choice
    )))
}
