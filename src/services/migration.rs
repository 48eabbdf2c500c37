use crate::error::{IoOp, Result, WtfError};
use crate::models::{
    ACCOUNT_ARTIFACTS, CACHE_MARKER, CHARACTER_ARTIFACTS, CopyTarget, SAVED_VARIABLES_DIR,
    SAVED_VARIABLES_EXTENSION,
};
use crate::progress::{MigrationEvent, ProgressReporter};
use crate::services::dir_listing::{display_path, read_children};
use crate::services::substitution::IdentityRewriter;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Steps of a migration, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    AccountFiles,
    CharacterFiles,
    AccountSavedVariables,
    CharacterSavedVariables,
    IdentitySubstitution,
    CacheInvalidation,
}

impl MigrationPhase {
    pub const ALL: [MigrationPhase; 6] = [
        MigrationPhase::AccountFiles,
        MigrationPhase::CharacterFiles,
        MigrationPhase::AccountSavedVariables,
        MigrationPhase::CharacterSavedVariables,
        MigrationPhase::IdentitySubstitution,
        MigrationPhase::CacheInvalidation,
    ];
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationPhase::AccountFiles => "account configuration",
            MigrationPhase::CharacterFiles => "character configuration",
            MigrationPhase::AccountSavedVariables => "account saved variables",
            MigrationPhase::CharacterSavedVariables => "character saved variables",
            MigrationPhase::IdentitySubstitution => "identity substitution",
            MigrationPhase::CacheInvalidation => "cache invalidation",
        };
        f.write_str(name)
    }
}

/// Totals for a completed migration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub files_rewritten: usize,
    pub references_rewritten: usize,
    pub caches_removed: usize,
}

impl MigrationReport {
    pub fn summary(&self) -> String {
        format!(
            "{} files copied ({} bytes), {} references rewritten in {} files, {} cache markers removed",
            self.files_copied,
            self.bytes_copied,
            self.references_rewritten,
            self.files_rewritten,
            self.caches_removed
        )
    }
}

/// Service for copying configuration from one character to another
///
/// A migration runs six phases in order (see [`MigrationPhase`]):
/// 1. Copy the fixed account files (`bindings-cache.wtf`, `config-cache.wtf`,
///    `macros-cache.txt`)
/// 2. Copy the fixed character files (`AddOns.txt`, `config-cache.wtf`,
///    `layout-local.txt`, `macros-cache.txt`)
/// 3. Copy every `*.lua` file in the account `SavedVariables` directory
/// 4. Copy every `*.lua` file in the character `SavedVariables` directory
/// 5. Rewrite source character/server references in every `*.lua` file under the
///    destination account directory
/// 6. Delete `cache.md5` at the destination account and character directories
///
/// The first error stops the run. Files written by earlier phases stay on disk.
pub struct MigrationService {
    /// Matches saved-variable file names (`*.lua`)
    saved_variables_pattern: Regex,
}

impl MigrationService {
    pub fn new() -> Self {
        let pattern = format!(r"\.{}$", regex::escape(SAVED_VARIABLES_EXTENSION));
        Self {
            saved_variables_pattern: Regex::new(&pattern).expect("Invalid saved variables regex"),
        }
    }

    /// Whether `file_name` is a saved-variable file
    pub fn is_saved_variables_file(&self, file_name: &str) -> bool {
        self.saved_variables_pattern.is_match(file_name)
    }

    /// Copy `source`'s configuration over `destination`'s.
    ///
    /// # Errors
    ///
    /// Returns [`WtfError::Io`] for the first file or directory that cannot be read,
    /// copied, written or removed. A missing cache marker is not an error.
    pub fn migrate(
        &self,
        root: &Utf8Path,
        source: &CopyTarget,
        destination: &CopyTarget,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<MigrationReport> {
        tracing::info!("Migrating {} -> {}", source, destination);

        let mut run = MigrationRun {
            service: self,
            rewriter: IdentityRewriter::new(&source.identity, &destination.identity),
            src_account: source.account_dir(root),
            dst_account: destination.account_dir(root),
            src_character: source.character_dir(root),
            dst_character: destination.character_dir(root),
            report: MigrationReport::default(),
            reporter,
        };

        for phase in MigrationPhase::ALL {
            run.reporter.report(MigrationEvent::PhaseStarted { phase });
            if let Err(e) = run.run_phase(phase) {
                run.reporter.report(MigrationEvent::Failed {
                    phase,
                    message: e.to_string(),
                });
                return Err(e);
            }
        }

        let report = run.report;
        run.reporter.report(MigrationEvent::Finished {
            report: report.clone(),
        });
        Ok(report)
    }
}

impl Default for MigrationService {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one migration in progress
struct MigrationRun<'a> {
    service: &'a MigrationService,
    rewriter: IdentityRewriter,
    src_account: Utf8PathBuf,
    dst_account: Utf8PathBuf,
    src_character: Utf8PathBuf,
    dst_character: Utf8PathBuf,
    report: MigrationReport,
    reporter: &'a mut dyn ProgressReporter,
}

impl MigrationRun<'_> {
    fn run_phase(&mut self, phase: MigrationPhase) -> Result<()> {
        match phase {
            MigrationPhase::AccountFiles => {
                let (src, dst) = (self.src_account.clone(), self.dst_account.clone());
                self.copy_named(&src, &dst, &ACCOUNT_ARTIFACTS)
            }
            MigrationPhase::CharacterFiles => {
                let (src, dst) = (self.src_character.clone(), self.dst_character.clone());
                self.copy_named(&src, &dst, &CHARACTER_ARTIFACTS)
            }
            MigrationPhase::AccountSavedVariables => {
                let (src, dst) = (self.src_account.clone(), self.dst_account.clone());
                self.copy_saved_variables(&src, &dst)
            }
            MigrationPhase::CharacterSavedVariables => {
                let (src, dst) = (self.src_character.clone(), self.dst_character.clone());
                self.copy_saved_variables(&src, &dst)
            }
            MigrationPhase::IdentitySubstitution => self.rewrite_identities(),
            MigrationPhase::CacheInvalidation => {
                let account_marker = self.dst_account.join(CACHE_MARKER);
                let character_marker = self.dst_character.join(CACHE_MARKER);
                self.remove_cache_marker(&account_marker)?;
                self.remove_cache_marker(&character_marker)
            }
        }
    }

    fn copy_named(&mut self, src_dir: &Utf8Path, dst_dir: &Utf8Path, names: &[&str]) -> Result<()> {
        for name in names {
            self.copy_file(src_dir.join(name).as_std_path(), dst_dir.join(name).as_std_path())?;
        }
        Ok(())
    }

    /// Copy the `*.lua` files of `<src_dir>/SavedVariables`. The source directory must exist.
    ///
    /// File names that are not valid UTF-8 are copied as they are.
    fn copy_saved_variables(&mut self, src_dir: &Utf8Path, dst_dir: &Utf8Path) -> Result<()> {
        let src_sv = src_dir.join(SAVED_VARIABLES_DIR);
        let dst_sv = dst_dir.join(SAVED_VARIABLES_DIR);

        let listing = read_children(&src_sv)?;
        let mut files: Vec<OsString> = listing
            .children
            .into_iter()
            .filter(|c| !c.is_dir && self.service.is_saved_variables_file(&c.name))
            .map(|c| OsString::from(c.name))
            .collect();
        files.extend(
            listing
                .raw_children
                .into_iter()
                .filter(|c| {
                    !c.is_dir && self.service.is_saved_variables_file(&c.name.to_string_lossy())
                })
                .map(|c| c.name),
        );

        if files.is_empty() {
            tracing::debug!("No saved variables in {}", src_sv);
            return Ok(());
        }

        if !dst_sv.is_dir() {
            fs::create_dir_all(&dst_sv).map_err(|e| WtfError::io(IoOp::CreateDir, &dst_sv, e))?;
            self.reporter
                .report(MigrationEvent::DirectoryCreated { path: dst_sv.clone() });
        }

        for name in files {
            let from = src_sv.as_std_path().join(&name);
            let to = dst_sv.as_std_path().join(&name);
            self.copy_file(&from, &to)?;
        }
        Ok(())
    }

    fn copy_file(&mut self, from: &Path, to: &Path) -> Result<()> {
        // Copying a file onto itself would truncate it
        if from == to {
            tracing::warn!(
                "Source and destination are the same file, skipping {}",
                from.display()
            );
            return Ok(());
        }

        let bytes =
            fs::copy(from, to).map_err(|e| WtfError::io(IoOp::Copy, display_path(from), e))?;
        self.report.files_copied += 1;
        self.report.bytes_copied += bytes;
        self.reporter.report(MigrationEvent::FileCopied {
            from: display_path(from),
            to: display_path(to),
            bytes,
        });
        Ok(())
    }

    /// Rewrite identity references in every saved-variable file under the destination
    /// account, character directories included.
    fn rewrite_identities(&mut self) -> Result<()> {
        let walker = WalkDir::new(&self.dst_account).sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(display_path)
                    .unwrap_or_else(|| self.dst_account.clone());
                WtfError::io(IoOp::Walk, path, io::Error::from(e))
            })?;

            let is_saved_variables = entry.file_type().is_file()
                && self
                    .service
                    .is_saved_variables_file(&entry.file_name().to_string_lossy());
            if is_saved_variables {
                self.rewrite_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn rewrite_file(&mut self, path: &Path) -> Result<()> {
        let data = fs::read(path).map_err(|e| WtfError::io(IoOp::Read, display_path(path), e))?;

        let rewritten = match self.rewriter.rewrite(&data) {
            Cow::Borrowed(_) => return Ok(()),
            Cow::Owned(rewritten) => rewritten,
        };
        let replacements = self.rewriter.count_matches(&data);

        fs::write(path, &rewritten)
            .map_err(|e| WtfError::io(IoOp::Write, display_path(path), e))?;
        self.report.files_rewritten += 1;
        self.report.references_rewritten += replacements;
        self.reporter.report(MigrationEvent::FileRewritten {
            path: display_path(path),
            replacements,
        });
        Ok(())
    }

    fn remove_cache_marker(&mut self, path: &Utf8Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                self.report.caches_removed += 1;
                self.reporter
                    .report(MigrationEvent::CacheRemoved { path: path.to_path_buf() });
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.reporter
                    .report(MigrationEvent::CacheAbsent { path: path.to_path_buf() });
                Ok(())
            }
            Err(e) => Err(WtfError::io(IoOp::Remove, path, e)),
        }
    }
}
