// Progress reporting
//
// The migration engine reports every file operation and every fatal error through
// the ProgressReporter trait. The terminal UI prints them, tests record them, and
// TracingReporter only logs them.

use crate::services::migration::{MigrationPhase, MigrationReport};
use camino::Utf8PathBuf;

/// Events emitted while a migration runs
#[derive(Clone, Debug, PartialEq)]
pub enum MigrationEvent {
    /// A phase is about to start
    PhaseStarted { phase: MigrationPhase },

    /// A file was copied over its destination
    FileCopied {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        bytes: u64,
    },

    /// A destination directory had to be created
    DirectoryCreated { path: Utf8PathBuf },

    /// A saved-variable file had identity references rewritten
    FileRewritten {
        path: Utf8PathBuf,
        replacements: usize,
    },

    /// A cache marker was deleted
    CacheRemoved { path: Utf8PathBuf },

    /// There was no cache marker to delete
    CacheAbsent { path: Utf8PathBuf },

    /// A fatal error stopped the migration during `phase`
    Failed {
        phase: MigrationPhase,
        message: String,
    },

    /// All phases finished
    Finished { report: MigrationReport },
}

/// Receiver of [`MigrationEvent`]s.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressReporter {
    fn report(&mut self, event: MigrationEvent);
}

/// Reporter that only writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&mut self, event: MigrationEvent) {
        log_event(&event);
    }
}

/// Reporter that keeps every event, for summaries and tests.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<MigrationEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MigrationEvent] {
        &self.events
    }

    /// Destination paths of every copied file, in order
    pub fn copied(&self) -> Vec<&Utf8PathBuf> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MigrationEvent::FileCopied { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Phases that were started, in order
    pub fn phases(&self) -> Vec<MigrationPhase> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MigrationEvent::PhaseStarted { phase } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    pub fn failure(&self) -> Option<&MigrationEvent> {
        self.events
            .iter()
            .find(|e| matches!(e, MigrationEvent::Failed { .. }))
    }
}

impl ProgressReporter for EventLog {
    fn report(&mut self, event: MigrationEvent) {
        log_event(&event);
        self.events.push(event);
    }
}

/// Write `event` to the log at a level matching its severity.
pub fn log_event(event: &MigrationEvent) {
    match event {
        MigrationEvent::PhaseStarted { phase } => tracing::info!("Starting: {}", phase),
        MigrationEvent::FileCopied { from, to, bytes } => {
            tracing::info!("Copied {} -> {} ({} bytes)", from, to, bytes)
        }
        MigrationEvent::DirectoryCreated { path } => tracing::info!("Created {}", path),
        MigrationEvent::FileRewritten { path, replacements } => {
            tracing::info!("Rewrote {} identity references in {}", replacements, path)
        }
        MigrationEvent::CacheRemoved { path } => tracing::info!("Removed {}", path),
        MigrationEvent::CacheAbsent { path } => tracing::debug!("No cache marker at {}", path),
        MigrationEvent::Failed { phase, message } => {
            tracing::error!("Migration failed during {}: {}", phase, message)
        }
        MigrationEvent::Finished { report } => {
            tracing::info!("Migration finished: {}", report.summary())
        }
    }
}
