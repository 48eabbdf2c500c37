// Console progress output
//
// Prints each migration event as one line, the way the interactive tool reports
// progress, and forwards it to the log.

use crate::progress::{MigrationEvent, ProgressReporter, log_event};

/// Reporter that prints migration progress to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

/// One-line description of `event`.
pub fn describe(event: &MigrationEvent) -> String {
    match event {
        MigrationEvent::PhaseStarted { phase } => format!("Copying {}", phase),
        MigrationEvent::FileCopied { from, .. } => format!("Copied {}", from),
        MigrationEvent::DirectoryCreated { path } => format!("Created {}", path),
        MigrationEvent::FileRewritten { path, replacements } => {
            format!("Updated {} ({} references)", path, replacements)
        }
        MigrationEvent::CacheRemoved { path } => format!("Removed {}", path),
        MigrationEvent::CacheAbsent { path } => format!("No cache to remove at {}", path),
        MigrationEvent::Failed { phase, message } => {
            format!("Failed during {}: {}", phase, message)
        }
        MigrationEvent::Finished { report } => report.summary(),
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&mut self, event: MigrationEvent) {
        log_event(&event);
        match &event {
            MigrationEvent::Failed { .. } => eprintln!("ERROR  {}", describe(&event)),
            MigrationEvent::CacheAbsent { .. } => {}
            _ => println!("INFO  {}", describe(&event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MigrationPhase;

    #[test]
    fn test_describe() {
        let copied = MigrationEvent::FileCopied {
            from: "src/AddOns.txt".into(),
            to: "dst/AddOns.txt".into(),
            bytes: 3,
        };
        assert_eq!(describe(&copied), "Copied src/AddOns.txt");

        let failed = MigrationEvent::Failed {
            phase: MigrationPhase::CacheInvalidation,
            message: "denied".to_string(),
        };
        assert_eq!(describe(&failed), "Failed during cache invalidation: denied");
    }
}
