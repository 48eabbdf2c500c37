//! Integration tests for the migration engine
//!
//! These tests verify:
//! - Fixed artifacts and saved variables are copied over the destination
//! - Identity references are rewritten in every saved-variable file of the destination account
//! - Fatal errors stop later phases and keep earlier copies (no rollback)
//! - Cache markers are removed, and their absence is not an error
//! - Re-running a migration gives the same result

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;
use walkdir::WalkDir;
use wtfcopy::error::IoOp;
use wtfcopy::models::{ACCOUNT_ARTIFACTS, CACHE_MARKER, CHARACTER_ARTIFACTS};
use wtfcopy::progress::{EventLog, MigrationEvent};
use wtfcopy::services::{MigrationPhase, MigrationService};
use wtfcopy::{CopyTarget, ErrorKind, GameVersion, Identity, WtfError};

struct Install {
    _temp: TempDir,
    root: Utf8PathBuf,
    source: CopyTarget,
    destination: CopyTarget,
}

impl Install {
    fn src_account(&self) -> Utf8PathBuf {
        self.source.account_dir(&self.root)
    }

    fn src_character(&self) -> Utf8PathBuf {
        self.source.character_dir(&self.root)
    }

    fn dst_account(&self) -> Utf8PathBuf {
        self.destination.account_dir(&self.root)
    }

    fn dst_character(&self) -> Utf8PathBuf {
        self.destination.character_dir(&self.root)
    }

    fn migrate(&self) -> (Result<wtfcopy::services::MigrationReport, WtfError>, EventLog) {
        let mut log = EventLog::new();
        let result =
            MigrationService::new().migrate(&self.root, &self.source, &self.destination, &mut log);
        (result, log)
    }
}

/// Retail Alice-Realm1 on ACC1 copied to Classic Bob-Realm2 on ACC2, all source files present
fn create_install() -> Install {
    let install = create_install_between(
        CopyTarget::new(GameVersion::Retail, Identity::new("ACC1", "Realm1", "Alice")),
        CopyTarget::new(GameVersion::Classic, Identity::new("ACC2", "Realm2", "Bob")),
    );

    fs::write(
        install.src_account().join("SavedVariables/Bartender4.lua"),
        "Bartender4DB = {\n[\"profileKeys\"] = {\n[\"Alice - Realm1\"] = \"Alice - Realm1\",\n},\n}\n",
    )
    .unwrap();
    fs::write(
        install.src_account().join("SavedVariables/Plain.lua"),
        "PlainDB = { [\"enabled\"] = true }\n",
    )
    .unwrap();
    fs::write(
        install.src_account().join("SavedVariables/Bartender4.lua.bak"),
        "backup",
    )
    .unwrap();
    fs::write(
        install.src_character().join("SavedVariables/Details.lua"),
        "DetailsDB = { [\"Alice-Realm1\"] = 1, [\"Realm1 - Alice\"] = 2 }\n",
    )
    .unwrap();

    install
}

/// Both characters on disk, with the fixed artifacts present for `source`
fn create_install_between(source: CopyTarget, destination: CopyTarget) -> Install {
    let temp = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();

    for target in [&source, &destination] {
        fs::create_dir_all(target.account_dir(&root).join("SavedVariables")).unwrap();
        fs::create_dir_all(target.character_dir(&root).join("SavedVariables")).unwrap();
    }

    let install = Install {
        _temp: temp,
        root,
        source,
        destination,
    };

    for name in ACCOUNT_ARTIFACTS {
        fs::write(install.src_account().join(name), format!("source account {name}")).unwrap();
    }
    for name in CHARACTER_ARTIFACTS {
        fs::write(
            install.src_character().join(name),
            format!("source character {name}"),
        )
        .unwrap();
    }

    install
}

fn snapshot(dir: &Utf8Path) -> BTreeMap<Utf8PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let path = Utf8PathBuf::try_from(e.path().to_path_buf()).unwrap();
            let data = fs::read(&path).unwrap();
            (path, data)
        })
        .collect()
}

#[test]
fn test_fixed_artifacts_are_copied() {
    let install = create_install();
    fs::write(install.dst_account().join("config-cache.wtf"), "old destination").unwrap();

    let (result, _log) = install.migrate();
    result.unwrap();

    for name in ACCOUNT_ARTIFACTS {
        assert_eq!(
            fs::read_to_string(install.dst_account().join(name)).unwrap(),
            format!("source account {name}")
        );
    }
    for name in CHARACTER_ARTIFACTS {
        assert_eq!(
            fs::read_to_string(install.dst_character().join(name)).unwrap(),
            format!("source character {name}")
        );
    }
}

#[test]
fn test_only_lua_saved_variables_are_copied() {
    let install = create_install();

    let (result, _log) = install.migrate();
    let report = result.unwrap();

    assert!(install.dst_account().join("SavedVariables/Bartender4.lua").exists());
    assert!(install.dst_account().join("SavedVariables/Plain.lua").exists());
    assert!(!install.dst_account().join("SavedVariables/Bartender4.lua.bak").exists());
    assert!(install.dst_character().join("SavedVariables/Details.lua").exists());

    // 3 account + 4 character + 2 account lua + 1 character lua
    assert_eq!(report.files_copied, 10);
}

#[test]
fn test_identity_references_are_rewritten() {
    let install = create_install();

    let (result, _log) = install.migrate();
    let report = result.unwrap();

    let details =
        fs::read_to_string(install.dst_character().join("SavedVariables/Details.lua")).unwrap();
    assert!(details.contains("\"Bob-Realm2\""));
    assert!(details.contains("\"Realm2 - Bob\""));
    assert!(!details.contains("Alice-Realm1"));
    assert!(!details.contains("Realm1 - Alice"));

    let bartender =
        fs::read_to_string(install.dst_account().join("SavedVariables/Bartender4.lua")).unwrap();
    assert_eq!(
        bartender,
        "Bartender4DB = {\n[\"profileKeys\"] = {\n[\"Bob - Realm2\"] = \"Bob - Realm2\",\n},\n}\n"
    );

    assert_eq!(report.files_rewritten, 2);
    assert_eq!(report.references_rewritten, 4);
}

#[test]
fn test_file_without_references_is_byte_identical() {
    let install = create_install();

    let (result, log) = install.migrate();
    result.unwrap();

    let plain = install.dst_account().join("SavedVariables/Plain.lua");
    assert_eq!(fs::read_to_string(&plain).unwrap(), "PlainDB = { [\"enabled\"] = true }\n");
    assert!(!log.events().iter().any(|e| matches!(
        e,
        MigrationEvent::FileRewritten { path, .. } if *path == plain
    )));
}

#[test]
fn test_substitution_covers_other_characters_of_destination_account() {
    let install = create_install();
    let sibling = install.dst_account().join("Realm2/Carol/SavedVariables");
    fs::create_dir_all(&sibling).unwrap();
    fs::write(sibling.join("Shared.lua"), "owner = \"Alice-Realm1\"").unwrap();

    let (result, _log) = install.migrate();
    result.unwrap();

    assert_eq!(
        fs::read_to_string(sibling.join("Shared.lua")).unwrap(),
        "owner = \"Bob-Realm2\""
    );
}

#[test]
fn test_source_is_not_modified() {
    let install = create_install();
    let before = snapshot(&install.src_account());

    let (result, _log) = install.migrate();
    result.unwrap();

    assert_eq!(snapshot(&install.src_account()), before);
}

#[test]
fn test_migration_is_idempotent() {
    let install = create_install();

    let (first, _log) = install.migrate();
    first.unwrap();
    let after_first = snapshot(&install.dst_account());

    let (second, _log) = install.migrate();
    second.unwrap();
    let after_second = snapshot(&install.dst_account());

    assert_eq!(after_first, after_second);
}

#[test]
fn test_missing_artifact_aborts_without_rollback() {
    let install = create_install();
    fs::remove_file(install.src_account().join("config-cache.wtf")).unwrap();

    let (result, log) = install.migrate();
    let err = result.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalIo);
    assert!(matches!(err, WtfError::Io { op: IoOp::Copy, .. }));

    // bindings-cache.wtf comes first and stays copied
    assert!(install.dst_account().join("bindings-cache.wtf").exists());
    assert!(!install.dst_account().join("macros-cache.txt").exists());
    assert!(!install.dst_character().join("AddOns.txt").exists());
    assert_eq!(log.phases(), [MigrationPhase::AccountFiles]);
}

#[test]
fn test_missing_saved_variables_directory_is_fatal() {
    let install = create_install();
    fs::remove_dir_all(install.src_character().join("SavedVariables")).unwrap();

    let (result, log) = install.migrate();
    let err = result.unwrap_err();

    assert!(matches!(err, WtfError::Io { op: IoOp::ReadDir, .. }));
    // Earlier phases completed and were kept
    assert!(install.dst_character().join("layout-local.txt").exists());
    assert!(install.dst_account().join("SavedVariables/Plain.lua").exists());
    assert_eq!(log.phases().last(), Some(&MigrationPhase::CharacterSavedVariables));
}

#[test]
fn test_empty_saved_variables_directory_is_fine() {
    let install = create_install();
    let sv = install.src_character().join("SavedVariables");
    fs::remove_dir_all(&sv).unwrap();
    fs::create_dir(&sv).unwrap();

    let (result, _log) = install.migrate();
    assert!(result.is_ok());
}

#[test]
fn test_cache_markers_are_removed() {
    let install = create_install();
    fs::write(install.dst_account().join(CACHE_MARKER), "abc").unwrap();
    fs::write(install.dst_character().join(CACHE_MARKER), "def").unwrap();

    let (result, log) = install.migrate();
    let report = result.unwrap();

    assert!(!install.dst_account().join(CACHE_MARKER).exists());
    assert!(!install.dst_character().join(CACHE_MARKER).exists());
    assert_eq!(report.caches_removed, 2);
    assert!(matches!(log.events().last(), Some(MigrationEvent::Finished { .. })));
}

#[test]
fn test_absent_cache_marker_is_not_an_error() {
    let install = create_install();

    let (result, log) = install.migrate();
    let report = result.unwrap();

    assert_eq!(report.caches_removed, 0);
    let absent = log
        .events()
        .iter()
        .filter(|e| matches!(e, MigrationEvent::CacheAbsent { .. }))
        .count();
    assert_eq!(absent, 2);
}

#[test]
fn test_cache_marker_that_cannot_be_removed_is_fatal() {
    let install = create_install();
    // A directory in place of the marker cannot be removed with remove_file
    fs::create_dir(install.dst_character().join(CACHE_MARKER)).unwrap();

    let (result, log) = install.migrate();
    let err = result.unwrap_err();

    assert!(matches!(err, WtfError::Io { op: IoOp::Remove, .. }));
    assert!(matches!(
        log.failure(),
        Some(MigrationEvent::Failed {
            phase: MigrationPhase::CacheInvalidation,
            ..
        })
    ));
}

#[test]
fn test_rerun_leaves_destination_only_files_alone() {
    let install = create_install_between(
        CopyTarget::new(GameVersion::Retail, Identity::new("ACC1", "Argent", "Alice")),
        CopyTarget::new(GameVersion::Retail, Identity::new("ACC2", "ArgentDawn", "Alice")),
    );
    let dest_only = install.dst_account().join("SavedVariables/DestOnly.lua");
    fs::write(&dest_only, "k = \"Alice-Argent\"").unwrap();

    let (first, _log) = install.migrate();
    first.unwrap();
    assert_eq!(fs::read_to_string(&dest_only).unwrap(), "k = \"Alice-ArgentDawn\"");
    let after_first = snapshot(&install.dst_account());

    let (second, log) = install.migrate();
    let report = second.unwrap();

    assert_eq!(fs::read_to_string(&dest_only).unwrap(), "k = \"Alice-ArgentDawn\"");
    assert_eq!(snapshot(&install.dst_account()), after_first);
    assert_eq!(report.files_rewritten, 0);
    assert!(!log
        .events()
        .iter()
        .any(|e| matches!(e, MigrationEvent::FileRewritten { .. })));
}

#[test]
fn test_longer_names_of_other_characters_are_kept() {
    let install = create_install_between(
        CopyTarget::new(GameVersion::Retail, Identity::new("ACC1", "Argent", "Alice")),
        CopyTarget::new(GameVersion::Classic, Identity::new("ACC2", "Realm2", "Bob")),
    );
    let shared = install.dst_account().join("SavedVariables/Shared.lua");
    fs::write(&shared, "[\"Alice-ArgentDawn\"] = 1\n[\"Alice-Argent\"] = 2\n").unwrap();

    let (result, _log) = install.migrate();
    let report = result.unwrap();

    assert_eq!(
        fs::read_to_string(&shared).unwrap(),
        "[\"Alice-ArgentDawn\"] = 1\n[\"Bob-Realm2\"] = 2\n"
    );
    assert_eq!(report.references_rewritten, 1);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_saved_variables_are_copied_and_rewritten() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let install = create_install();
    let name = OsStr::from_bytes(b"Caf\xe9.lua");
    let src = install.src_account().join("SavedVariables").into_std_path_buf().join(name);
    if fs::write(&src, "owner = \"Alice-Realm1\"").is_err() {
        // Filesystem only accepts UTF-8 names
        return;
    }

    let (result, log) = install.migrate();
    let report = result.unwrap();

    let dst = install.dst_account().join("SavedVariables").into_std_path_buf().join(name);
    assert_eq!(fs::read_to_string(&dst).unwrap(), "owner = \"Bob-Realm2\"");
    assert_eq!(report.files_copied, 11);
    assert!(log.events().iter().any(|e| matches!(
        e,
        MigrationEvent::FileRewritten { path, .. } if path.as_str().ends_with("Caf\u{FFFD}.lua")
    )));
}
