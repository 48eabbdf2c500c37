//! Discovery of character configurations (identities) inside one client version.
//!
//! The client creates `WTF/Account/<account>/<server>/<character>` the first time a
//! character logs in. Discovery walks those three levels and reports the triples that
//! exist. `SavedVariables` directories sit next to servers and accounts and are skipped.

use crate::error::{Result, WtfError};
use crate::models::{GameVersion, Identity, SAVED_VARIABLES_DIR};
use crate::services::dir_listing::child_dir_names;
use camino::Utf8Path;
use indexmap::IndexSet;

/// Every identity that exists on disk for `version`, sorted by (account, server, character).
///
/// An empty result is not an error. Any directory that cannot be listed aborts the whole
/// enumeration.
pub fn identities_for(root: &Utf8Path, version: GameVersion) -> Result<Vec<Identity>> {
    let account_scope = version.account_scope(root);
    let mut identities = Vec::new();

    for account in child_dir_names(&account_scope)? {
        if account == SAVED_VARIABLES_DIR {
            continue;
        }
        let account_path = account_scope.join(&account);

        for server in child_dir_names(&account_path)? {
            if server == SAVED_VARIABLES_DIR {
                continue;
            }
            let server_path = account_path.join(&server);

            for character in child_dir_names(&server_path)? {
                identities.push(Identity::new(&account, &server, character));
            }
        }
    }

    tracing::debug!(
        "Found {} character configurations in {}",
        identities.len(),
        account_scope
    );
    Ok(identities)
}

/// Like [`identities_for`], but a version without characters is reported as
/// [`WtfError::NoIdentities`].
pub fn discover(root: &Utf8Path, version: GameVersion) -> Result<IdentitySet> {
    let identities = identities_for(root, version)?;
    if identities.is_empty() {
        return Err(WtfError::NoIdentities { version });
    }
    Ok(IdentitySet {
        version,
        identities,
    })
}

/// The identities of one version, with helpers to narrow a choice level by level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySet {
    version: GameVersion,
    identities: Vec<Identity>,
}

impl IdentitySet {
    pub fn version(&self) -> GameVersion {
        self.version
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Distinct account names, in first-seen order
    pub fn accounts(&self) -> Vec<String> {
        dedup(self.identities.iter().map(|i| i.account.as_str()))
    }

    /// Distinct servers of `account`, in first-seen order
    pub fn servers(&self, account: &str) -> Vec<String> {
        dedup(
            self.identities
                .iter()
                .filter(|i| i.account == account)
                .map(|i| i.server.as_str()),
        )
    }

    /// Characters of `account` on `server`
    pub fn characters(&self, account: &str, server: &str) -> Vec<String> {
        dedup(
            self.identities
                .iter()
                .filter(|i| i.account == account && i.server == server)
                .map(|i| i.character.as_str()),
        )
    }

    /// The identity for an exact (account, server, character) choice, if it was discovered.
    pub fn find(&self, account: &str, server: &str, character: &str) -> Option<&Identity> {
        self.identities
            .iter()
            .find(|i| i.account == account && i.server == server && i.character == character)
    }
}

fn dedup<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
