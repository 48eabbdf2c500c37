//! Identity substitution inside saved-variable files.
//!
//! Add-ons key their per-character data by strings such as `"Alice-Realm1"`,
//! `"Alice - Realm1"` or `"Realm1 - Alice"`. After a migration those keys still name the
//! source character, so the destination character would start with empty add-on
//! profiles. [`IdentityRewriter`] rewrites all three spellings in one pass.
//!
//! All matches are located in the original bytes and replaced together. Replacement text
//! is never scanned again, so a destination name that contains the source name cannot
//! be rewritten twice.

use crate::models::Identity;
use regex::bytes::Regex;
use std::borrow::Cow;
use std::ops::Range;

/// Rewrites character/server references from one identity to another.
///
/// A reference only counts when it is not part of a longer name: the bytes right before
/// and right after it must not be letters or digits. With a move from `Alice-Argent`,
/// another character's `"Alice-ArgentDawn"` key is left alone.
#[derive(Debug, Clone)]
pub struct IdentityRewriter {
    /// Alternation of the escaped source spellings, one capture group each
    pattern: Regex,

    /// Replacement for each capture group, in group order
    replacements: Vec<Vec<u8>>,
}

impl IdentityRewriter {
    pub fn new(source: &Identity, destination: &Identity) -> Self {
        let pairs = [
            (
                format!("{}-{}", source.character, source.server),
                format!("{}-{}", destination.character, destination.server),
            ),
            (
                format!("{} - {}", source.character, source.server),
                format!("{} - {}", destination.character, destination.server),
            ),
            (
                format!("{} - {}", source.server, source.character),
                format!("{} - {}", destination.server, destination.character),
            ),
        ];

        let alternation = pairs
            .iter()
            .map(|(from, _)| format!("({})", regex::escape(from)))
            .collect::<Vec<_>>()
            .join("|");

        Self {
            // Escaped literals always form a valid pattern
            pattern: Regex::new(&alternation).expect("escaped literal alternation is valid"),
            replacements: pairs.into_iter().map(|(_, to)| to.into_bytes()).collect(),
        }
    }

    /// Rewrite `data`, borrowing it unchanged when nothing matches.
    pub fn rewrite<'a>(&self, data: &'a [u8]) -> Cow<'a, [u8]> {
        let references = self.references(data);
        if references.is_empty() {
            return Cow::Borrowed(data);
        }

        let mut out = Vec::with_capacity(data.len());
        let mut last = 0;
        for (range, group) in references {
            out.extend_from_slice(&data[last..range.start]);
            out.extend_from_slice(&self.replacements[group]);
            last = range.end;
        }
        out.extend_from_slice(&data[last..]);
        Cow::Owned(out)
    }

    /// Number of references `rewrite` would replace.
    pub fn count_matches(&self, data: &[u8]) -> usize {
        self.references(data).len()
    }

    /// Non-overlapping references in `data`, left to right, with the index of the
    /// spelling that matched.
    fn references(&self, data: &[u8]) -> Vec<(Range<usize>, usize)> {
        let mut found = Vec::new();
        let mut at = 0;

        while let Some(caps) = self.pattern.captures_at(data, at) {
            let Some(whole) = caps.get(0) else { break };
            let range = whole.range();

            if stands_alone(data, &range) {
                let group = (1..caps.len())
                    .find(|&i| caps.get(i).is_some())
                    .unwrap_or(1);
                at = range.end;
                found.push((range, group - 1));
            } else {
                // Part of a longer name, retry from the next byte
                at = range.start + 1;
            }

            if at > data.len() {
                break;
            }
        }
        found
    }
}

/// Letters, digits and any non-ASCII byte (accented names) continue a name.
fn continues_name(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || !byte.is_ascii()
}

fn stands_alone(data: &[u8], range: &Range<usize>) -> bool {
    let before = range.start.checked_sub(1).map(|i| data[i]);
    let after = data.get(range.end).copied();
    !before.is_some_and(continues_name) && !after.is_some_and(continues_name)
}
