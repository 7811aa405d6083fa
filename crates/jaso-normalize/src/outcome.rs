//! Per-entry outcomes and per-pass statistics.
//!
//! An [`Outcome`] exists only as control flow for one entry; [`PassStats`]
//! folds the outcomes of one subtree pass into counters that can be logged
//! or serialized into a report.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::RenameError;

/// The result of normalizing a single entry.
#[derive(Debug)]
pub enum Outcome {
    /// The name is already NFC.
    Unchanged,
    /// The path does not exist, or disappeared before it could be renamed.
    Vanished,
    /// The path has no final component or its name is not valid UTF-8.
    Unsupported,
    /// The path matched the skip policy.
    Skipped,
    /// The entry was renamed.
    Renamed {
        /// The new path.
        to: Utf8PathBuf,
    },
    /// Dry run: the entry would have been renamed.
    Planned {
        /// The path it would have been renamed to.
        to: Utf8PathBuf,
    },
    /// An entry with the normalized name already exists; nothing was renamed.
    Conflict {
        /// The existing entry.
        target: Utf8PathBuf,
    },
    /// The rename failed and was logged.
    Failed(RenameError),
}

impl Outcome {
    /// Returns `true` if nothing happened and nothing needed to happen.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Vanished | Self::Unsupported)
    }

    /// Returns `true` if the filesystem was mutated.
    #[must_use]
    pub const fn is_renamed(&self) -> bool {
        matches!(self, Self::Renamed { .. })
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Vanished => "vanished",
            Self::Unsupported => "unsupported",
            Self::Skipped => "skipped",
            Self::Renamed { .. } => "renamed",
            Self::Planned { .. } => "planned",
            Self::Conflict { .. } => "conflict",
            Self::Failed(_) => "failed",
        }
    }
}

/// Counters for one normalization pass.
///
/// # Examples
///
/// ```
/// use jaso_normalize::{Outcome, PassStats};
///
/// let mut stats = PassStats::default();
/// stats.record(&Outcome::Unchanged);
/// stats.record(&Outcome::Skipped);
///
/// assert_eq!(stats.visited, 2);
/// assert_eq!(stats.changed(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    /// Entries handed to the single-entry normalizer.
    pub visited: u64,
    /// Entries renamed.
    pub renamed: u64,
    /// Entries that would be renamed (dry run).
    pub planned: u64,
    /// Entries already in NFC.
    pub unchanged: u64,
    /// Entries that vanished before they could be processed.
    pub vanished: u64,
    /// Entries without a usable UTF-8 name.
    pub unsupported: u64,
    /// Entries excluded by the skip policy.
    pub skipped: u64,
    /// Renames blocked by an existing entry.
    pub conflicts: u64,
    /// Renames refused by the OS for permission reasons.
    pub permission_denied: u64,
    /// Renames that failed for any other reason.
    pub failed: u64,
    /// Directory entries the walk could not read.
    pub walk_errors: u64,
}

impl PassStats {
    /// Stats for a pass that was skipped before it started.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            visited: 1,
            skipped: 1,
            ..Self::default()
        }
    }

    /// Counts one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        self.visited += 1;
        match outcome {
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Vanished => self.vanished += 1,
            Outcome::Unsupported => self.unsupported += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Renamed { .. } => self.renamed += 1,
            Outcome::Planned { .. } => self.planned += 1,
            Outcome::Conflict { .. } => self.conflicts += 1,
            Outcome::Failed(err) if err.is_permission() => self.permission_denied += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    /// Adds another pass's counters to this one.
    pub fn merge(&mut self, other: &Self) {
        self.visited += other.visited;
        self.renamed += other.renamed;
        self.planned += other.planned;
        self.unchanged += other.unchanged;
        self.vanished += other.vanished;
        self.unsupported += other.unsupported;
        self.skipped += other.skipped;
        self.conflicts += other.conflicts;
        self.permission_denied += other.permission_denied;
        self.failed += other.failed;
        self.walk_errors += other.walk_errors;
    }

    /// Entries renamed or planned for renaming.
    #[inline]
    #[must_use]
    pub const fn changed(&self) -> u64 {
        self.renamed + self.planned
    }

    /// Renames that were attempted and failed, plus unreadable entries.
    #[inline]
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.permission_denied + self.failed + self.walk_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use std::io;

    #[test]
    fn test_record_every_outcome() {
        let mut stats = PassStats::default();
        stats.record(&Outcome::Unchanged);
        stats.record(&Outcome::Vanished);
        stats.record(&Outcome::Unsupported);
        stats.record(&Outcome::Skipped);
        stats.record(&Outcome::Renamed {
            to: Utf8PathBuf::from("/a"),
        });
        stats.record(&Outcome::Planned {
            to: Utf8PathBuf::from("/b"),
        });
        stats.record(&Outcome::Conflict {
            target: Utf8PathBuf::from("/c"),
        });
        stats.record(&Outcome::Failed(RenameError::from_io(
            Utf8Path::new("/d"),
            Utf8Path::new("/e"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        )));
        stats.record(&Outcome::Failed(RenameError::from_io(
            Utf8Path::new("/d"),
            Utf8Path::new("/e"),
            io::Error::other("boom"),
        )));

        assert_eq!(stats.visited, 9);
        assert_eq!(stats.changed(), 2);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.permission_denied, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failures(), 2);
    }

    #[test]
    fn test_merge() {
        let mut total = PassStats::default();
        let mut pass = PassStats::default();
        pass.record(&Outcome::Renamed {
            to: Utf8PathBuf::from("/a"),
        });
        pass.walk_errors = 2;

        total.merge(&pass);
        total.merge(&pass);

        assert_eq!(total.visited, 2);
        assert_eq!(total.renamed, 2);
        assert_eq!(total.walk_errors, 4);
    }

    #[test]
    fn test_skipped_pass() {
        let stats = PassStats::skipped();
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.changed(), 0);
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(Outcome::Vanished.is_noop());
        assert!(!Outcome::Skipped.is_noop());
        assert!(
            Outcome::Renamed {
                to: Utf8PathBuf::from("/a")
            }
            .is_renamed()
        );
        assert_eq!(Outcome::Unchanged.label(), "unchanged");
    }
}
