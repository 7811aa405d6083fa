//! Event types for filesystem change notifications.
//!
//! Raw `notify` events are translated into [`FsEvent`]s, which keep only the
//! three kinds the normalizer reacts to and only the path that matters for
//! each kind.
//!
//! # Event Flow
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//!   notify::Event (backend thread)
//!        │
//!        ▼
//!   FsEvent::from_notify ──► ChangeHandler ──► Normalizer
//!        │
//!        ▼
//!   DispatchReport sent via channel
//! ```

use std::path::PathBuf;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use jaso_normalize::PassStats;
use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Events produced from a single `notify` event.
///
/// Almost every backend event carries one or two paths.
pub type FsEvents = SmallVec<[FsEvent; 2]>;

/// A filesystem change relevant to name normalization.
///
/// # Examples
///
/// ```
/// use jaso_watcher::FsEvent;
/// use camino::Utf8PathBuf;
///
/// let event = FsEvent::Moved {
///     from: Some(Utf8PathBuf::from("/w/old")),
///     to: Utf8PathBuf::from("/w/new"),
/// };
/// assert_eq!(event.target().as_str(), "/w/new");
/// assert_eq!(event.kind_label(), "moved");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FsEvent {
    /// An entry was created.
    Created {
        /// The new entry.
        path: Utf8PathBuf,
    },
    /// An entry's data or metadata changed.
    Modified {
        /// The modified entry.
        path: Utf8PathBuf,
    },
    /// An entry was moved or renamed.
    Moved {
        /// The previous location, when the backend reports it.
        from: Option<Utf8PathBuf>,
        /// The new location.
        to: Utf8PathBuf,
    },
}

impl FsEvent {
    /// Translates a raw `notify` event.
    ///
    /// Removals, accesses, rename sources, and unknown kinds produce nothing.
    /// Non-UTF-8 paths are logged and dropped.
    pub fn from_notify(event: notify::Event) -> FsEvents {
        let notify::Event { kind, paths, .. } = event;

        match kind {
            EventKind::Create(_) => utf8_paths(paths)
                .map(|path| Self::Created { path })
                .collect(),

            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
                let mut iter = paths.into_iter();
                let (Some(from), Some(to)) = (iter.next(), iter.next()) else {
                    return FsEvents::new();
                };
                match to_utf8(to) {
                    Some(to) => smallvec::smallvec![Self::Moved {
                        from: to_utf8(from),
                        to,
                    }],
                    None => FsEvents::new(),
                }
            }

            // Only the destination of a move matters
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => FsEvents::new(),

            // Unpaired rename halves: a vanished source normalizes as a no-op
            EventKind::Modify(ModifyKind::Name(_)) => utf8_paths(paths)
                .map(|to| Self::Moved { from: None, to })
                .collect(),

            EventKind::Modify(_) => utf8_paths(paths)
                .map(|path| Self::Modified { path })
                .collect(),

            EventKind::Remove(_) | EventKind::Access(_) | EventKind::Any | EventKind::Other => {
                FsEvents::new()
            }
        }
    }

    /// The path to normalize for this event: the destination for moves.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Utf8Path {
        match self {
            Self::Created { path } | Self::Modified { path } => path,
            Self::Moved { to, .. } => to,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Modified { .. } => "modified",
            Self::Moved { .. } => "moved",
        }
    }
}

/// The result of handling one [`FsEvent`].
///
/// Sent on the watcher's report channel after the handler returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// The event that triggered the pass.
    pub event: FsEvent,

    /// Outcome counters of the pass.
    pub stats: PassStats,

    /// Time spent in the handler.
    pub elapsed: Duration,
}

impl DispatchReport {
    /// Returns `true` if the pass renamed (or planned to rename) anything.
    #[inline]
    #[must_use]
    pub const fn changed_anything(&self) -> bool {
        self.stats.changed() > 0
    }
}

fn to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    match Utf8PathBuf::try_from(path) {
        Ok(path) => Some(path),
        Err(e) => {
            let invalid_path = e.into_path_buf();
            tracing::warn!(
                path = %invalid_path.display(),
                "Skipping non-UTF-8 path in file event"
            );
            None
        }
    }
}

fn utf8_paths(paths: Vec<PathBuf>) -> impl Iterator<Item = Utf8PathBuf> {
    paths.into_iter().filter_map(to_utf8)
}
