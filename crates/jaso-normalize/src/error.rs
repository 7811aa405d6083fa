//! Error types for the jaso-normalize crate.
//!
//! [`RenameError`] describes why a single rename did not happen. It never
//! escapes the normalizer: it is carried inside
//! [`Outcome::Failed`](crate::Outcome::Failed) or mapped to
//! [`Outcome::Conflict`](crate::Outcome::Conflict) and logged where it occurs.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};

/// `EPERM` ("operation not permitted").
const ERRNO_EPERM: i32 = 1;

/// `EACCES` ("permission denied").
const ERRNO_EACCES: i32 = 13;

/// A failed attempt to rename an entry to its NFC name.
///
/// # Error Recovery Strategy
///
/// - **Conflict** ([`RenameError::Conflict`]): silent, the original is left alone
/// - **Permission denied** ([`RenameError::PermissionDenied`]): logged at `warn`
/// - **Other OS errors** ([`RenameError::Os`]): logged at `error`
///
/// None of these stop a traversal or the watcher.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// An entry with the normalized name already exists next to the source.
    #[error("target already exists: {target}")]
    Conflict {
        /// The entry that was not renamed.
        path: Utf8PathBuf,
        /// The existing entry that blocked the rename.
        target: Utf8PathBuf,
    },

    /// The OS refused the rename (`EPERM` / `EACCES`).
    #[error("permission denied renaming {path} -> {target}: {source}")]
    PermissionDenied {
        /// The entry that was not renamed.
        path: Utf8PathBuf,
        /// The intended new path.
        target: Utf8PathBuf,
        /// The underlying OS error.
        source: io::Error,
    },

    /// Any other OS-level failure.
    #[error("failed to rename {path} -> {target}: {source}")]
    Os {
        /// The entry that was not renamed.
        path: Utf8PathBuf,
        /// The intended new path.
        target: Utf8PathBuf,
        /// The underlying OS error.
        source: io::Error,
    },
}

impl RenameError {
    /// Classifies an I/O error raised while renaming `path` to `target`.
    ///
    /// Collision kinds become [`RenameError::Conflict`]; `NotFound` is not
    /// expected here and is treated as an ordinary OS error, callers map it
    /// to a vanished entry before classifying.
    pub fn from_io(path: &Utf8Path, target: &Utf8Path, source: io::Error) -> Self {
        if is_collision(&source) {
            Self::Conflict {
                path: path.to_owned(),
                target: target.to_owned(),
            }
        } else if is_permission_denied(&source) {
            Self::PermissionDenied {
                path: path.to_owned(),
                target: target.to_owned(),
                source,
            }
        } else {
            Self::Os {
                path: path.to_owned(),
                target: target.to_owned(),
                source,
            }
        }
    }

    /// Returns `true` for permission-class failures.
    #[inline]
    #[must_use]
    pub const fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Returns `true` for name collisions.
    #[inline]
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns the entry that failed to rename.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Conflict { path, .. }
            | Self::PermissionDenied { path, .. }
            | Self::Os { path, .. } => path,
        }
    }

    /// Returns the intended new path.
    #[must_use]
    pub fn target(&self) -> &Utf8Path {
        match self {
            Self::Conflict { target, .. }
            | Self::PermissionDenied { target, .. }
            | Self::Os { target, .. } => target,
        }
    }
}

/// Returns `true` if the error means the rename target is occupied.
pub fn is_collision(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::AlreadyExists | io::ErrorKind::DirectoryNotEmpty
    )
}

/// Returns `true` for `PermissionDenied`, including raw `EPERM`/`EACCES`.
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
        || (cfg!(unix) && matches!(err.raw_os_error(), Some(ERRNO_EPERM | ERRNO_EACCES)))
}
