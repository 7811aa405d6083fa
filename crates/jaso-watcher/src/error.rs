//! Error types for the jaso-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while starting or running the watcher. Per-entry rename failures never
//! show up here; the normalizer absorbs them.

use camino::Utf8PathBuf;

/// Errors that can occur while starting a watcher.
///
/// Every variant is fatal: it is returned before the event loop starts.
///
/// - **Notify errors** ([`WatchError::Notify`]): the subscription failed
/// - **Path not found** ([`WatchError::PathNotFound`]): configuration error
/// - **Not a directory** ([`WatchError::NotADirectory`]): configuration error
/// - **I/O errors** ([`WatchError::Io`]): the root could not be canonicalized
///
/// # Examples
///
/// ```
/// use jaso_watcher::WatchError;
///
/// fn handle_error(err: WatchError) {
///     match err {
///         WatchError::Notify(e) => eprintln!("Notify error: {e}"),
///         WatchError::PathNotFound(p) => eprintln!("Path not found: {p}"),
///         WatchError::NotADirectory(p) => eprintln!("Not a directory: {p}"),
///         WatchError::Io(e) => eprintln!("I/O error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The watch root does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The watch root exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NotADirectory`] error.
    #[inline]
    pub fn not_a_directory(path: impl Into<Utf8PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Returns `true` if this error comes from an invalid watch root.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::PathNotFound(_) | Self::NotADirectory(_))
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) | Self::NotADirectory(path) => Some(path),
            Self::Notify(_) | Self::Io(_) => None,
        }
    }
}
