//! Filesystem access used by the normalizer.
//!
//! The [`FileSystem`] trait is the only route through which the normalizer
//! queries or mutates entries (the post-order walk itself reads directories
//! through `walkdir`). Swapping the implementation lets callers observe or
//! veto renames without touching the real tree.

use std::fs::Metadata;
use std::io;
use std::sync::Arc;

use camino::Utf8Path;

/// Metadata queries and the single mutation the normalizer performs.
///
/// # Thread Safety
///
/// Implementations must be [`Send`] and [`Sync`]: the normalizer is shared
/// between the watcher's event thread and one-shot passes.
///
/// # Examples
///
/// ```
/// use jaso_normalize::{FileSystem, OsFileSystem};
/// use camino::Utf8Path;
///
/// let fs = OsFileSystem;
/// assert!(!fs.entry_exists(Utf8Path::new("/no/such/entry")));
/// ```
pub trait FileSystem: Send + Sync {
    /// Returns `true` if `path` exists, without following symbolic links.
    ///
    /// A dangling symlink exists.
    fn entry_exists(&self, path: &Utf8Path) -> bool;

    /// Returns `true` if `path` is a directory, without following symbolic links.
    fn is_directory(&self, path: &Utf8Path) -> bool;

    /// Returns `true` if renaming `from` to `to` would replace another entry.
    ///
    /// On normalization-insensitive filesystems `to` resolves to `from`
    /// itself; that is not an occupant.
    fn target_occupied(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<bool>;

    /// Renames `from` to `to`.
    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn entry_exists(&self, path: &Utf8Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_directory(&self, path: &Utf8Path) -> bool {
        path.symlink_metadata().is_ok_and(|meta| meta.is_dir())
    }

    fn target_occupied(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<bool> {
        let target = match to.symlink_metadata() {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };
        let source = from.symlink_metadata()?;
        Ok(!is_same_entry(&source, &target))
    }

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn entry_exists(&self, path: &Utf8Path) -> bool {
        (**self).entry_exists(path)
    }

    fn is_directory(&self, path: &Utf8Path) -> bool {
        (**self).is_directory(path)
    }

    fn target_occupied(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<bool> {
        (**self).target_occupied(from, to)
    }

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        (**self).rename(from, to)
    }
}

/// Whether two lookups reached the same directory entry.
///
/// A hard link also shares the inode but is a separate name that `rename`
/// would leave in place, so multiply-linked files never match.
#[cfg(unix)]
fn is_same_entry(source: &Metadata, target: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    source.dev() == target.dev()
        && source.ino() == target.ino()
        && (source.is_dir() || source.nlink() == 1)
}

#[cfg(not(unix))]
fn is_same_entry(_source: &Metadata, _target: &Metadata) -> bool {
    false
}

// Shared filesystems, e.g. a recording double held by a test and a normalizer
impl<F: FileSystem + ?Sized> FileSystem for Arc<F> {
    fn entry_exists(&self, path: &Utf8Path) -> bool {
        (**self).entry_exists(path)
    }

    fn is_directory(&self, path: &Utf8Path) -> bool {
        (**self).is_directory(path)
    }

    fn target_occupied(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<bool> {
        (**self).target_occupied(from, to)
    }

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        (**self).rename(from, to)
    }
}
