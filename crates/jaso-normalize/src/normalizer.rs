//! Single-entry and subtree NFC normalization.
//!
//! # Ordering
//!
//! Renaming a directory changes the path of everything beneath it, so the
//! subtree walk is post-order: each entry is renamed through the path it had
//! when the walk found it, and its parent is only renamed once all of its
//! children have been handled.
//!
//! The walk itself runs pre-order so that skipped directories are pruned
//! before they are read. Directories are held back on a stack and renamed
//! once the walk moves on to a shallower or sibling entry.
//!
//! ```text
//! 폴더(NFD)/파일(NFD)   1. rename 폴더(NFD)/파일(NFD) -> 폴더(NFD)/파일(NFC)
//!                      2. rename 폴더(NFD)           -> 폴더(NFC)
//! ```

use std::borrow::Cow;
use std::io;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use jaso_core::SkipPolicy;
use tracing::{debug, error, info, trace, warn};
use unicode_normalization::{UnicodeNormalization, is_nfc};
use walkdir::{DirEntry, WalkDir};

use crate::error::RenameError;
use crate::fs::{FileSystem, OsFileSystem};
use crate::outcome::{Outcome, PassStats};

/// Returns the NFC form of `name`, borrowing when it is already NFC.
///
/// # Examples
///
/// ```
/// use jaso_normalize::nfc_name;
/// use std::borrow::Cow;
///
/// assert!(matches!(nfc_name("readme.md"), Cow::Borrowed(_)));
/// assert_eq!(nfc_name("cafe\u{301}"), "caf\u{e9}");
/// assert_eq!(nfc_name("\u{1112}\u{1161}\u{11AB}"), "\u{D55C}");
/// ```
pub fn nfc_name(name: &str) -> Cow<'_, str> {
    if is_nfc(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.nfc().collect())
    }
}

/// Renames entries so their names are in Unicode Normalization Form C.
///
/// The normalizer is immutable after construction and can be shared across
/// threads behind an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use jaso_core::SkipPolicy;
/// use jaso_normalize::{Normalizer, Outcome};
/// use camino::Utf8Path;
///
/// let normalizer = Normalizer::new(SkipPolicy::default());
/// match normalizer.normalize_one(Utf8Path::new("/tmp/cafe\u{301}")) {
///     Outcome::Renamed { to } => println!("now {to}"),
///     other => println!("{}", other.label()),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer<F = OsFileSystem> {
    skip: SkipPolicy,
    fs: F,
    dry_run: bool,
}

impl Normalizer<OsFileSystem> {
    /// Creates a normalizer that operates on the real filesystem.
    #[must_use]
    pub fn new(skip: SkipPolicy) -> Self {
        Self::with_fs(skip, OsFileSystem)
    }
}

impl<F: FileSystem> Normalizer<F> {
    /// Creates a normalizer over a custom [`FileSystem`].
    #[must_use]
    pub fn with_fs(skip: SkipPolicy, fs: F) -> Self {
        Self {
            skip,
            fs,
            dry_run: false,
        }
    }

    /// Report renames as [`Outcome::Planned`] instead of performing them.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the skip policy.
    #[inline]
    pub fn skip_policy(&self) -> &SkipPolicy {
        &self.skip
    }

    /// Returns `true` if `path` matches the skip policy.
    #[inline]
    pub fn should_skip(&self, path: &Utf8Path) -> bool {
        self.skip.should_skip(path)
    }

    /// Returns `true` in dry-run mode.
    #[inline]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the filesystem.
    #[inline]
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Normalizes the leaf name of a single entry.
    ///
    /// Performs at most one rename and never fails: a missing path is
    /// [`Outcome::Vanished`], an occupied target is [`Outcome::Conflict`],
    /// and OS errors are logged and returned as [`Outcome::Failed`].
    /// Calling it again on the result is a no-op.
    pub fn normalize_one(&self, path: &Utf8Path) -> Outcome {
        if self.skip.should_skip(path) {
            trace!(path = %path, "Skipping path by policy");
            return Outcome::Skipped;
        }

        if !self.fs.entry_exists(path) {
            return Outcome::Vanished;
        }

        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Outcome::Unsupported;
        };

        let normalized = match nfc_name(name) {
            Cow::Borrowed(_) => return Outcome::Unchanged,
            Cow::Owned(normalized) => normalized,
        };
        let target = parent.join(&normalized);

        match self.fs.target_occupied(path, &target) {
            Ok(false) => {}
            Ok(true) => return Outcome::Conflict { target },
            Err(err) => return Self::absorb_failure(path, target, err),
        }

        if self.dry_run {
            info!(from = %path, to = %target, "Would rename to NFC");
            return Outcome::Planned { to: target };
        }

        match self.fs.rename(path, &target) {
            Ok(()) => {
                debug!(from = %path, to = %target, "Renamed to NFC");
                Outcome::Renamed { to: target }
            }
            Err(err) => Self::absorb_failure(path, target, err),
        }
    }

    /// Normalizes every name under `root`, children before parents, then `root`.
    ///
    /// A `root` that is not a directory (including a symlink to one) is
    /// handled by [`normalize_one`](Self::normalize_one) alone. Symbolic
    /// links are never followed. Skipped directories are not descended into;
    /// each counts once as skipped. Unreadable directories are logged and
    /// counted in [`PassStats::walk_errors`].
    pub fn normalize_subtree(&self, root: &Utf8Path) -> PassStats {
        if self.skip.should_skip(root) {
            trace!(path = %root, "Skipping subtree by policy");
            return PassStats::skipped();
        }

        let mut stats = PassStats::default();

        if !self.fs.is_directory(root) {
            stats.record(&self.normalize_one(root));
            return stats;
        }

        let mut pruned = 0;
        let mut pending = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                let keep = Utf8Path::from_path(entry.path())
                    .is_none_or(|path| !self.skip.should_skip(path));
                if !keep {
                    pruned += 1;
                }
                keep
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        path = ?err.path(),
                        error = %err,
                        "Failed to read directory entry"
                    );
                    stats.walk_errors += 1;
                    continue;
                }
            };

            self.settle(&mut pending, entry.depth(), &mut stats);
            if entry.file_type().is_dir() {
                pending.push(entry);
            } else {
                stats.record(&self.visit(entry.path()));
            }
        }
        self.settle(&mut pending, 1, &mut stats);

        stats.visited += pruned;
        stats.skipped += pruned;
        stats.record(&self.normalize_one(root));

        if stats.changed() > 0 || stats.failures() > 0 {
            debug!(
                root = %root,
                visited = stats.visited,
                renamed = stats.renamed,
                conflicts = stats.conflicts,
                failures = stats.failures(),
                "Normalized subtree"
            );
        }

        stats
    }

    /// Normalizes held-back directories at `depth` or deeper, deepest first.
    fn settle(&self, pending: &mut Vec<DirEntry>, depth: usize, stats: &mut PassStats) {
        while let Some(dir) = pending.pop() {
            if dir.depth() < depth {
                pending.push(dir);
                break;
            }
            stats.record(&self.visit(dir.path()));
        }
    }

    fn visit(&self, path: &Path) -> Outcome {
        match Utf8Path::from_path(path) {
            Some(path) => self.normalize_one(path),
            None => {
                debug!(path = %path.display(), "Skipping non-UTF-8 name");
                Outcome::Unsupported
            }
        }
    }

    /// Maps a failed lookup or rename to an outcome, logging by severity.
    fn absorb_failure(path: &Utf8Path, target: Utf8PathBuf, err: io::Error) -> Outcome {
        if err.kind() == io::ErrorKind::NotFound {
            return Outcome::Vanished;
        }

        match RenameError::from_io(path, &target, err) {
            RenameError::Conflict { .. } => Outcome::Conflict { target },
            err @ RenameError::PermissionDenied { .. } => {
                warn!(path = %path, error = %err, "Rename skipped (permission)");
                Outcome::Failed(err)
            }
            err @ RenameError::Os { .. } => {
                error!(path = %path, error = %err, "Rename failed");
                Outcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CAFE_NFD: &str = "cafe\u{301}";
    const CAFE_NFC: &str = "caf\u{E9}";

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 temp dir");
        (temp, root)
    }

    fn names(dir: &Utf8Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().into_string().expect("UTF-8"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_nfc_name_borrows_when_normalized() {
        assert!(matches!(nfc_name("plain.txt"), Cow::Borrowed(_)));
        assert!(matches!(nfc_name(CAFE_NFC), Cow::Borrowed(_)));
        assert!(matches!(nfc_name("\u{D55C}\u{AE00}"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_nfc_name_composes() {
        assert_eq!(nfc_name(CAFE_NFD), CAFE_NFC);
        assert_eq!(
            nfc_name("\u{1112}\u{1161}\u{11AB}\u{1100}\u{1173}\u{11AF}"),
            "\u{D55C}\u{AE00}"
        );
    }

    #[test]
    fn test_normalize_one_renames_file() {
        let (_temp, root) = temp_root();
        let source = root.join(CAFE_NFD);
        fs::write(&source, "x").expect("write");

        let normalizer = Normalizer::new(SkipPolicy::none());
        let outcome = normalizer.normalize_one(&source);

        assert!(matches!(outcome, Outcome::Renamed { ref to } if *to == root.join(CAFE_NFC)));
        assert!(root.join(CAFE_NFC).exists());
        assert_eq!(names(&root), [CAFE_NFC]);
    }

    #[test]
    fn test_normalize_one_is_idempotent() {
        let (_temp, root) = temp_root();
        let source = root.join(CAFE_NFD);
        fs::write(&source, "x").expect("write");

        let normalizer = Normalizer::new(SkipPolicy::none());
        let Outcome::Renamed { to } = normalizer.normalize_one(&source) else {
            panic!("expected rename");
        };

        assert!(matches!(normalizer.normalize_one(&to), Outcome::Unchanged));
    }

    #[test]
    fn test_normalize_one_missing_path() {
        let (_temp, root) = temp_root();
        let normalizer = Normalizer::new(SkipPolicy::none());
        assert!(matches!(
            normalizer.normalize_one(&root.join(CAFE_NFD)),
            Outcome::Vanished
        ));
    }

    #[test]
    fn test_normalize_one_filesystem_root() {
        let normalizer = Normalizer::new(SkipPolicy::none());
        assert!(matches!(
            normalizer.normalize_one(Utf8Path::new("/")),
            Outcome::Unsupported
        ));
    }

    #[test]
    fn test_normalize_one_skipped() {
        let (_temp, root) = temp_root();
        let dir = root.join(".tmp");
        fs::create_dir(&dir).expect("mkdir");
        let source = dir.join(CAFE_NFD);
        fs::write(&source, "x").expect("write");

        let normalizer = Normalizer::new(SkipPolicy::default());
        assert!(matches!(normalizer.normalize_one(&source), Outcome::Skipped));
        assert!(source.exists());
    }

    #[test]
    fn test_dry_run_leaves_tree_untouched() {
        let (_temp, root) = temp_root();
        let source = root.join(CAFE_NFD);
        fs::write(&source, "x").expect("write");

        let normalizer = Normalizer::new(SkipPolicy::none()).dry_run(true);
        assert!(normalizer.is_dry_run());
        assert!(matches!(normalizer.normalize_one(&source), Outcome::Planned { .. }));
        assert_eq!(names(&root), [CAFE_NFD]);
    }

    #[test]
    fn test_subtree_on_file_delegates() {
        let (_temp, root) = temp_root();
        let source = root.join(CAFE_NFD);
        fs::write(&source, "x").expect("write");

        let stats = Normalizer::new(SkipPolicy::none()).normalize_subtree(&source);
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.renamed, 1);
    }

    #[test]
    fn test_subtree_on_missing_path() {
        let (_temp, root) = temp_root();
        let stats = Normalizer::new(SkipPolicy::none()).normalize_subtree(&root.join("gone"));
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.vanished, 1);
        assert_eq!(stats.failures(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_renamed() {
        let (_temp, root) = temp_root();
        let link = root.join(CAFE_NFD);
        std::os::unix::fs::symlink(root.join("nowhere"), &link).expect("symlink");

        let normalizer = Normalizer::new(SkipPolicy::none());
        assert!(normalizer.normalize_one(&link).is_renamed());
        assert!(root.join(CAFE_NFC).symlink_metadata().is_ok());
    }
}
