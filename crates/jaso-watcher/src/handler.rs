//! Per-kind event handlers.
//!
//! The watcher translates every backend event into an [`FsEvent`] and hands
//! it to a [`ChangeHandler`], one method per event kind. The production
//! handler, [`NormalizeHandler`], re-runs the subtree normalizer on the
//! event's target path unless the skip policy excludes it.
//!
//! # Why the whole subtree
//!
//! A create, modify, or move on a directory may make many nested entries
//! visible at once, and backends coalesce events for bulk copies. Walking
//! the subtree catches names no individual event was reported for; the
//! redundant passes are no-ops.
//!
//! # Examples
//!
//! ```
//! use jaso_watcher::{ChangeHandler, FsEvent};
//! use jaso_normalize::PassStats;
//! use camino::{Utf8Path, Utf8PathBuf};
//!
//! struct CountCreates;
//!
//! impl ChangeHandler for CountCreates {
//!     fn on_created(&self, _path: &Utf8Path) -> PassStats {
//!         PassStats { visited: 1, ..PassStats::default() }
//!     }
//!     fn on_modified(&self, _path: &Utf8Path) -> PassStats {
//!         PassStats::default()
//!     }
//!     fn on_moved(&self, _from: Option<&Utf8Path>, _to: &Utf8Path) -> PassStats {
//!         PassStats::default()
//!     }
//! }
//!
//! let event = FsEvent::Created { path: Utf8PathBuf::from("/w/a") };
//! assert_eq!(CountCreates.handle(&event).visited, 1);
//! ```

use std::sync::Arc;

use camino::Utf8Path;
use jaso_normalize::{FileSystem, Normalizer, OsFileSystem, PassStats};

use crate::events::FsEvent;

/// Reacts to filesystem changes under the watch root.
///
/// # Thread Safety
///
/// Handlers must be [`Send`] and [`Sync`] because they are called from the
/// notify backend's thread. They must also be `'static` to be moved into
/// the watcher callback.
pub trait ChangeHandler: Send + Sync + 'static {
    /// An entry was created at `path`.
    fn on_created(&self, path: &Utf8Path) -> PassStats;

    /// The entry at `path` was modified.
    fn on_modified(&self, path: &Utf8Path) -> PassStats;

    /// An entry was moved to `to`, from `from` when the backend knows it.
    fn on_moved(&self, from: Option<&Utf8Path>, to: &Utf8Path) -> PassStats;

    /// Routes an event to the method for its kind.
    fn handle(&self, event: &FsEvent) -> PassStats {
        match event {
            FsEvent::Created { path } => self.on_created(path),
            FsEvent::Modified { path } => self.on_modified(path),
            FsEvent::Moved { from, to } => self.on_moved(from.as_deref(), to),
        }
    }
}

/// Normalizes the subtree at each event's target path.
#[derive(Debug)]
pub struct NormalizeHandler<F = OsFileSystem> {
    normalizer: Arc<Normalizer<F>>,
}

impl<F: FileSystem> NormalizeHandler<F> {
    /// Creates a handler sharing `normalizer` with the caller.
    #[must_use]
    pub fn new(normalizer: Arc<Normalizer<F>>) -> Self {
        Self { normalizer }
    }

    /// Returns the shared normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &Arc<Normalizer<F>> {
        &self.normalizer
    }

    fn normalize(&self, path: &Utf8Path) -> PassStats {
        if self.normalizer.should_skip(path) {
            tracing::trace!(path = %path, "Event path matches skip policy");
            return PassStats::skipped();
        }
        self.normalizer.normalize_subtree(path)
    }
}

impl<F: FileSystem + 'static> ChangeHandler for NormalizeHandler<F> {
    fn on_created(&self, path: &Utf8Path) -> PassStats {
        self.normalize(path)
    }

    fn on_modified(&self, path: &Utf8Path) -> PassStats {
        self.normalize(path)
    }

    fn on_moved(&self, _from: Option<&Utf8Path>, to: &Utf8Path) -> PassStats {
        self.normalize(to)
    }
}

impl<H: ChangeHandler + ?Sized> ChangeHandler for Box<H> {
    fn on_created(&self, path: &Utf8Path) -> PassStats {
        (**self).on_created(path)
    }

    fn on_modified(&self, path: &Utf8Path) -> PassStats {
        (**self).on_modified(path)
    }

    fn on_moved(&self, from: Option<&Utf8Path>, to: &Utf8Path) -> PassStats {
        (**self).on_moved(from, to)
    }
}

// Implement ChangeHandler for Arc-wrapped handlers (useful for shared handlers)
impl<H: ChangeHandler + ?Sized> ChangeHandler for Arc<H> {
    fn on_created(&self, path: &Utf8Path) -> PassStats {
        (**self).on_created(path)
    }

    fn on_modified(&self, path: &Utf8Path) -> PassStats {
        (**self).on_modified(path)
    }

    fn on_moved(&self, from: Option<&Utf8Path>, to: &Utf8Path) -> PassStats {
        (**self).on_moved(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use jaso_core::SkipPolicy;
    use parking_lot::Mutex;
    use std::fs;
    use tempfile::TempDir;

    const CAFE_NFD: &str = "cafe\u{301}";
    const CAFE_NFC: &str = "caf\u{E9}";
    const FOLDER_NFD: &str = "\u{1111}\u{1169}\u{11AF}\u{1103}\u{1165}";
    const FOLDER_NFC: &str = "\u{D3F4}\u{B354}";

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl ChangeHandler for Calls {
        fn on_created(&self, path: &Utf8Path) -> PassStats {
            self.0.lock().push(format!("created {path}"));
            PassStats::default()
        }

        fn on_modified(&self, path: &Utf8Path) -> PassStats {
            self.0.lock().push(format!("modified {path}"));
            PassStats::default()
        }

        fn on_moved(&self, from: Option<&Utf8Path>, to: &Utf8Path) -> PassStats {
            let from = from.map_or("?", Utf8Path::as_str);
            self.0.lock().push(format!("moved {from} {to}"));
            PassStats::default()
        }
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("Invalid path");
        (temp, root)
    }

    #[test]
    fn test_handle_routes_by_kind() {
        let calls = Calls::default();
        calls.handle(&FsEvent::Created {
            path: Utf8PathBuf::from("/w/a"),
        });
        calls.handle(&FsEvent::Modified {
            path: Utf8PathBuf::from("/w/b"),
        });
        calls.handle(&FsEvent::Moved {
            from: Some(Utf8PathBuf::from("/w/c")),
            to: Utf8PathBuf::from("/w/d"),
        });
        calls.handle(&FsEvent::Moved {
            from: None,
            to: Utf8PathBuf::from("/w/e"),
        });

        assert_eq!(
            *calls.0.lock(),
            vec![
                "created /w/a",
                "modified /w/b",
                "moved /w/c /w/d",
                "moved ? /w/e",
            ]
        );
    }

    #[test]
    fn test_boxed_and_arc_handlers() {
        let boxed: Box<dyn ChangeHandler> = Box::new(Calls::default());
        assert_eq!(boxed.on_created(Utf8Path::new("/w/a")).visited, 0);

        let shared = Arc::new(Calls::default());
        let handler: Arc<dyn ChangeHandler> = Arc::clone(&shared) as Arc<dyn ChangeHandler>;
        handler.on_modified(Utf8Path::new("/w/b"));
        assert_eq!(shared.0.lock().len(), 1);
    }

    #[test]
    fn test_normalize_handler_renames_move_destination() {
        let (_temp, root) = temp_root();
        let to = root.join(CAFE_NFD);
        fs::write(&to, "x").expect("write");

        let handler = NormalizeHandler::new(Arc::new(Normalizer::new(SkipPolicy::none())));
        let stats = handler.handle(&FsEvent::Moved {
            from: Some(root.join("old-name")),
            to,
        });

        assert_eq!(stats.renamed, 1);
        assert!(root.join(CAFE_NFC).exists());
    }

    #[test]
    fn test_normalize_handler_created_directory_with_contents() {
        let (_temp, root) = temp_root();
        let folder = root.join(FOLDER_NFD);
        fs::create_dir(&folder).expect("mkdir");
        fs::write(folder.join(CAFE_NFD), "x").expect("write");

        let handler = NormalizeHandler::new(Arc::new(Normalizer::new(SkipPolicy::none())));
        let stats = handler.handle(&FsEvent::Created { path: folder });

        assert_eq!(stats.renamed, 2);
        assert!(root.join(FOLDER_NFC).join(CAFE_NFC).is_file());
    }

    #[test]
    fn test_normalize_handler_skips_before_walking() {
        let (_temp, root) = temp_root();
        let dir = root.join(".tmp");
        fs::create_dir(&dir).expect("mkdir");
        let path = dir.join(CAFE_NFD);
        fs::write(&path, "x").expect("write");

        let handler = NormalizeHandler::new(Arc::new(Normalizer::new(SkipPolicy::default())));
        let stats = handler.on_created(&path);

        assert_eq!(stats, PassStats::skipped());
        assert!(path.exists());
    }

    #[test]
    fn test_normalize_handler_missing_path() {
        let (_temp, root) = temp_root();
        let handler = NormalizeHandler::new(Arc::new(Normalizer::new(SkipPolicy::none())));
        let stats = handler.on_modified(&root.join("gone"));
        assert_eq!(stats.vanished, 1);
        assert_eq!(stats.failures(), 0);
    }
}
