//! Depth-first NFC renaming of file and directory names.
//!
//! This crate holds the normalization algorithm itself. It knows nothing
//! about filesystem events; `jaso-watcher` calls into it whenever something
//! under the watch root changes.
//!
//! # Overview
//!
//! - [`Normalizer::normalize_one`] renames a single entry in place when its
//!   leaf name is not in Unicode Normalization Form C.
//! - [`Normalizer::normalize_subtree`] walks a directory post-order, so every
//!   child is renamed through its parent's original path before the parent
//!   itself is renamed.
//!
//! Neither operation returns an error. Every per-entry result is reported as
//! an [`Outcome`] and folded into [`PassStats`]; permission failures are
//! logged at `warn`, other rename failures at `error`.
//!
//! # Usage
//!
//! ```no_run
//! use jaso_core::SkipPolicy;
//! use jaso_normalize::Normalizer;
//! use camino::Utf8Path;
//!
//! let normalizer = Normalizer::new(SkipPolicy::default());
//! let stats = normalizer.normalize_subtree(Utf8Path::new("/Users/me/Downloads"));
//! println!("renamed {} of {} entries", stats.renamed, stats.visited);
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! jaso-cli ──► jaso-watcher ──► jaso-normalize ──► jaso-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod fs;
pub mod normalizer;
pub mod outcome;

pub use error::RenameError;
pub use fs::{FileSystem, OsFileSystem};
pub use normalizer::{Normalizer, nfc_name};
pub use outcome::{Outcome, PassStats};
