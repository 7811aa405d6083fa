//! Filesystem watcher that keeps names in NFC as they change.
//!
//! This crate subscribes to change notifications under a root directory
//! (via `notify`), translates them into [`FsEvent`]s, and hands each one to
//! a [`ChangeHandler`]. The production handler, [`NormalizeHandler`], runs
//! the subtree normalizer from `jaso-normalize` on the changed path.
//!
//! # Crate Dependencies
//!
//! ```text
//! jaso-cli ──► jaso-watcher ──► jaso-normalize ──► jaso-core
//! ```
//!
//! # Usage
//!
//! ## Watching a Directory
//!
//! ```no_run
//! use std::sync::Arc;
//! use jaso_core::{SkipPolicy, WatchConfig};
//! use jaso_normalize::Normalizer;
//! use jaso_watcher::{NormalizeHandler, NormalizingWatcher};
//! use camino::Utf8Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let normalizer = Arc::new(Normalizer::new(SkipPolicy::default()));
//!     let mut watcher = NormalizingWatcher::start(
//!         Utf8Path::new("/Users/me/Downloads"),
//!         &WatchConfig::default(),
//!         NormalizeHandler::new(normalizer),
//!     )?;
//!
//!     while let Some(report) = watcher.recv().await {
//!         if report.changed_anything() {
//!             println!("{}: renamed {}", report.event.target(), report.stats.renamed);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Using with `tokio::select!`
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use jaso_core::{SkipPolicy, WatchConfig};
//! # use jaso_normalize::Normalizer;
//! # use jaso_watcher::{NormalizeHandler, NormalizingWatcher};
//! # use camino::Utf8Path;
//! # async fn example() -> Result<(), jaso_watcher::WatchError> {
//! let handler = NormalizeHandler::new(Arc::new(Normalizer::new(SkipPolicy::default())));
//! let mut watcher = NormalizingWatcher::start(Utf8Path::new("."), &WatchConfig::default(), handler)?;
//!
//! loop {
//!     tokio::select! {
//!         Some(report) = watcher.recv() => {
//!             println!("{} {}", report.event.kind_label(), report.event.target());
//!         }
//!         _ = tokio::signal::ctrl_c() => break,
//!     }
//! }
//! watcher.stop();
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Only starting a watcher can fail ([`WatchError`]). Once running, rename
//! failures are absorbed by the normalizer and surface as counters in each
//! [`DispatchReport`]; backend errors are logged.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod handler;
pub mod watcher;

// Re-export error types
pub use error::WatchError;

// Re-export event types
pub use events::{DispatchReport, FsEvent, FsEvents};

// Re-export handler types
pub use handler::{ChangeHandler, NormalizeHandler};

// Re-export watcher types
pub use watcher::{NormalizingWatcher, WatchState};
