//! Watcher that normalizes names as changes arrive.
//!
//! This module provides [`NormalizingWatcher`], which subscribes to change
//! notifications under a root directory and runs a [`ChangeHandler`] for
//! every relevant event.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 notify backend thread                        │
//! │  ┌──────────────────┐    ┌──────────────┐    ┌────────────┐  │
//! │  │ RecommendedWatcher│ -> │ from_notify  │ -> │ Handler    │  │
//! │  │ (notify)         │    │ (translate)  │    │ (normalize)│  │
//! │  └──────────────────┘    └──────────────┘    └─────┬──────┘  │
//! └────────────────────────────────────────────────────│─────────┘
//!                                                      │
//!                                             try_send │
//!                                                      ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Async Runtime (tokio)                        │
//! │  ┌────────────────────┐    ┌──────────────────┐              │
//! │  │ NormalizingWatcher │    │ mpsc::Receiver   │ -> CLI loop  │
//! │  │ (stop control)     │    │ (DispatchReport) │              │
//! │  └────────────────────┘    └──────────────────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are handled on the backend thread, one at a time and in arrival
//! order. Reports are sent without blocking: when the consumer falls behind,
//! reports are dropped but normalization carries on.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use jaso_core::WatchConfig;

use crate::error::WatchError;
use crate::events::{DispatchReport, FsEvent};
use crate::handler::ChangeHandler;

/// Lifecycle state of a [`NormalizingWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Not subscribed. Terminal once a watcher has been stopped.
    Idle,
    /// Subscribed and dispatching events.
    Watching,
}

/// Subscribes to changes under a root and dispatches them to a handler.
///
/// # Lifecycle
///
/// 1. **Start**: [`NormalizingWatcher::start`] validates the root, subscribes
///    and enters [`WatchState::Watching`].
///
/// 2. **Reports**: every handled event produces a [`DispatchReport`], read
///    with [`recv`](Self::recv) or [`try_recv`](Self::try_recv).
///
/// 3. **Stop**: [`stop`](Self::stop) (or dropping the watcher) unsubscribes.
///    A handler call already in progress runs to completion; buffered
///    reports can still be drained afterwards.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use jaso_core::{SkipPolicy, WatchConfig};
/// use jaso_normalize::Normalizer;
/// use jaso_watcher::{NormalizeHandler, NormalizingWatcher};
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), jaso_watcher::WatchError> {
/// let handler = NormalizeHandler::new(Arc::new(Normalizer::new(SkipPolicy::default())));
/// let mut watcher = NormalizingWatcher::start(
///     Utf8Path::new("/Users/me/Downloads"),
///     &WatchConfig::default(),
///     handler,
/// )?;
///
/// while let Some(report) = watcher.recv().await {
///     println!("{} {}: {} renamed", report.event.kind_label(), report.event.target(), report.stats.renamed);
/// }
/// # Ok(())
/// # }
/// ```
pub struct NormalizingWatcher {
    /// The notify subscription. `None` once stopped.
    watcher: Option<RecommendedWatcher>,

    /// Report receiver for async consumption.
    report_rx: mpsc::Receiver<DispatchReport>,

    /// Canonical path of the watch root.
    watch_root: Utf8PathBuf,
}

impl std::fmt::Debug for NormalizingWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizingWatcher")
            .field("watch_root", &self.watch_root)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl NormalizingWatcher {
    /// Starts watching `root` and dispatching its events to `handler`.
    ///
    /// Subscribes recursively unless `config.recursive` is `false`. Reports
    /// are buffered up to `config.report_capacity`.
    ///
    /// Does not need a running tokio runtime; the report channel can be
    /// drained from any context.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if `root` doesn't exist,
    /// [`WatchError::NotADirectory`] if it is not a directory, and
    /// [`WatchError::Notify`] if the subscription cannot be established.
    pub fn start<H: ChangeHandler>(
        root: &Utf8Path,
        config: &WatchConfig,
        handler: H,
    ) -> Result<Self, WatchError> {
        if !root.exists() {
            return Err(WatchError::path_not_found(root));
        }
        if !root.is_dir() {
            return Err(WatchError::not_a_directory(root));
        }

        let watch_root = root.canonicalize_utf8()?;
        let (report_tx, report_rx) = mpsc::channel(config.report_capacity.max(1));

        let mut watcher = notify::recommended_watcher(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => {
                    for event in FsEvent::from_notify(event) {
                        dispatch(&handler, event, &report_tx);
                    }
                }
                Err(error) => tracing::warn!(error = %error, "Watcher backend error"),
            },
        )?;

        let mode = if config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(watch_root.as_std_path(), mode)?;

        tracing::info!(path = %watch_root, recursive = config.recursive, "Watching directory");

        Ok(Self {
            watcher: Some(watcher),
            report_rx,
            watch_root,
        })
    }

    /// Receives the next report asynchronously.
    ///
    /// Returns `None` once the watcher has stopped and every buffered report
    /// has been read.
    pub async fn recv(&mut self) -> Option<DispatchReport> {
        self.report_rx.recv().await
    }

    /// Tries to receive a report without waiting.
    ///
    /// # Errors
    ///
    /// [`TryRecvError::Empty`](mpsc::error::TryRecvError::Empty) if no report
    /// is buffered, [`TryRecvError::Disconnected`](mpsc::error::TryRecvError::Disconnected)
    /// once stopped and drained.
    pub fn try_recv(&mut self) -> Result<DispatchReport, mpsc::error::TryRecvError> {
        self.report_rx.try_recv()
    }

    /// Returns the canonical watch root.
    #[must_use]
    pub fn watch_root(&self) -> &Utf8Path {
        &self.watch_root
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WatchState {
        if self.watcher.is_some() {
            WatchState::Watching
        } else {
            WatchState::Idle
        }
    }

    /// Returns `true` while subscribed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state(), WatchState::Watching)
    }

    /// Unsubscribes and moves to [`WatchState::Idle`].
    ///
    /// Calling it again is a no-op.
    pub fn stop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            drop(watcher);
            tracing::info!(path = %self.watch_root, "Stopped watching");
        }
    }
}

impl Drop for NormalizingWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs the handler for one event and forwards the report.
fn dispatch<H: ChangeHandler>(handler: &H, event: FsEvent, report_tx: &mpsc::Sender<DispatchReport>) {
    tracing::trace!(kind = event.kind_label(), path = %event.target(), "Handling event");

    let started = Instant::now();
    let stats = handler.handle(&event);
    let report = DispatchReport {
        event,
        stats,
        elapsed: started.elapsed(),
    };

    match report_tx.try_send(report) {
        Ok(()) => {}
        Err(TrySendError::Full(report)) => {
            tracing::debug!(path = %report.event.target(), "Report channel full, dropping report");
        }
        Err(TrySendError::Closed(_)) => {
            tracing::trace!("Report receiver dropped");
        }
    }
}
