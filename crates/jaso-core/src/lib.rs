//! Core types, errors, and utilities for the jaso normalizer.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Config`] and its sections, loaded from JSON or built from CLI flags
//! - [`ConfigError`] for fatal startup failures
//! - [`SkipPolicy`], the substring exclusion list consulted before any
//!   traversal or rename

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod skip;

pub use config::{Config, NormalizeConfig, SkipConfig, WatchConfig, validate_watch_root};
pub use error::ConfigError;
pub use skip::{DEFAULT_SKIP_PATTERNS, SkipPolicy};
