//! Substring-based skip policy.
//!
//! Some locations reject renames outright (cloud-sync staging folders) or
//! hold short-lived files that are not worth touching. A [`SkipPolicy`]
//! answers, from the path string alone, whether any action should be taken.
//!
//! # Examples
//!
//! ```
//! use jaso_core::SkipPolicy;
//! use camino::Utf8Path;
//!
//! let policy = SkipPolicy::default();
//! assert!(policy.should_skip(Utf8Path::new(
//!     "/Users/me/Library/CloudStorage/Dropbox/notes.txt"
//! )));
//! assert!(!policy.should_skip(Utf8Path::new("/Users/me/Documents/notes.txt")));
//! ```

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Substrings skipped unless the user opts out of the defaults.
///
/// Renames under cloud-storage mounts routinely fail with `EPERM`/`EACCES`,
/// and `/.tmp/` holds transient files.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    "/Library/CloudStorage/GoogleDrive-",
    "/Library/CloudStorage/OneDrive",
    "/Library/CloudStorage/Dropbox",
    "/.tmp/",
];

/// An immutable set of path substrings that exclude a path from processing.
///
/// Matching is a plain substring test against the full path, so the order of
/// patterns never matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkipPolicy {
    patterns: SmallVec<[String; 4]>,
}

impl SkipPolicy {
    /// Creates a policy from the given substrings.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a policy that never skips anything.
    #[must_use]
    pub fn none() -> Self {
        Self {
            patterns: SmallVec::new(),
        }
    }

    /// Adds a pattern, ignoring duplicates.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
        self
    }

    /// Returns `true` if `path` contains any configured substring.
    #[inline]
    pub fn should_skip(&self, path: &Utf8Path) -> bool {
        self.matches_str(path.as_str())
    }

    /// Same as [`should_skip`](Self::should_skip) for a raw string.
    pub fn matches_str(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| path.contains(pattern.as_str()))
    }

    /// Returns the configured patterns.
    #[inline]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` if no patterns are configured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_PATTERNS.iter().copied())
    }
}
