//! Configuration structures for the jaso normalizer.
//!
//! This module provides configuration types for all components of the application:
//!
//! - [`WatchConfig`] - Watch root and subscription settings
//! - [`SkipConfig`] - Skip-policy patterns
//! - [`NormalizeConfig`] - Rename behaviour (dry run)
//! - [`Config`] - Root configuration combining all settings
//!
//! Every section implements [`Default`], and missing JSON fields fall back to
//! those defaults. Configuration is read once at startup and never reloaded.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::skip::SkipPolicy;

/// Default capacity of the dispatch report channel.
const DEFAULT_REPORT_CAPACITY: usize = 100;

/// Configuration for the directory watcher.
///
/// # Examples
///
/// ```
/// use jaso_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert!(config.recursive);
/// assert!(!config.initial_scan);
/// assert_eq!(config.report_capacity, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory to watch. Must exist and be a directory at startup.
    pub root: Utf8PathBuf,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,

    /// Normalize the whole root once after the subscription is established.
    pub initial_scan: bool,

    /// Capacity of the dispatch report channel.
    ///
    /// Reports beyond this are dropped rather than blocking event handling.
    pub report_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::new(),
            recursive: true,
            initial_scan: false,
            report_capacity: DEFAULT_REPORT_CAPACITY,
        }
    }
}

/// Configuration for the skip policy.
///
/// # Examples
///
/// ```
/// use jaso_core::SkipConfig;
/// use camino::Utf8Path;
///
/// let config = SkipConfig {
///     use_defaults: false,
///     patterns: vec!["/node_modules/".to_owned()],
/// };
/// let policy = config.policy();
/// assert!(policy.should_skip(Utf8Path::new("/p/node_modules/x")));
/// assert!(!policy.should_skip(Utf8Path::new("/x/.tmp/y")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipConfig {
    /// Include [`DEFAULT_SKIP_PATTERNS`](crate::DEFAULT_SKIP_PATTERNS).
    pub use_defaults: bool,

    /// Additional substrings to skip.
    pub patterns: Vec<String>,
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            use_defaults: true,
            patterns: Vec::new(),
        }
    }
}

impl SkipConfig {
    /// Builds the immutable [`SkipPolicy`] described by this section.
    #[must_use]
    pub fn policy(&self) -> SkipPolicy {
        let base = if self.use_defaults {
            SkipPolicy::default()
        } else {
            SkipPolicy::none()
        };
        self.patterns
            .iter()
            .fold(base, |policy, pattern| policy.with_pattern(pattern.as_str()))
    }
}

/// Configuration for the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Report the renames that would happen without performing them.
    pub dry_run: bool,
}

/// Root configuration for jaso.
///
/// # Examples
///
/// ```
/// use jaso_core::Config;
///
/// let config = Config::from_json_str(r#"{"watch": {"root": "/data"}}"#).unwrap();
/// assert_eq!(config.watch.root, "/data");
/// assert!(config.skip.use_defaults);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watcher configuration.
    pub watch: WatchConfig,

    /// Skip-policy configuration.
    pub skip: SkipConfig,

    /// Normalizer configuration.
    pub normalize: NormalizeConfig,
}

impl Config {
    /// Parses a configuration from JSON text and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks option values that serde cannot express.
    ///
    /// The watch root is validated separately by [`validate_watch_root`]
    /// because it is usually supplied on the command line after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.report_capacity == 0 {
            return Err(ConfigError::InvalidOption {
                option: "watch.report_capacity".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        if self.skip.patterns.iter().any(String::is_empty) {
            return Err(ConfigError::InvalidOption {
                option: "skip.patterns".to_owned(),
                reason: "empty pattern would skip every path".to_owned(),
            });
        }

        Ok(())
    }
}

/// Verifies that `root` names an existing directory.
///
/// Symbolic links are followed, so a link to a directory is a valid root.
///
/// # Examples
///
/// ```
/// use jaso_core::{validate_watch_root, ConfigError};
/// use camino::Utf8Path;
///
/// let err = validate_watch_root(Utf8Path::new("/definitely/not/here")).unwrap_err();
/// assert!(matches!(err, ConfigError::MissingDirectory(_)));
/// ```
pub fn validate_watch_root(root: &Utf8Path) -> Result<(), ConfigError> {
    if root.as_str().is_empty() {
        return Err(ConfigError::InvalidPath {
            path: root.to_owned(),
            reason: "watch root is required".to_owned(),
        });
    }

    if !root.exists() {
        return Err(ConfigError::MissingDirectory(root.to_owned()));
    }

    if !root.is_dir() {
        return Err(ConfigError::NotADirectory(root.to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::default();
        assert!(config.root.as_str().is_empty());
        assert!(config.recursive);
        assert!(!config.initial_scan);
        assert_eq!(config.report_capacity, 100);
    }

    #[test]
    fn test_skip_config_defaults_include_builtin_patterns() {
        let policy = SkipConfig::default().policy();
        assert!(policy.should_skip(Utf8Path::new("/a/.tmp/b")));
    }

    #[test]
    fn test_skip_config_extra_patterns() {
        let config = SkipConfig {
            use_defaults: true,
            patterns: vec!["/.git/".to_owned()],
        };
        let policy = config.policy();
        assert!(policy.should_skip(Utf8Path::new("/a/.git/HEAD")));
        assert!(policy.should_skip(Utf8Path::new("/a/.tmp/b")));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"skip": {"patterns": ["/cache/"]}, "normalize": {"dry_run": true}}"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.skip.patterns, vec!["/cache/"]);
        assert!(config.skip.use_defaults);
        assert!(config.normalize.dry_run);
        assert!(config.watch.recursive);
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let err = Config::from_json_str(r#"{"watch": {"report_capacity": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("watch.report_capacity"));
    }

    #[test]
    fn test_config_rejects_empty_pattern() {
        let err = Config::from_json_str(r#"{"skip": {"patterns": [""]}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }));
    }

    #[test]
    fn test_config_parse_error() {
        let err = Config::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jaso.json");
        std::fs::write(&path, r#"{"watch": {"initial_scan": true}}"#).unwrap();

        let path = Utf8Path::from_path(&path).unwrap();
        let config = Config::load(path).unwrap();
        assert!(config.watch.initial_scan);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = Config::load(Utf8Path::new("/no/such/jaso.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validate_watch_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        assert!(validate_watch_root(root).is_ok());

        let file = root.join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            validate_watch_root(&file),
            Err(ConfigError::NotADirectory(_))
        ));

        assert!(matches!(
            validate_watch_root(&root.join("missing")),
            Err(ConfigError::MissingDirectory(_))
        ));

        assert!(matches!(
            validate_watch_root(Utf8Path::new("")),
            Err(ConfigError::InvalidPath { .. })
        ));
    }
}
