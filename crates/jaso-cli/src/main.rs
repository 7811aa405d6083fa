//! CLI entry point for jaso.
//!
//! Keeps file and directory names in Unicode Normalization Form C. Names
//! written in decomposed form (NFD), as macOS tools commonly produce for
//! Korean Hangul and accented Latin text, are renamed to their composed form.
//!
//! # Usage
//!
//! ```bash
//! jaso [OPTIONS] <COMMAND>
//!
//! # Watch a directory and normalize every change under it
//! jaso watch ~/Downloads --initial-scan
//!
//! # Normalize a tree once, showing what would change
//! jaso fix ~/Documents --dry-run
//!
//! # Machine-readable pass statistics
//! jaso fix ~/Documents --json
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use jaso_core::{Config, validate_watch_root};
use jaso_normalize::{Normalizer, PassStats};
use jaso_watcher::{DispatchReport, NormalizeHandler, NormalizingWatcher};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Renames files and directories so their names are NFC.
#[derive(Debug, Parser)]
#[command(name = "jaso", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "JASO_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Skip paths containing this substring (repeatable).
    #[arg(long = "skip", value_name = "SUBSTR", global = true)]
    skip: Vec<String>,

    /// Do not apply the built-in cloud-storage and `/.tmp/` skip patterns.
    #[arg(long, global = true)]
    no_default_skips: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Watch a directory and normalize names as they change.
    Watch {
        /// Directory to watch (defaults to `watch.root` from the config file).
        #[arg(env = "JASO_ROOT")]
        root: Option<Utf8PathBuf>,

        /// Normalize the whole tree once before handling events.
        #[arg(long)]
        initial_scan: bool,

        /// Only watch the root's direct children.
        #[arg(long)]
        non_recursive: bool,
    },

    /// Normalize a file or directory tree once and exit.
    Fix {
        /// File or directory to normalize.
        path: Utf8PathBuf,

        /// Report renames without performing them.
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print pass statistics as JSON.
        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// The `notify` backend is filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn,mio=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Loads the config file (if any) and applies the global flags on top.
///
/// # Errors
///
/// Returns an error if the config file cannot be read, parsed, or holds
/// invalid options.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            debug!(path = %path, "Loaded configuration file");
            config
        }
        None => Config::default(),
    };

    if cli.no_default_skips {
        config.skip.use_defaults = false;
    }
    config.skip.patterns.extend(cli.skip.iter().cloned());

    config.validate()?;
    Ok(config)
}

fn build_normalizer(config: &Config) -> Normalizer {
    Normalizer::new(config.skip.policy()).dry_run(config.normalize.dry_run)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Watches `config.watch.root` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the root is invalid or the subscription fails.
async fn run_watch(config: Config) -> color_eyre::Result<()> {
    validate_watch_root(&config.watch.root)?;

    let normalizer = Arc::new(build_normalizer(&config));
    let mut watcher = NormalizingWatcher::start(
        &config.watch.root,
        &config.watch,
        NormalizeHandler::new(Arc::clone(&normalizer)),
    )?;

    if config.watch.initial_scan {
        let root = watcher.watch_root().to_owned();
        tokio::task::spawn_blocking(move || {
            info!(path = %root, "Starting initial scan");
            let stats = normalizer.normalize_subtree(&root);
            info!(
                visited = stats.visited,
                renamed = stats.renamed,
                planned = stats.planned,
                conflicts = stats.conflicts,
                failures = stats.failures(),
                "Initial scan complete"
            );
        });
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            report = watcher.recv() => match report {
                Some(report) => log_report(&report),
                None => break,
            },
            result = &mut shutdown => {
                result?;
                break;
            }
        }
    }

    watcher.stop();
    info!("Shutting down");
    Ok(())
}

/// Resolves once Ctrl-C or SIGTERM is received.
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C");
            result
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
            Ok(())
        }
    }
}

/// Resolves once Ctrl-C is received.
#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    let result = tokio::signal::ctrl_c().await;
    info!("Received Ctrl-C");
    result
}

fn log_report(report: &DispatchReport) {
    let stats = &report.stats;
    let elapsed_ms = report.elapsed.as_millis();

    if report.changed_anything() || stats.failures() > 0 {
        info!(
            kind = report.event.kind_label(),
            path = %report.event.target(),
            renamed = stats.renamed,
            planned = stats.planned,
            failures = stats.failures(),
            elapsed_ms,
            "Normalized"
        );
    } else {
        debug!(
            kind = report.event.kind_label(),
            path = %report.event.target(),
            visited = stats.visited,
            skipped = stats.skipped,
            elapsed_ms,
            "No changes"
        );
    }
}

/// Runs one normalization pass over `path`.
///
/// # Errors
///
/// Returns an error if `path` doesn't exist, output cannot be written, or
/// any entry could not be renamed.
fn run_fix(config: &Config, path: &Utf8Path, json: bool) -> color_eyre::Result<()> {
    if path.symlink_metadata().is_err() {
        return Err(color_eyre::eyre::eyre!("Path does not exist: {path}"));
    }

    info!(path = %path, dry_run = config.normalize.dry_run, "Normalizing");
    let stats = build_normalizer(config).normalize_subtree(path);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut handle, &stats)?;
        writeln!(handle)?;
    } else {
        write_summary(&mut handle, &stats, config.normalize.dry_run)?;
    }

    match stats.failures() {
        0 => Ok(()),
        n => Err(color_eyre::eyre::eyre!("{n} entries could not be normalized")),
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Writes a human-readable summary of a pass.
fn write_summary(out: &mut impl Write, stats: &PassStats, dry_run: bool) -> std::io::Result<()> {
    let (label, changed) = if dry_run {
        ("Would rename:", stats.planned)
    } else {
        ("Renamed:", stats.renamed)
    };

    writeln!(out, "Visited:      {}", stats.visited)?;
    writeln!(out, "{label:<13} {changed}")?;
    writeln!(out, "Unchanged:    {}", stats.unchanged)?;
    writeln!(out, "Skipped:      {}", stats.skipped)?;
    writeln!(out, "Conflicts:    {}", stats.conflicts)?;
    writeln!(out, "Failures:     {}", stats.failures())?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Merge config file and flags
    let mut config = build_config(&cli)?;

    // 5. Route to appropriate command
    match cli.command {
        Commands::Watch {
            root,
            initial_scan,
            non_recursive,
        } => {
            if let Some(root) = root {
                config.watch.root = root;
            }
            config.watch.initial_scan |= initial_scan;
            if non_recursive {
                config.watch.recursive = false;
            }
            run_watch(config).await
        }
        Commands::Fix {
            path,
            dry_run,
            json,
        } => {
            config.normalize.dry_run |= dry_run;
            run_fix(&config, &path, json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch() {
        let cli = parse(&["jaso", "watch", "/data", "--initial-scan", "--non-recursive"]);
        match cli.command {
            Commands::Watch {
                root,
                initial_scan,
                non_recursive,
            } => {
                assert_eq!(root.as_deref(), Some(Utf8Path::new("/data")));
                assert!(initial_scan);
                assert!(non_recursive);
            }
            Commands::Fix { .. } => panic!("expected watch"),
        }
    }

    #[test]
    fn test_parse_fix_with_global_flags() {
        let cli = parse(&[
            "jaso",
            "fix",
            "/data/docs",
            "--dry-run",
            "--json",
            "--skip",
            "node_modules",
            "--skip",
            "/.git/",
            "--no-default-skips",
            "-v",
        ]);

        assert_eq!(cli.skip, ["node_modules", "/.git/"]);
        assert!(cli.no_default_skips);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Fix {
                dry_run: true,
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn test_fix_requires_path() {
        assert!(Cli::try_parse_from(["jaso", "fix"]).is_err());
    }

    #[test]
    fn test_build_config_applies_skip_flags() {
        let cli = parse(&[
            "jaso",
            "fix",
            "/x",
            "--no-default-skips",
            "--skip",
            "build",
        ]);
        let config = build_config(&cli).expect("config");
        let policy = config.skip.policy();

        assert_eq!(policy.patterns(), ["build".to_owned()]);
        assert!(!policy.should_skip(Utf8Path::new("/Library/CloudStorage/Dropbox/x")));
    }

    #[test]
    fn test_build_config_rejects_empty_skip() {
        let cli = parse(&["jaso", "fix", "/x", "--skip", ""]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_build_config_reads_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("jaso.json");
        fs::write(
            &path,
            r#"{"watch": {"initial_scan": true}, "skip": {"patterns": ["cache"]}}"#,
        )
        .expect("write config");
        let path = path.to_str().expect("UTF-8 path");

        let cli = parse(&["jaso", "--config", path, "fix", "/x", "--skip", "dist"]);
        let config = build_config(&cli).expect("config");

        assert!(config.watch.initial_scan);
        assert_eq!(config.skip.patterns, ["cache", "dist"]);
        assert!(config.skip.use_defaults);
    }

    #[test]
    fn test_write_summary() {
        let stats = PassStats {
            visited: 4,
            renamed: 2,
            unchanged: 2,
            ..PassStats::default()
        };
        let mut out = Vec::new();
        write_summary(&mut out, &stats, false).expect("write");
        let text = String::from_utf8(out).expect("UTF-8");

        assert!(text.contains("Visited:      4"));
        assert!(text.contains("Renamed:      2"));
        assert!(text.contains("Failures:     0"));
    }

    #[test]
    fn test_run_fix_normalizes_tree() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
        fs::write(root.join("cafe\u{301}.txt"), "x").expect("write");

        run_fix(&Config::default(), &root, true).expect("fix");
        assert!(root.join("caf\u{E9}.txt").exists());
    }

    #[test]
    fn test_run_fix_missing_path() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
        assert!(run_fix(&Config::default(), &root.join("gone"), false).is_err());
    }
}
