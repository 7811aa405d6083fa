//! Build automation tasks for the jaso workspace.
//!
//! Run with: `cargo run -p xtask -- <command>`
//!
//! # Available Commands
//!
//! - `check`: Run all checks (fmt, clippy, test)
//! - `fmt`: Format code with rustfmt
//! - `lint`: Run clippy with all targets
//! - `test`: Run all tests
//! - `build`: Build release binary
//! - `fixture`: Create a tree of NFD-named entries for manual testing

// xtask is a build tool - printing to stderr is expected
#![allow(clippy::print_stderr)]

use std::process::Command;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};

/// Decomposed names: Hangul jamo sequences and a combining accent.
const FIXTURE_DIRS: &[&str] = &[
    "\u{1111}\u{1169}\u{11AF}\u{1103}\u{1165}",
    "\u{1106}\u{116E}\u{11AB}\u{1109}\u{1165}",
];
const FIXTURE_FILES: &[&str] = &[
    "\u{1111}\u{1161}\u{110B}\u{1175}\u{11AF}.txt",
    "cafe\u{301}.md",
    "plain.txt",
];

/// Build automation for jaso
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for jaso")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks (fmt --check, clippy, test)
    Check,
    /// Format code with rustfmt
    Fmt {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy lints
    Lint {
        /// Automatically fix lint warnings
        #[arg(long)]
        fix: bool,
    },
    /// Run all tests
    Test {
        /// Run tests with release optimizations
        #[arg(long)]
        release: bool,
    },
    /// Build the `jaso` binary
    Build {
        /// Build in debug mode
        #[arg(long)]
        debug: bool,
    },
    /// Create NFD-named directories and files under DIR
    Fixture {
        /// Directory to populate (created if missing)
        dir: Utf8PathBuf,
    },
}

fn cargo(args: &[&str]) -> Result<()> {
    eprintln!("$ cargo {}", args.join(" "));
    let status = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_owned()))
        .args(args)
        .status()
        .context("failed to spawn cargo")?;

    if !status.success() {
        bail!("cargo {} failed with {status}", args.join(" "));
    }
    Ok(())
}

fn fmt(check: bool) -> Result<()> {
    if check {
        cargo(&["fmt", "--all", "--", "--check"])
    } else {
        cargo(&["fmt", "--all"])
    }
}

fn lint(fix: bool) -> Result<()> {
    let mut args = vec!["clippy", "--workspace", "--all-targets"];
    if fix {
        args.extend(["--fix", "--allow-dirty"]);
    }
    args.extend(["--", "-D", "warnings"]);
    cargo(&args)
}

fn test(release: bool) -> Result<()> {
    let mut args = vec!["test", "--workspace"];
    if release {
        args.push("--release");
    }
    cargo(&args)
}

fn build(debug: bool) -> Result<()> {
    let mut args = vec!["build", "-p", "jaso-cli"];
    if !debug {
        args.push("--release");
    }
    cargo(&args)
}

fn fixture(dir: &Utf8Path) -> Result<()> {
    for name in FIXTURE_DIRS {
        let sub = dir.join(name);
        std::fs::create_dir_all(&sub).with_context(|| format!("failed to create {sub}"))?;
        for file in FIXTURE_FILES {
            let path = sub.join(file);
            std::fs::write(&path, name.as_bytes())
                .with_context(|| format!("failed to write {path}"))?;
        }
    }
    eprintln!(
        "created {} directories with {} files each under {dir}",
        FIXTURE_DIRS.len(),
        FIXTURE_FILES.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt(true)?;
            lint(false)?;
            test(false)
        }
        Commands::Fmt { check } => fmt(check),
        Commands::Lint { fix } => lint(fix),
        Commands::Test { release } => test(release),
        Commands::Build { debug } => build(debug),
        Commands::Fixture { dir } => fixture(&dir),
    }
}
