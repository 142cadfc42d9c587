//! Build automation for the pgmock workspace.
//!
//! Run with `cargo xtask <command>`.
//!
//! ## Commands
//!
//! - `ci`: formatting, clippy, the feature matrix and docs
//! - `fmt`: check or apply formatting
//! - `clippy`: lint every target with all features
//! - `test`: run tests, optionally across each type-support feature alone
//! - `doc`: build API documentation
//! - `fuzz`: run one of the targets under `fuzz/fuzz_targets`
//! - `semver`: check the published crates with cargo-semver-checks

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

/// Crates published to crates.io, in dependency order.
const PUBLISHED_CRATES: [&str; 3] = ["pgmock-types", "pgmock-client", "pgmock-testing"];

/// Optional type-support features forwarded through every library crate.
const TYPE_FEATURES: [&str; 4] = ["chrono", "uuid", "decimal", "json"];

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for pgmock")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every check CI runs
    Ci,
    /// Check formatting (--fix to apply)
    Fmt {
        /// Apply formatting
        #[arg(long)]
        fix: bool,
    },
    /// Run clippy over all targets and features
    Clippy,
    /// Run tests
    Test {
        /// Only test this package
        #[arg(short, long)]
        package: Option<String>,
        /// Also test with no type features and with each feature alone
        #[arg(long)]
        matrix: bool,
    },
    /// Build documentation
    Doc {
        /// Open in a browser
        #[arg(long)]
        open: bool,
    },
    /// Run a fuzz target (requires cargo-fuzz + nightly)
    Fuzz {
        /// Target name; omit to list the available targets
        target: Option<String>,
        /// Maximum runtime in seconds
        #[arg(long, default_value = "60")]
        max_time: u64,
    },
    /// Check published crates for semver violations
    Semver,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;
    sh.change_dir(workspace_root()?);

    match cli.command {
        Command::Ci => {
            cmd!(sh, "cargo fmt --all -- --check").run()?;
            clippy(&sh)?;
            test(&sh, None, true)?;
            doc(&sh, false)?;
            println!("\n✅ All CI checks passed!");
        }
        Command::Fmt { fix: true } => cmd!(sh, "cargo fmt --all").run()?,
        Command::Fmt { fix: false } => cmd!(sh, "cargo fmt --all -- --check").run()?,
        Command::Clippy => clippy(&sh)?,
        Command::Test { package, matrix } => test(&sh, package.as_deref(), matrix)?,
        Command::Doc { open } => doc(&sh, open)?,
        Command::Fuzz { target, max_time } => fuzz(&sh, target.as_deref(), max_time)?,
        Command::Semver => {
            for krate in PUBLISHED_CRATES {
                cmd!(sh, "cargo semver-checks check-release -p {krate}").run()?;
            }
        }
    }

    Ok(())
}

fn workspace_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("failed to run cargo locate-project")?;
    let manifest = String::from_utf8(output.stdout).context("invalid UTF-8 in cargo output")?;
    Path::new(manifest.trim())
        .parent()
        .map(Path::to_path_buf)
        .context("manifest path has no parent")
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --workspace --all-features --all-targets -- -D warnings").run()?;
    Ok(())
}

fn test(sh: &Shell, package: Option<&str>, matrix: bool) -> Result<()> {
    let scope: Vec<&str> = match package {
        Some(pkg) => vec!["-p", pkg],
        None => vec!["--workspace"],
    };

    cmd!(sh, "cargo test {scope...} --all-features").run()?;
    if !matrix {
        return Ok(());
    }

    // The workspace root is virtual, so feature flags need an explicit package.
    let packages: Vec<&str> = package.map_or(PUBLISHED_CRATES.to_vec(), |pkg| vec![pkg]);
    for pkg in packages {
        println!("Testing {pkg} without type features...");
        cmd!(sh, "cargo test -p {pkg} --no-default-features").run()?;
        for feature in TYPE_FEATURES {
            println!("Testing {pkg} with only `{feature}`...");
            cmd!(sh, "cargo test -p {pkg} --no-default-features --features {feature}").run()?;
        }
    }
    Ok(())
}

fn doc(sh: &Shell, open: bool) -> Result<()> {
    let open = open.then_some("--open");
    cmd!(sh, "cargo doc --workspace --all-features --no-deps {open...}").run()?;
    Ok(())
}

fn fuzz(sh: &Shell, target: Option<&str>, max_time: u64) -> Result<()> {
    let targets_dir = sh.current_dir().join("fuzz").join("fuzz_targets");
    let mut targets = Vec::new();
    for entry in fs::read_dir(&targets_dir)
        .with_context(|| format!("reading {}", targets_dir.display()))?
    {
        if let Some(stem) = entry?.path().file_stem() {
            targets.push(stem.to_string_lossy().into_owned());
        }
    }
    targets.sort();

    let Some(target) = target else {
        println!("Available fuzz targets:");
        for name in &targets {
            println!("  - {name}");
        }
        return Ok(());
    };
    if !targets.iter().any(|name| name == target) {
        bail!("unknown fuzz target `{target}` (expected one of: {})", targets.join(", "));
    }

    let max_time = format!("-max_total_time={max_time}");
    cmd!(sh, "cargo +nightly fuzz run {target} -- {max_time}").run()?;
    Ok(())
}
