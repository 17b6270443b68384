// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
// Allow multiple crate versions for Windows-only dependencies (we only target Unix)
#![allow(clippy::multiple_crate_versions)]
//! goup - Go SDK version manager
//!
//! This is the main entry point for the goup CLI tool, which downloads,
//! installs and switches between Go SDK versions.
//!
//! The application supports:
//! - Installing specific (or the latest) Go versions
//! - Switching the active version atomically
//! - Listing installed and upstream-published versions
//! - Checking for newer versions relative to the active one
//! - Removing installed versions in bulk or one at a time
//! - Catalog caching for fewer network round-trips

use std::error::Error;
use std::process::{Command, exit};

use clap::Parser;
use console::style;
use dialoguer::Confirm;

use goup::catalog::{self, Catalog};
use goup::cli::{
    CheckArgs, Cli, CleanArgs, Commands, DropArgs, ExecArgs, LsrArgs, UseArgs, VersionFilter,
};
use goup::clean::{self, CleanScope};
use goup::registry::Registry;
use goup::version::Version;
use goup::{check, install, switch};

/// Main application entry point
///
/// Parses command line arguments and dispatches to the matching command
/// handler. Errors are printed to stderr and turn into a non-zero exit.
fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Use(args) => cmd_use(&args, verbose),
        Commands::Current => cmd_current(),
        Commands::Ls => cmd_ls(),
        Commands::Lsr(args) => cmd_lsr(&args, verbose),
        Commands::Check(args) => cmd_check(&args, verbose),
        Commands::Clean(args) => cmd_clean(&args),
        Commands::Drop(args) => cmd_drop(&args),
        Commands::Env => cmd_env(),
        Commands::Exec(args) => cmd_exec(&args),
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", style("error").red().bold());
        exit(1);
    }
}

// =============================================================================
// Command Implementation Functions
// =============================================================================

/// Install a Go version and make it the active one
///
/// Resolves "stable"/"unstable" and partial versions against the upstream
/// catalog, downloads and installs the result if it is not present yet,
/// and switches the active selection to it.
fn cmd_use(args: &UseArgs, verbose: bool) -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    let (catalog, version) = resolve_spec(&args.version, verbose)?;

    let installed = install::install(&registry, &catalog, &version, verbose)?;
    switch::activate(&registry, &installed.version)?;

    println!(
        "{} Go {} is now active",
        style("success:").green().bold(),
        installed.version
    );
    Ok(())
}

/// Turn a CLI version argument into a concrete catalog version.
fn resolve_spec(input: &str, verbose: bool) -> Result<(Catalog, Version), Box<dyn Error>> {
    match input {
        "stable" => {
            let catalog = catalog::load_catalog(verbose)?;
            let version = catalog
                .latest_stable()
                .ok_or(goup::Error::NoStableVersion)?
                .version
                .clone();
            Ok((catalog, version))
        }
        "unstable" => {
            let catalog = catalog::load_catalog(verbose)?;
            let version = catalog
                .latest(true)
                .ok_or_else(|| goup::Error::NoMatchingVersion(input.to_string()))?
                .version
                .clone();
            Ok((catalog, version))
        }
        _ => {
            let spec: Version = input.parse()?;
            let (catalog, version) = install::resolve_version(&spec, verbose)?;
            if verbose && spec != version {
                eprintln!("Resolved {spec} to {version}");
            }
            Ok((catalog, version))
        }
    }
}

/// Print the active Go version
///
/// No active version is not an error; a warning goes to stderr so scripts
/// reading stdout see empty output.
fn cmd_current() -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    match registry.active_version()? {
        Some(version) => println!("{version}"),
        None => eprintln!("{} no active Go version", style("warning:").yellow().bold()),
    }
    Ok(())
}

/// List installed versions, marking the active one
fn cmd_ls() -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    let entries = registry.list()?;

    if entries.is_empty() {
        eprintln!(
            "{} no Go versions installed",
            style("warning:").yellow().bold()
        );
        return Ok(());
    }

    for entry in entries {
        if entry.active {
            println!("{}", style(format!("* {}", entry.version)).green().bold());
        } else {
            println!("  {}", entry.version);
        }
    }
    Ok(())
}

/// List versions published upstream, optionally filtered by stability
fn cmd_lsr(args: &LsrArgs, verbose: bool) -> Result<(), Box<dyn Error>> {
    let catalog = catalog::load_catalog(verbose)?;

    for release in catalog.releases() {
        let keep = match args.filter {
            VersionFilter::Stable => release.stable,
            VersionFilter::Unstable => !release.stable,
            VersionFilter::All => true,
        };
        if keep {
            println!("{}", release.version);
        }
    }
    Ok(())
}

/// Check for versions newer than the active one
///
/// Always fetches a fresh catalog; a stale cache would hide exactly the
/// updates this command exists to find. With `--notify`, output is only
/// produced when something newer exists.
fn cmd_check(args: &CheckArgs, verbose: bool) -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    let Some(current) = registry.active_version()? else {
        eprintln!(
            "{} no active Go version to check against",
            style("warning:").yellow().bold()
        );
        return Ok(());
    };

    let catalog = catalog::fetch_catalog(verbose)?;
    let report = check::find_updates(&catalog.versions(), &current);

    if report.up_to_date() {
        if !args.notify {
            println!("Go {current} is up to date");
        }
        return Ok(());
    }

    println!("New Go versions are available!");
    if let Some(pre) = &report.pre {
        print_finding("pre-release", &current, pre);
    }
    if let Some(minor) = &report.minor {
        print_finding("minor", &current, minor);
    }
    if let Some(patch) = &report.patch {
        print_finding("patch", &current, patch);
    }
    Ok(())
}

fn print_finding(kind: &str, current: &Version, new: &Version) {
    println!(
        "{}:  {} → {}",
        style(kind).magenta(),
        style(current).dim(),
        style(new).cyan()
    );
}

/// Remove installed versions, keeping the active one unless --all
fn cmd_clean(args: &CleanArgs) -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;

    let scope = if args.all {
        CleanScope::All
    } else {
        CleanScope::NonActive
    };

    // Prompt only on a terminal so scripted runs proceed without --yes.
    if !args.yes && console::user_attended() {
        let prompt = match scope {
            CleanScope::All => "Remove ALL installed Go versions?",
            CleanScope::NonActive => "Remove all non-active Go versions?",
        };
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            return Ok(());
        }
    }

    let report = clean::clean(&registry, scope)?;

    for version in &report.removed {
        println!("Removed Go {version}");
    }
    if report.removed.is_empty() && report.failed.is_empty() {
        println!("Nothing to remove");
    }

    if !report.failed.is_empty() {
        for (version, err) in &report.failed {
            eprintln!(
                "{} could not remove Go {version}: {err}",
                style("warning:").yellow().bold()
            );
        }
        return Err("some versions could not be removed".into());
    }
    Ok(())
}

/// Remove one installed version
///
/// A partial version argument is accepted as long as it matches exactly
/// one installed version.
fn cmd_drop(args: &DropArgs) -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    let spec: Version = args.version.parse()?;

    let matches: Vec<_> = registry
        .list()?
        .into_iter()
        .filter(|e| spec.covers(&e.version))
        .collect();

    let target = match matches.as_slice() {
        [] => return Err(goup::Error::NotInstalled(spec).into()),
        [one] => one,
        many => {
            let versions: Vec<String> = many.iter().map(|e| e.version.to_string()).collect();
            return Err(format!(
                "{} matches multiple installed versions: {}",
                spec,
                versions.join(", ")
            )
            .into());
        }
    };

    if target.active && !args.yes && console::user_attended() {
        let prompt = format!("Go {} is the active version. Remove it?", target.version);
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            return Ok(());
        }
    }

    clean::remove(&registry, &target.version)?;
    println!("Removed Go {}", target.version);
    Ok(())
}

/// Run the active `go` binary with the managed environment
///
/// PATH gets the managed bin directory prepended and GOROOT points at the
/// active installation, so subprocesses spawned by `go` resolve the same
/// toolchain. The child's exit status becomes our own.
fn cmd_exec(args: &ExecArgs) -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    if registry.active_version()?.is_none() {
        return Err("no active Go version (run `goup use` first)".into());
    }

    let bin_dir = registry.current_bin_dir();
    let path = match std::env::var_os("PATH") {
        Some(existing) => {
            let mut dirs = vec![bin_dir.clone()];
            dirs.extend(std::env::split_paths(&existing));
            std::env::join_paths(dirs)?
        }
        None => bin_dir.clone().into(),
    };

    let status = Command::new(bin_dir.join("go"))
        .args(&args.args)
        .env("PATH", path)
        .env("GOROOT", registry.current_goroot())
        .status()?;
    exit(status.code().unwrap_or(1));
}

/// Print shell commands that activate goup's managed Go
fn cmd_env() -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_env()?;
    println!(
        "export PATH=\"{}:$PATH\"",
        registry.current_bin_dir().display()
    );
    println!("export GOROOT=\"{}\"", registry.current_goroot().display());
    Ok(())
}
