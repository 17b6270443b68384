// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
// CLI argument definitions for goup
//
// Separated from main.rs so that build.rs can include this file
// to generate the man page via clap_mangen.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "goup", version, about = "Go SDK version manager")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Make the operation more talkative
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a Go version (downloading it if necessary) and make it active
    #[command(name = "use")]
    Use(UseArgs),

    /// Print the active Go version
    #[command(visible_alias = "c")]
    Current,

    /// List installed Go versions
    #[command(visible_alias = "list")]
    Ls,

    /// List Go versions published upstream
    #[command(name = "lsr", visible_aliases = ["ls-remote", "list-remote"])]
    Lsr(LsrArgs),

    /// Check whether newer Go versions are available
    Check(CheckArgs),

    /// Remove installed Go versions
    Clean(CleanArgs),

    /// Remove a single installed Go version
    Drop(DropArgs),

    /// Print shell commands that put the active Go on PATH
    Env,

    /// Run the active `go` toolchain with the managed environment
    #[command(visible_aliases = ["e", "run"])]
    Exec(ExecArgs),
}

#[derive(clap::Args)]
pub struct UseArgs {
    /// Version to install: "stable", "unstable", or a possibly-partial
    /// version such as "1.21" or "1.20.4"
    #[arg(value_name = "VERSION", default_value = "stable")]
    pub version: String,
}

#[derive(clap::Args)]
pub struct LsrArgs {
    /// Which published versions to list
    #[arg(value_enum, default_value_t = VersionFilter::All)]
    pub filter: VersionFilter,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VersionFilter {
    /// Only stable releases
    Stable,
    /// Only pre-releases
    Unstable,
    /// Everything
    All,
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Print output only when an update is available
    #[arg(long)]
    pub notify: bool,
}

#[derive(clap::Args)]
pub struct CleanArgs {
    /// Also remove the active version
    #[arg(long)]
    pub all: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(clap::Args)]
pub struct ExecArgs {
    /// Arguments passed through to `go`
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(clap::Args)]
pub struct DropArgs {
    /// Version to remove
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Skip the confirmation prompt when removing the active version
    #[arg(short, long)]
    pub yes: bool,
}
