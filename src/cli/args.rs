//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Toolwarden - discover, install and run external analysis tools.
#[derive(Debug, Parser)]
#[command(name = "toolwarden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the project (overrides the current directory)
    #[arg(short, long, global = true, env = "TOOLWARDEN_PROJECT")]
    pub project: Option<PathBuf>,

    /// Catalog file replacing the built-in tool catalog
    #[arg(long, global = true, env = "TOOLWARDEN_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Show captured tool output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List known tools
    List(ListArgs),

    /// Check whether a tool is usable
    Check(CheckArgs),

    /// Install a tool
    Install(InstallArgs),

    /// Run a tool
    Run(RunArgs),

    /// Show or clear a tool's action log
    Logs(LogsArgs),

    /// Set or clear a custom command for running a tool
    Override(OverrideArgs),

    /// Print the JSON schema of the catalog or settings format
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Also run detection for every tool
    #[arg(long)]
    pub status: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Tool id
    pub tool: String,
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InstallArgs {
    /// Tool id
    pub tool: String,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Tool id
    pub tool: String,

    /// Extra arguments passed to the tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `logs` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LogsArgs {
    /// Tool id
    pub tool: String,

    /// Number of entries to show (defaults to `log_tail` in settings)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Show counts instead of entries
    #[arg(long, conflicts_with = "clear")]
    pub summary: bool,

    /// Delete the log
    #[arg(long)]
    pub clear: bool,
}

/// Arguments for the `override` command.
#[derive(Debug, Clone, clap::Args)]
pub struct OverrideArgs {
    /// Tool id
    pub tool: String,

    /// Command to run instead of the catalog's run command
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "clear"
    )]
    pub command: Vec<String>,

    /// Remove the custom command
    #[arg(long, conflicts_with = "command")]
    pub clear: bool,
}

/// Which schema to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SchemaTarget {
    /// The tool catalog format
    #[default]
    Catalog,
    /// `.toolwarden/config.yml`
    Settings,
}

/// Arguments for the `schema` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SchemaArgs {
    /// Which format to describe
    #[arg(value_enum, default_value_t = SchemaTarget::Catalog)]
    pub target: SchemaTarget,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_passes_through_hyphen_args() {
        let cli = Cli::parse_from(["toolwarden", "run", "semgrep", "--", "--config", "auto", "-q"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.tool, "semgrep");
                assert_eq!(args.args, vec!["--config", "auto", "-q"]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn override_requires_command_or_clear() {
        assert!(Cli::try_parse_from(["toolwarden", "override", "greenframe"]).is_err());
        assert!(Cli::try_parse_from(["toolwarden", "override", "greenframe", "--clear"]).is_ok());
        assert!(
            Cli::try_parse_from(["toolwarden", "override", "greenframe", "npx", "greenframe"])
                .is_ok()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["toolwarden", "list", "--quiet", "--catalog", "tools.yml"]);
        assert!(cli.quiet);
        assert_eq!(cli.catalog, Some(PathBuf::from("tools.yml")));
    }

    #[test]
    fn logs_limit() {
        let cli = Cli::parse_from(["toolwarden", "logs", "greenit", "-n", "5"]);
        match cli.command {
            Commands::Logs(args) => assert_eq!(args.limit, Some(5)),
            other => panic!("expected logs, got {other:?}"),
        }
    }
}
