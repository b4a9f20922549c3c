use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "gcpboot")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Bootstrap a Google Cloud project for Terraform", long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Arguments for the default `apply` command
    #[command(flatten)]
    pub apply: ApplyArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or converge the project, billing, APIs, service account and state bucket (default)
    Apply(ApplyArgs),

    /// Show what apply would change, without changing anything
    Status(StatusArgs),

    /// Validate the config file and show the plan, without contacting Google Cloud
    Validate(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the configuration YAML file
    #[arg(short, long, env = "GCPBOOT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only show steps of this type, or `type.name` (e.g. `project_role.storage`)
    pub target: Option<String>,

    /// Print the diff as JSON
    #[arg(long)]
    pub json: bool,
}
