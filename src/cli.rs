// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "Build container images, ship them to a host or registry, and restart containers")]
#[command(version)]
pub struct Cli {
    /// Project directory
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Config file, relative to the project directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI (only final result)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every configured image
    Build {
        /// Tag suffix, or a full tag for a single image
        #[arg(short, long)]
        tag: Option<String>,

        /// Build context, relative to the project directory
        #[arg(long, default_value = ".")]
        context: PathBuf,
    },

    /// Ship built images to the deploy target
    Push {
        /// Tag to push
        #[arg(conflicts_with = "tag_flag")]
        tag: Option<String>,

        /// Tag to push
        #[arg(short = 't', long = "tag", id = "tag_flag")]
        tag_flag: Option<String>,
    },

    /// Restart the configured containers on a tag
    Deploy {
        /// Tag to run
        #[arg(short, long)]
        tag: String,

        /// Break an existing deploy lock
        #[arg(long)]
        force_lock: bool,
    },

    /// Build, push and deploy in one go
    Release {
        /// Tag suffix, derived from time and revision when omitted
        #[arg(short, long)]
        tag: Option<String>,

        /// Build context, relative to the project directory
        #[arg(long, default_value = ".")]
        context: PathBuf,

        /// Break an existing deploy lock
        #[arg(long)]
        force_lock: bool,
    },

    /// Show whether the configured containers are running
    Status,

    /// List image tags
    Tags {
        /// List tags in the registry instead of locally
        #[arg(long)]
        remote: bool,
    },

    /// Initialize a new skiff.yml configuration file
    Init {
        /// Project name (also the image name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Print version information
    Version,
}

impl Commands {
    /// Push tag from either the positional argument or `--tag`.
    pub fn push_tag(tag: Option<String>, tag_flag: Option<String>) -> Option<String> {
        tag.or(tag_flag).filter(|t| !t.trim().is_empty())
    }
}
