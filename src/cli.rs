//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::config::BuildMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stamp multi-page HTML templating CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: stamp.toml)
    #[arg(short = 'C', long, default_value = "stamp.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Transform all HTML entry points and write them to the output directory
    Build {
        /// Build mode controlling the asset-base rewrite
        #[arg(short, long, value_enum)]
        mode: Option<BuildMode>,
    },

    /// Copy the shared entry template over every configured entry point
    Sync,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_sync(&self) -> bool {
        matches!(self.command, Commands::Sync)
    }
}
