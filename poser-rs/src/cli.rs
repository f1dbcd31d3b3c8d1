//! Root CLI structure for poser-rs

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "poser-rs")]
#[command(about = "Command-line tools for avatar poses", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Animator configuration file (JSON)
    #[arg(long, global = true, env = "POSER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Joint catalog operations
    Joints {
        #[command(subcommand)]
        command: crate::commands::joints::JointCommands,
    },

    /// Pose document operations
    Pose {
        #[command(subcommand)]
        command: crate::commands::pose::PoseCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
