use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::session::DEFAULT_TIMEOUT;

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(name = "kt", version, about = "Post to a ktistec server from the command line")]
pub struct Cli {
    /// Print the full error chain and enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path of the profile file (defaults to ~/.kt/profile)
    #[arg(long, global = true, env = "KT_PROFILE_FILE")]
    pub profile_file: Option<PathBuf>,

    /// Connect and request timeout in seconds
    #[arg(long, global = true, env = "KT_TIMEOUT", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Subcommand chosen to execute
    #[command(subcommand)]
    pub command: Commands,
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Posts a message, opening $EDITOR when no message is given
    Post(PostArgs),
    /// Manages server profiles
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Message body
    pub message: Option<String>,
    /// Link appended below the message, may be repeated
    #[arg(short, long = "link")]
    pub links: Vec<String>,
    /// Profile to post as instead of the default one
    #[arg(short, long)]
    pub profile: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Adds or updates a profile interactively
    Add,
    /// Removes a profile
    Remove {
        /// Name of the profile to remove
        #[arg(long)]
        name: String,
    },
    /// Lists all profiles
    List,
    /// Marks a profile as the default one
    SetDefault {
        /// Name of the profile to mark
        #[arg(long)]
        name: String,
    },
}
