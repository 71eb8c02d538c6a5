use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "playplan")]
#[command(author, version, about = "Playback plan builder for media sessions")]
pub struct Cli {
    /// Path to device config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the part chain for a session and print it
    Plan {
        /// Session file describing the server, item, and stream choice
        #[arg(required = true)]
        session: PathBuf,

        /// Seek position in milliseconds
        #[arg(long, default_value = "0")]
        seek: u64,

        /// Part the player is currently on
        #[arg(long)]
        part: Option<usize>,

        /// Force direct play for every part
        #[arg(long, conflicts_with = "force_transcode")]
        force_direct: bool,

        /// Force a transcode for every part
        #[arg(long)]
        force_transcode: bool,

        /// Forbid the transcoder from copying compatible streams
        #[arg(long)]
        no_direct_stream: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the chain and advance through every part
    Walk {
        /// Session file
        #[arg(required = true)]
        session: PathBuf,

        /// Seek position in milliseconds
        #[arg(long, default_value = "0")]
        seek: u64,
    },

    /// Resolve the timeline thumbnail URL for the active part
    Bif {
        /// Session file
        #[arg(required = true)]
        session: PathBuf,

        /// Offset into the part in milliseconds
        #[arg(long)]
        offset: u64,

        /// Seek position in milliseconds
        #[arg(long, default_value = "0")]
        seek: u64,
    },

    /// Validate device config file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
