use std::net::SocketAddr;

use clap::{Parser, Subcommand, ValueEnum};

use crate::multivalue::MultiValue;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve a snapshot of this process's live variables over TCP
    Serve(Serve),
    /// Convert between byte counts and human readable sizes
    Size {
        #[command(subcommand)]
        action: SizeAction,
    },
    /// Print version information
    Info {
        /// Extra line appended after the version
        #[arg(long, default_value = "")]
        extra: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SizeAction {
    /// Render a byte count, e.g. 42675243822 -> 39.74GB
    Format {
        #[arg(allow_hyphen_values = true)]
        bytes: i64,
        /// Digits after the decimal point
        #[arg(long, default_value_t = 2)]
        precision: usize,
    },
    /// Parse a size such as 1.5GB or -110m into bytes
    Parse {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
}

#[derive(Parser, Clone, Debug)]
pub struct Serve {
    /// TCP listen address
    #[arg(long, default_value = "127.0.0.1:5657")]
    pub host: SocketAddr,

    /// Samples kept by each rolling aggregate (0 means the default of 100)
    #[arg(long, default_value_t = 100)]
    pub window: usize,

    /// Connection handler threads
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Pending connections queued for the handlers
    #[arg(long, default_value_t = 64)]
    pub backlog: usize,

    /// Snapshot format written to each client
    #[arg(long, value_enum, default_value_t = SnapshotFormat::Json)]
    pub format: SnapshotFormat,

    /// Comma separated tags published as the `tags` variable (repeatable)
    #[arg(long)]
    pub tags: Vec<MultiValue>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Text,
}
