//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// npf-adinfo: packet-capture adapter inventory
///
/// Discovers capture adapters from the device class store and the network
/// stack, and prints what the capture driver reports about each of them.
#[derive(Debug, Parser)]
#[command(name = "npf-adinfo")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run (default: list)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print adapters as JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Regex pattern for adapters to include (can be specified multiple times)
    #[arg(long = "include-adapter", value_name = "PATTERN", global = true)]
    pub include_adapters: Vec<String>,

    /// Regex pattern for adapters to exclude (can be specified multiple times)
    #[arg(long = "exclude-adapter", value_name = "PATTERN", global = true)]
    pub exclude_adapters: Vec<String>,

    /// Also list adapters recorded as not exported (e.g. firewire)
    #[arg(long = "show-hidden", global = true)]
    pub show_hidden: bool,

    /// Skip the network-stack scan
    #[arg(long = "no-secondary", global = true)]
    pub no_secondary: bool,

    /// Transport namespace prefixed to raw interface ids
    #[arg(long = "device-prefix", value_name = "PREFIX", global = true)]
    pub device_prefix: Option<String>,
}

/// Subcommands for npf-adinfo
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List every discovered adapter
    List,

    /// Show a single adapter by its full name
    Show {
        /// Adapter name, e.g. \Device\NPF_{...}
        name: String,
    },

    /// Re-scan a single adapter, then show it
    Update {
        /// Adapter name, e.g. \Device\NPF_{...}
        name: String,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "npf-adinfo.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns the subcommand to run, defaulting to [`Command::List`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::List)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
