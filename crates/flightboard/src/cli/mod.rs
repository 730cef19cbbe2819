//! Command-line interface for flightboard.
//!
//! This module provides the CLI structure for the `flightboard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{BoardCommand, ConfigCommand, FollowCommand, SourceArg, TrafficCommand};

use crate::config::Config;
use crate::error::Result;
use crate::logging::Verbosity;

/// flightboard - Airport departures, arrivals and flight alerts
///
/// Shows flight boards from the flight API or from bundled data, and
/// subscribes an email address to updates for a flight.
#[derive(Debug, Parser)]
#[command(name = "flightboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured data source
    #[arg(short, long, global = true, value_enum)]
    pub source: Option<SourceArg>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the departures board
    Departures(BoardCommand),

    /// Show the arrivals board
    Arrivals(BoardCommand),

    /// Show the current traffic notice
    Traffic(TrafficCommand),

    /// Get updates about a flight by email
    Follow(FollowCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// The configuration file in effect: `--config` or the default location.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }

    /// Load the configuration file in effect and apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from(Some(self.config_path()))?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(source) = self.source {
            config.data_source = source.into();
        }
    }
}
