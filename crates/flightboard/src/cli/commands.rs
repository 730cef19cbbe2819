//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};

use crate::config::{Config, DataSource};
use crate::error::Result;

/// Arguments shared by the departures and arrivals boards.
#[derive(Debug, Args)]
pub struct BoardCommand {
    /// Output the response envelope as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Don't fetch or show the traffic banner
    #[arg(long)]
    pub no_traffic: bool,
}

/// Traffic command arguments.
#[derive(Debug, Args)]
pub struct TrafficCommand {
    /// Output the response envelope as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Follow command arguments.
#[derive(Debug, Args)]
pub struct FollowCommand {
    /// Flight number to follow, e.g. AF101
    pub flight_number: String,

    /// Email address that receives updates
    pub email: String,

    /// Output the response envelope as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl ConfigCommand {
    /// Run the command and return what it prints.
    ///
    /// Only `show` calls `load`; `path` and `validate` work even when the
    /// active configuration is broken.
    ///
    /// # Errors
    ///
    /// Returns the error from `load` for `show`, or a serialization error.
    pub fn run(
        &self,
        load: impl FnOnce() -> Result<Config>,
        default_path: &Path,
    ) -> Result<String> {
        let mut out = String::new();
        match self {
            Self::Show { json } => {
                let config = load()?;
                if *json {
                    let _ = writeln!(out, "{}", serde_json::to_string_pretty(&config)?);
                } else {
                    write_config_summary(&mut out, &config);
                }
            }
            Self::Path => {
                let _ = writeln!(out, "{}", default_path.display());
            }
            Self::Validate { file } => {
                let path = file.as_deref().unwrap_or(default_path);
                let _ = writeln!(out, "Validating configuration: {}", path.display());
                match Config::load_file(path) {
                    Ok(_) => out.push_str("Configuration is valid.\n"),
                    Err(e) => {
                        let _ = writeln!(out, "Configuration error: {e}");
                    }
                }
            }
        }
        Ok(out)
    }
}

fn write_config_summary(out: &mut String, config: &Config) {
    let _ = writeln!(out, "Current Configuration");
    let _ = writeln!(out, "=====================");
    let _ = writeln!(out);
    let _ = writeln!(out, "  Data source:        {}", config.data_source);
    let _ = writeln!(out, "  Simulated delay:    {} ms", config.simulated_delay_ms);
    let _ = writeln!(out, "  Debug:              {}", config.debug);
    let _ = writeln!(out);
    let _ = writeln!(out, "[API]");
    let _ = writeln!(out, "  Departures:         {}", config.api.departures);
    let _ = writeln!(out, "  Arrivals:           {}", config.api.arrivals);
    let _ = writeln!(out, "  Traffic status:     {}", config.api.traffic_status);
    let _ = writeln!(
        out,
        "  Follow:             {}",
        config.api.follow.as_deref().unwrap_or("(simulated)")
    );
    let _ = writeln!(out, "  Timeout:            {} ms", config.api.timeout_ms);
}

/// Data source override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Bundled static data
    Json,
    /// Remote flight API
    Api,
}

impl From<SourceArg> for DataSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Json => Self::Json,
            SourceArg::Api => Self::Api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn broken_config() -> Result<Config> {
        Err(Error::config_validation(
            "api.timeout_ms must be greater than 0",
        ))
    }

    #[test]
    fn test_config_path_does_not_load() {
        let out = ConfigCommand::Path
            .run(broken_config, Path::new("/home/jo/.config/flightboard/config.toml"))
            .unwrap();
        assert_eq!(out, "/home/jo/.config/flightboard/config.toml\n");
    }

    #[test]
    fn test_config_show_reports_load_error() {
        let err = ConfigCommand::Show { json: false }
            .run(broken_config, Path::new("unused.toml"))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_config_show_summary() {
        let out = ConfigCommand::Show { json: false }
            .run(|| Ok(Config::default()), Path::new("unused.toml"))
            .unwrap();
        assert!(out.starts_with("Current Configuration"));
        assert!(out.contains("(simulated)"));
        assert!(out.contains("5000 ms"));
    }

    #[test]
    fn test_config_validate_missing_default_reports_error() {
        let out = ConfigCommand::Validate { file: None }
            .run(broken_config, Path::new("/nonexistent/flightboard.toml"))
            .unwrap();
        assert!(out.contains("Validating configuration: /nonexistent/flightboard.toml"));
        assert!(out.contains("Configuration error: failed to read"));
    }

    #[test]
    fn test_source_arg_conversion() {
        assert_eq!(DataSource::from(SourceArg::Json), DataSource::Json);
        assert_eq!(DataSource::from(SourceArg::Api), DataSource::Api);
    }

    #[test]
    fn test_follow_command_debug() {
        let cmd = FollowCommand {
            flight_number: "AF101".to_string(),
            email: "jo@example.com".to_string(),
            json: false,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("AF101"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
