//! Command-line interface for speedcontrol.
//!
//! This module provides the CLI structure for the `speedctl` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ExceedingCommand, MinMaxCommand, OutputFormat, RecordCommand};

/// speedctl - Record vehicle speed measurements
///
/// Stores measurements in one file per day and answers which vehicles were
/// at or above a speed, and what the slowest and fastest measurements were.
#[derive(Debug, Parser)]
#[command(name = "speedctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

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
    /// Save a speed measurement
    Record(RecordCommand),

    /// List vehicles at or above a speed on a day
    Exceeding(ExceedingCommand),

    /// Show the slowest and fastest measurement of a day
    Minmax(MinMaxCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// The file `config validate` should check, or `None` for any other
    /// command.
    ///
    /// `--file` wins over the global `--config`, which wins over the default
    /// path. Validation must run before the configuration is loaded, since a
    /// broken file is exactly what it reports on.
    #[must_use]
    pub fn validate_path(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Config(ConfigCommand::Validate { file }) => Some(
                file.clone()
                    .or_else(|| self.config.clone())
                    .unwrap_or_else(crate::config::Config::default_config_path),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "speedctl");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["speedctl", "-q", "config", "path"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["speedctl", "config", "path"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["speedctl", "-v", "config", "path"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["speedctl", "-vv", "config", "path"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_validate_path() {
        let cli = parse(&["speedctl", "-c", "broken.toml", "config", "validate"]);
        assert_eq!(cli.validate_path(), Some(PathBuf::from("broken.toml")));

        let cli = parse(&["speedctl", "-c", "a.toml", "config", "validate", "-f", "b.toml"]);
        assert_eq!(cli.validate_path(), Some(PathBuf::from("b.toml")));

        let cli = parse(&["speedctl", "config", "validate"]);
        assert_eq!(
            cli.validate_path(),
            Some(crate::config::Config::default_config_path())
        );

        assert_eq!(parse(&["speedctl", "config", "show"]).validate_path(), None);
        assert_eq!(parse(&["speedctl", "minmax", "15.03.2024"]).validate_path(), None);
    }

    #[test]
    fn test_parse_record() {
        let cli = parse(&["speedctl", "record", "15.03.2024 08:30:00", "AB123CD", "85.5"]);
        let Command::Record(cmd) = cli.command else {
            panic!("expected record command");
        };
        assert_eq!(cmd.datetime, "15.03.2024 08:30:00");
        assert_eq!(cmd.vehicle_number, "AB123CD");
        assert!((cmd.speed - 85.5).abs() < f64::EPSILON);
        assert!(!cmd.json);
    }

    #[test]
    fn test_parse_record_negative_speed() {
        // Reaches record validation instead of being taken for a flag
        let cli = parse(&["speedctl", "record", "15.03.2024 08:30:00", "AB123CD", "-1"]);
        assert!(matches!(cli.command, Command::Record(cmd) if cmd.speed < 0.0));
    }

    #[test]
    fn test_parse_exceeding() {
        let cli = parse(&["speedctl", "exceeding", "15.03.2024", "100", "-f", "json"]);
        let Command::Exceeding(cmd) = cli.command else {
            panic!("expected exceeding command");
        };
        assert_eq!(cmd.date, "15.03.2024");
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_minmax_default_format() {
        let cli = parse(&["speedctl", "minmax", "15.03.2024"]);
        let Command::Minmax(cmd) = cli.command else {
            panic!("expected minmax command");
        };
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["speedctl", "-c", "/custom/config.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Show { .. })));
    }

    #[test]
    fn test_parse_rejects_non_numeric_speed() {
        let result = Cli::try_parse_from(["speedctl", "exceeding", "15.03.2024", "fast"]);
        assert!(result.is_err());
    }
}
