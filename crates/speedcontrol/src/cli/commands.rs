//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::service::{CreateRecordRequest, ExceedingSpeedRequest, MinMaxRequest};

/// Record command arguments.
#[derive(Debug, Args)]
pub struct RecordCommand {
    /// Measurement time in UTC, e.g. "15.03.2024 08:30:00"
    pub datetime: String,

    /// Vehicle number
    pub vehicle_number: String,

    /// Measured speed
    #[arg(allow_negative_numbers = true)]
    pub speed: f64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl From<&RecordCommand> for CreateRecordRequest {
    fn from(cmd: &RecordCommand) -> Self {
        Self {
            datetime: cmd.datetime.clone(),
            vehicle_number: cmd.vehicle_number.clone(),
            speed: cmd.speed,
        }
    }
}

/// Exceeding command arguments.
#[derive(Debug, Args)]
pub struct ExceedingCommand {
    /// Day to query, e.g. "15.03.2024"
    pub date: String,

    /// Speed threshold (inclusive)
    pub speed: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl From<&ExceedingCommand> for ExceedingSpeedRequest {
    fn from(cmd: &ExceedingCommand) -> Self {
        Self {
            date: cmd.date.clone(),
            speed: cmd.speed,
        }
    }
}

/// Min/max command arguments.
#[derive(Debug, Args)]
pub struct MinMaxCommand {
    /// Day to query, e.g. "15.03.2024"
    pub date: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl From<&MinMaxCommand> for MinMaxRequest {
    fn from(cmd: &MinMaxCommand) -> Self {
        Self {
            date: cmd.date.clone(),
        }
    }
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

/// Output format for query commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
