//! `speedctl` - CLI for speedcontrol
//!
//! This binary records speed measurements and queries them by day.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;

use speedcontrol::cli::{
    Cli, Command, ConfigCommand, ExceedingCommand, MinMaxCommand, OutputFormat, RecordCommand,
};
use speedcontrol::{init_logging, Config, FileStore, RecordView, SpeedControl};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Validation reports a broken config instead of failing on it
    if let Some(path) = cli.validate_path() {
        return handle_validate(&path);
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Record(cmd) => handle_record(&open_service(&config)?, &cmd),
        Command::Exceeding(cmd) => handle_exceeding(&open_service(&config)?, &cmd),
        Command::Minmax(cmd) => handle_minmax(&open_service(&config)?, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_service(config: &Config) -> anyhow::Result<SpeedControl<FileStore>> {
    let data_dir = config.data_dir();
    let store = FileStore::open(&data_dir)
        .with_context(|| format!("opening record store at {}", data_dir.display()))?
        .with_extension(config.store.file_extension.clone());
    Ok(SpeedControl::new(store, config.availability_window()?))
}

fn handle_record(service: &SpeedControl<FileStore>, cmd: &RecordCommand) -> anyhow::Result<()> {
    let id = service.create_record(&cmd.into())?;
    if cmd.json {
        println!("{}", serde_json::json!({ "recordId": id }));
    } else {
        println!("{id}");
    }
    Ok(())
}

fn handle_exceeding(
    service: &SpeedControl<FileStore>,
    cmd: &ExceedingCommand,
) -> anyhow::Result<()> {
    let views = service.exceeding_speed(&cmd.into())?;
    print_views(&views, cmd.format)
}

fn handle_minmax(service: &SpeedControl<FileStore>, cmd: &MinMaxCommand) -> anyhow::Result<()> {
    let views = service.min_max_speed(&cmd.into())?;
    print_views(&views, cmd.format)
}

fn print_views(views: &[RecordView], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(views)?),
        OutputFormat::Plain => {
            for view in views {
                println!("{} {} {}", view.datetime, view.vehicle_number, view.speed);
            }
        }
        OutputFormat::Table => {
            if views.is_empty() {
                println!("No matching records.");
                return Ok(());
            }
            let width = views
                .iter()
                .map(|view| view.vehicle_number.len())
                .max()
                .unwrap_or(0)
                .max("VEHICLE".len());
            println!("{:<19}  {:<width$}  SPEED", "DATETIME", "VEHICLE");
            for view in views {
                println!(
                    "{:<19}  {:<width$}  {}",
                    view.datetime, view.vehicle_number, view.speed
                );
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!("  File extension:     {}", config.store.file_extension);
                println!();
                println!("[Service]");
                println!("  Available from:     {}", config.service.time_start);
                println!("  Available until:    {}", config.service.time_end);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            return handle_validate(&file.unwrap_or_else(Config::default_config_path));
        }
    }
    Ok(())
}

fn handle_validate(path: &Path) -> anyhow::Result<()> {
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path.to_path_buf())) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
    Ok(())
}
