// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the simulated tag server
use anyhow::Result;
use clap::Parser;
use log::info;

use std::path::PathBuf;
use tokio::signal;

use rust_tagsim::addressing::AddressingMode;
use rust_tagsim::config::{self, Config};
use rust_tagsim::daemon::launch_daemon::Daemon;

/// Simulated industrial process tag server
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Node identifier mode: numeric / short / long
    #[arg(long)]
    addressing_mode: Option<AddressingMode>,

    /// Seconds between value updates
    #[arg(long)]
    change_rate: Option<f64>,

    /// Perturbation magnitude around each tag's base value
    #[arg(long)]
    value_change: Option<f64>,

    /// Persist generated values as the new base (random walk)
    #[arg(long)]
    update_base: bool,

    /// Number of parallel update shards
    #[arg(long)]
    num_workers: Option<usize>,

    /// Start in server mode
    #[arg(long, default_value_t = true)]
    server: bool,

    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Modbus bridge enabled
    #[arg(long)]
    modbus_enabled: Option<bool>,

    /// Modbus bridge address
    #[arg(long)]
    modbus_address: Option<String>,

    /// Modbus bridge port
    #[arg(long)]
    modbus_port: Option<u16>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger with appropriate level based on verbose and quiet flags
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    // Check if --show-config-schema flag is set
    if args.show_config_schema {
        return config::output_config_schema();
    }

    // Validate configuration file if --validate-config is set
    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }

        let _config = Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;

    // Apply command line overrides
    config.apply_args(
        args.addressing_mode,
        args.change_rate,
        args.value_change,
        args.update_base.then_some(true),
        args.num_workers,
        args.modbus_enabled,
        args.modbus_address.clone(),
        args.modbus_port,
    );

    if args.server {
        info!("Starting in daemon mode");
        let mut daemon = Daemon::new();

        // Launch all configured tasks
        daemon.launch(&config).await?;

        // Wait for termination signal
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, terminating daemon");
                daemon.shutdown();
                daemon.join().await?;
            }
            Err(err) => {
                eprintln!("Error waiting for shutdown signal: {}", err);
            }
        }

        return Ok(());
    }

    println!("Server disabled");
    Ok(())
}
