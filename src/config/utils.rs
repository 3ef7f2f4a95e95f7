// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! Validation helpers that go beyond what the JSON schema can express, plus
//! schema output support for the `--show-config-schema` flag.

use anyhow::{Context, Result};
use log::debug;

use super::Config;

/// Output the embedded JSON schema to the console.
///
/// Called when the `--show-config-schema` flag is provided on the command
/// line; prints the full configuration schema to stdout, formatted for
/// readability.
///
/// ### Example
///
/// ```bash
/// ./rust_tagsim --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema_str = include_str!("../../resources/config.schema.json");

    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// ### Validation Rules
///
/// * `simulation.change_rate` must be strictly positive
/// * `simulation.step`, when present, must not be negative
/// * `simulation.shard_count` must be at least 1
/// * `modbus.port` must be within 1-65534
/// * `modbus.address` should look like an IP address (warning only)
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.simulation.change_rate <= 0.0 {
        anyhow::bail!(
            "Invalid change_rate {}: must be greater than zero seconds",
            config.simulation.change_rate
        );
    }

    if let Some(step) = config.simulation.step {
        if step < 0.0 {
            anyhow::bail!("Invalid step {}: must not be negative", step);
        }
    }

    if config.simulation.shard_count < 1 {
        anyhow::bail!("Invalid shard_count: at least one shard is required");
    }

    if config.modbus.port < 1 || config.modbus.port > 65534 {
        anyhow::bail!("Invalid Modbus port number: {}", config.modbus.port);
    }

    if !is_valid_ip_address(&config.modbus.address) {
        debug!(
            "Potentially invalid Modbus address format: {}",
            config.modbus.address
        );
        // Just issue a warning but don't block
    }

    Ok(())
}
