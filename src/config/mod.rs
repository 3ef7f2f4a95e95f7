// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the tag server
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings for the simulator. The configuration is backed by
//! a YAML file and validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! The configuration is organized as a nested structure with sections:
//! - `address_space`: Node addressing mode and server identity
//! - `simulation`: Update cadence, perturbation and sharding
//! - `modbus`: Settings for the Modbus TCP bridge
//!
//! ## Usage
//!
//! ```no_run
//! use rust_tagsim::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     None,        // Addressing mode
//!     Some(0.5),   // Change rate in seconds
//!     Some(2.0),   // Perturbation step
//!     Some(true),  // Persist base values
//!     Some(8),     // Shard count
//!     Some(true),  // Enable Modbus bridge
//!     None,        // Modbus address
//!     Some(1502),  // Modbus port
//! );
//!
//! println!("Tick every {}s", config.simulation.change_rate);
//! ```

pub mod address_space;
pub mod modbus;
pub mod simulation;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use address_space::AddressSpaceConfig;
pub use modbus::ModbusConfig;
pub use simulation::SimulationConfig;
pub use utils::{is_valid_ip_address, output_config_schema};

use crate::addressing::AddressingMode;

/// Root configuration structure for the tag server.
///
/// The configuration is designed to be deserialized from and serialized to
/// YAML using the serde framework. The structure is validated against a JSON
/// schema before deserialization, so schema violations surface with the
/// offending path instead of a serde type error.
///
/// Each section falls back to its defaults when not present in the file, so
/// an empty configuration file is a valid one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Node addressing mode and server identity.
    #[serde(default)]
    pub address_space: AddressSpaceConfig,

    /// Update cadence, perturbation magnitude and shard count.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Modbus TCP bridge settings.
    #[serde(default)]
    pub modbus: ModbusConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Creating sample configuration file at {:?}", path);
        let sample_path = path.with_extension("sample.yaml");

        // Create parent directories if they don't exist
        if let Some(parent) = sample_path.parent() {
            if !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                std::fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        let sample_config = Self::default();
        sample_config
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is not an error: the default configuration is written
    /// to the given path and returned. An invalid file is an error, and a
    /// `*.sample.yaml` with defaults is written next to it for reference.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        // Load and validate with the schema
        let schema_str = include_str!("../../resources/config.schema.json");
        let schema: serde_json::Value =
            serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

        // Create the validator
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        // Validate before deserializing to Config
        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            // We generate a config.sample.yaml file with the default values
            // for the user to edit
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        // Now that YAML has been validated, deserialize to Config
        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                match Self::create_sample_config(path) {
                    Ok(_) => debug!("Successfully created sample config"),
                    Err(e) => error!("Failed to create sample config: {}", e),
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        // Perform additional specific validations
        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the existing
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `addressing_mode` - Node identifier encoding
    /// * `change_rate` - Seconds between update ticks
    /// * `step` - Perturbation magnitude
    /// * `persist_base` - Random-walk mode flag
    /// * `shard_count` - Number of update shards
    /// * `modbus_enabled` - Optional flag to enable/disable the Modbus bridge
    /// * `modbus_address` - Optional bind address for the Modbus bridge
    /// * `modbus_port` - Optional TCP port for the Modbus bridge
    #[allow(clippy::too_many_arguments)]
    pub fn apply_args(
        &mut self,
        addressing_mode: Option<AddressingMode>,
        change_rate: Option<f64>,
        step: Option<f64>,
        persist_base: Option<bool>,
        shard_count: Option<usize>,
        modbus_enabled: Option<bool>,
        modbus_address: Option<String>,
        modbus_port: Option<u16>,
    ) {
        // Only override if command-line arguments are provided
        if let Some(mode) = addressing_mode {
            debug!("Overriding addressing mode from command line: {}", mode);
            self.address_space.addressing_mode = mode;
        }

        if let Some(change_rate) = change_rate {
            debug!("Overriding change rate from command line: {}", change_rate);
            self.simulation.change_rate = change_rate;
        }

        if let Some(step) = step {
            debug!("Overriding step from command line: {}", step);
            self.simulation.step = Some(step);
        }

        if let Some(persist_base) = persist_base {
            debug!("Overriding persist_base from command line: {}", persist_base);
            self.simulation.persist_base = persist_base;
        }

        if let Some(shard_count) = shard_count {
            debug!("Overriding shard count from command line: {}", shard_count);
            self.simulation.shard_count = shard_count;
        }

        // Apply Modbus settings
        if let Some(enabled) = modbus_enabled {
            debug!("Overriding Modbus enabled from command line: {}", enabled);
            self.modbus.enabled = enabled;
        }
        if let Some(address) = modbus_address {
            debug!("Overriding Modbus address from command line: {}", address);
            self.modbus.address = address;
        }
        if let Some(port) = modbus_port {
            debug!("Overriding Modbus port from command line: {}", port);
            self.modbus.port = port;
        }
    }
}
