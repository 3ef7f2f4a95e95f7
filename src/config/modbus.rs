// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP bridge configuration
//!
//! The bridge gives plain Modbus clients read access to the live tag values
//! without speaking the node-addressing protocol.

use serde::{Deserialize, Serialize};

/// Configuration for the read-only Modbus TCP bridge.
///
/// # Fields
///
/// * `enabled` - Flag to enable or disable the bridge
/// * `port` - TCP port to listen on (default: 502)
/// * `address` - Network address to bind to (default: 127.0.0.1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusConfig {
    /// When enabled, tag values are served as Modbus input registers.
    /// When disabled, no listener is started and no resources are used.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// The TCP port the bridge listens on.
    ///
    /// Valid range is 1-65534. Default is 502, the standard Modbus TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the bridge binds to.
    ///
    /// Default is "127.0.0.1". Use "0.0.0.0" to bind to all IPv4 interfaces.
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_enabled() -> bool {
    false
}

fn default_port() -> u16 {
    502
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            port: default_port(),
            address: default_address(),
        }
    }
}
