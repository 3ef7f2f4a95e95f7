// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Address-space configuration
//!
//! Settings that fix how node identifiers are computed for the whole process
//! lifetime. Clients must be configured with the same addressing mode out of
//! band; there is no runtime negotiation.

use serde::{Deserialize, Serialize};

use crate::addressing::AddressingMode;

/// Configuration for address-space construction.
///
/// # Fields
///
/// * `server_name` - Display name the server announces
/// * `addressing_mode` - Node identifier encoding: `numeric`, `short` or `long`
/// * `long_base_path` - Optional path prefix for long-mode group/tag
///   identifiers (e.g. the full device chain); empty prefix by default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSpaceConfig {
    /// Display name the server announces.
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Identifier encoding used for every node. Fixed for the process
    /// lifetime; clients and server must agree on it out of band.
    #[serde(default = "default_addressing_mode")]
    pub addressing_mode: AddressingMode,

    /// Optional prefix for long-mode group and tag identifiers. When unset,
    /// long identifiers start at the group name (`Inputs.TC1001…`); set it
    /// to the device chain path to serve fully qualified identifiers.
    #[serde(default)]
    pub long_base_path: Option<String>,
}

fn default_server_name() -> String {
    "Tag Server".to_string()
}

fn default_addressing_mode() -> AddressingMode {
    AddressingMode::Short
}

impl Default for AddressSpaceConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            addressing_mode: default_addressing_mode(),
            long_base_path: None,
        }
    }
}
