// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Modbus Bridge Module
//!
//! Read-only Modbus TCP access to the live tag values, for clients that do
//! not speak the node-addressing protocol. Values are served as input
//! registers; the mapping is derived from each tag's sequence index.

pub mod bridge;

pub use bridge::TagModbusServer;
