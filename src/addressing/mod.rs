// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Node Addressing
//!
//! This module turns the tag catalog into a live address space. It contains
//! the deterministic node-identifier scheme, the builder that walks the tag
//! hierarchy, and the sink abstraction behind which the actual protocol
//! server sits.
//!
//! ## Addressing modes
//!
//! Clients and server agree out of band on one of three interchangeable
//! identifier encodings, fixed for the whole process lifetime:
//!
//! * **Numeric** - integers: structural nodes at `1000 + position`, tags at
//!   `2001 + sequence_index`
//! * **Short** - the bare node name
//! * **Long** - the dot-joined path from the hierarchy root
//!
//! ## Components
//!
//! * [`NodeIdResolver`] - computes identifiers; total and collision-free for
//!   a fixed catalog
//! * [`AddressSpaceBuilder`] - creates the folder/variable tree against an
//!   [`AddressSpaceSink`], exactly once per process
//! * [`MemoryAddressSpace`] - in-process sink used by the daemon, the Modbus
//!   bridge and the test suite

pub mod builder;
pub mod memory;
pub mod resolver;
pub mod sink;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::{AddressSpaceBuilder, AddressSpaceHandle, BuildError};
pub use memory::MemoryAddressSpace;
pub use resolver::{AddressingError, NodeIdResolver, STRUCTURAL_CHAIN};
pub use sink::{AddressSpaceSink, FolderHandle, SinkError, VariableHandle};

/// Identifier encoding scheme shared by server and clients.
///
/// Switching modes at runtime is unsupported; the mode is selected once via
/// configuration and baked into every node created afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingMode {
    /// Integer identifiers from the disjoint structural/tag numeric spaces.
    Numeric,
    /// The node name itself.
    Short,
    /// Fully qualified dot-joined path.
    Long,
}

impl std::str::FromStr for AddressingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" | "int" => Ok(AddressingMode::Numeric),
            "short" => Ok(AddressingMode::Short),
            "long" => Ok(AddressingMode::Long),
            other => Err(format!(
                "unknown addressing mode '{other}' (expected numeric, short or long)"
            )),
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingMode::Numeric => write!(f, "numeric"),
            AddressingMode::Short => write!(f, "short"),
            AddressingMode::Long => write!(f, "long"),
        }
    }
}

/// Protocol-level node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Numeric-mode identifier.
    Numeric(u32),
    /// Short- or long-mode string identifier.
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Numeric(value) => write!(f, "i={value}"),
            NodeId::Text(value) => write!(f, "s={value}"),
        }
    }
}
