// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Deterministic node-identifier resolution.
//!
//! For a fixed catalog the resolver is a pure function: the same
//! `(name, mode, parent_path)` input always yields the same identifier, and
//! in numeric mode the mapping over structural names and tag names is a total
//! bijection into two disjoint integer ranges.

use std::collections::HashMap;

use thiserror::Error;

use super::{AddressingMode, NodeId};
use crate::catalog::TagCatalog;

/// Fixed top-level container chain, root first.
///
/// These containers mirror the PLC runtime layout the simulated device
/// presents: DeviceSet → device → Resources → Application → GlobalVars.
/// Group folders are created beneath the last entry.
pub const STRUCTURAL_CHAIN: [&str; 5] = [
    "DeviceSet",
    "WAGO 750-8210 PFC200 G2 4ETH XTR",
    "Resources",
    "Application",
    "GlobalVars",
];

/// Base of the numeric identifier range for structural (folder) nodes.
const STRUCTURAL_ID_BASE: u32 = 1000;

/// Base of the numeric identifier range for tag variables.
const VARIABLE_ID_BASE: u32 = 2001;

/// Structural-list size at which tag identifiers are shifted past the
/// structural range. Keeps the two numeric spaces disjoint even if the
/// structural list were ever to grow into the 2001+ range.
const STRUCTURAL_OVERFLOW_GUARD: usize = 2000;

/// Errors raised during identifier resolution.
#[derive(Error, Debug)]
pub enum AddressingError {
    #[error("name '{0}' is missing from both the structural list and the tag catalog")]
    UnknownName(String),
}

/// Computes protocol node identifiers for structural nodes and tags.
///
/// The structural list is enumerated once at construction: the fixed
/// container chain followed by the catalog's groups in first-appearance
/// order. It never changes at runtime.
#[derive(Debug)]
pub struct NodeIdResolver {
    structural: Vec<String>,
    structural_pos: HashMap<String, u32>,
    tag_index: HashMap<String, u32>,
}

impl NodeIdResolver {
    /// Build a resolver for the given catalog.
    pub fn new(catalog: &TagCatalog) -> Self {
        let structural: Vec<String> = STRUCTURAL_CHAIN
            .iter()
            .map(|name| name.to_string())
            .chain(catalog.groups().iter().cloned())
            .collect();

        let structural_pos = structural
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos as u32))
            .collect();

        let tag_index = catalog
            .iter()
            .map(|tag| (tag.name.clone(), tag.sequence_index))
            .collect();

        Self {
            structural,
            structural_pos,
            tag_index,
        }
    }

    /// The full structural list (container chain plus group folders).
    pub fn structural_names(&self) -> &[String] {
        &self.structural
    }

    /// Resolve `name` to its node identifier under the given mode.
    ///
    /// `parent_path` is only consulted in long mode, where the identifier is
    /// `parent_path + "." + name` (or just `name` when the parent path is
    /// empty). Short and long mode accept any name; numeric mode requires
    /// the name to be a known structural node or catalog tag and fails with
    /// [`AddressingError::UnknownName`] otherwise.
    pub fn resolve(
        &self,
        name: &str,
        mode: AddressingMode,
        parent_path: &str,
    ) -> Result<NodeId, AddressingError> {
        match mode {
            AddressingMode::Short => Ok(NodeId::Text(name.to_string())),
            AddressingMode::Long => {
                if parent_path.is_empty() {
                    Ok(NodeId::Text(name.to_string()))
                } else {
                    Ok(NodeId::Text(format!("{parent_path}.{name}")))
                }
            }
            AddressingMode::Numeric => self.resolve_numeric(name),
        }
    }

    fn resolve_numeric(&self, name: &str) -> Result<NodeId, AddressingError> {
        if let Some(&pos) = self.structural_pos.get(name) {
            return Ok(NodeId::Numeric(STRUCTURAL_ID_BASE + pos));
        }
        if let Some(&sequence_index) = self.tag_index.get(name) {
            let mut id = VARIABLE_ID_BASE + sequence_index;
            if self.structural.len() >= STRUCTURAL_OVERFLOW_GUARD {
                id += self.structural.len() as u32;
            }
            return Ok(NodeId::Numeric(id));
        }
        Err(AddressingError::UnknownName(name.to_string()))
    }
}
