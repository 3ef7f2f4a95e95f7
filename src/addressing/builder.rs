// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Address-space construction.
//!
//! The builder walks the tag hierarchy exactly once per process lifetime,
//! before any update shard starts: the fixed structural chain first, then one
//! folder per catalog group under GlobalVars, then one writable variable per
//! tag initialized to its type-appropriate zero. Any resolver or sink error
//! aborts the walk; a half-built address space is never served.

use std::collections::BTreeMap;

use log::{debug, info};
use thiserror::Error;

use super::resolver::{AddressingError, NodeIdResolver, STRUCTURAL_CHAIN};
use super::sink::{AddressSpaceSink, SinkError, VariableHandle};
use super::AddressingMode;
use crate::catalog::{TagCatalog, TagValue, ValueType};

/// Errors that abort address-space construction.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Addressing(#[from] AddressingError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Per-group mapping from tag name to its live variable handle and declared
/// type. This is the only state the update scheduler needs.
#[derive(Debug, Clone, Default)]
pub struct AddressSpaceHandle {
    groups: BTreeMap<String, BTreeMap<String, (VariableHandle, ValueType)>>,
}

impl AddressSpaceHandle {
    /// Look one variable up.
    pub fn variable(&self, group: &str, tag: &str) -> Option<(VariableHandle, ValueType)> {
        self.groups.get(group).and_then(|tags| tags.get(tag)).copied()
    }

    /// Iterate `(group, tag, handle, value_type)` over every variable.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, VariableHandle, ValueType)> {
        self.groups.iter().flat_map(|(group, tags)| {
            tags.iter()
                .map(move |(tag, &(handle, vt))| (group.as_str(), tag.as_str(), handle, vt))
        })
    }

    /// Group names present in the handle map.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of variables.
    pub fn variable_count(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }
}

/// Walks the catalog hierarchy against an [`AddressSpaceSink`].
pub struct AddressSpaceBuilder<'a> {
    catalog: &'a TagCatalog,
    mode: AddressingMode,
    long_base_path: Option<String>,
}

impl<'a> AddressSpaceBuilder<'a> {
    pub fn new(catalog: &'a TagCatalog, mode: AddressingMode) -> Self {
        Self {
            catalog,
            mode,
            long_base_path: None,
        }
    }

    /// Prefix long-mode group/tag identifiers with the given path instead of
    /// starting them at the group name. Passing the full structural chain
    /// path reproduces identifiers like
    /// `DeviceSet.….GlobalVars.Inputs.TC1001PumpTempSensorAI_ENG`.
    pub fn with_long_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.long_base_path = Some(base_path.into());
        self
    }

    /// Create every structural and variable node and return the handle map.
    ///
    /// An identifier collision ([`SinkError::DuplicateNode`]) signals a
    /// catalog authoring bug: the error is returned as-is and the build is
    /// never retried.
    pub fn build(&self, sink: &dyn AddressSpaceSink) -> Result<AddressSpaceHandle, BuildError> {
        let resolver = NodeIdResolver::new(self.catalog);

        // Fixed container chain, root first. Long-mode identifiers of the
        // chain accumulate along it.
        let root_name = STRUCTURAL_CHAIN[0];
        let root_id = resolver.resolve(root_name, self.mode, "")?;
        let mut parent = sink.create_folder(root_id, root_name, None)?;
        let mut chain_path = root_name.to_string();

        for name in &STRUCTURAL_CHAIN[1..] {
            let id = resolver.resolve(name, self.mode, &chain_path)?;
            parent = sink.create_folder(id, name, Some(parent))?;
            chain_path.push('.');
            chain_path.push_str(name);
        }
        let globals = parent;

        let group_base = self.long_base_path.clone().unwrap_or_default();
        let mut groups = BTreeMap::new();

        for group in self.catalog.groups() {
            let group_id = resolver.resolve(group, self.mode, &group_base)?;
            let folder = sink.create_folder(group_id, group, Some(globals))?;

            let tag_parent_path = if group_base.is_empty() {
                group.clone()
            } else {
                format!("{group_base}.{group}")
            };

            let mut variables = BTreeMap::new();
            for tag in self.catalog.tags_in_group(group) {
                let id = resolver.resolve(&tag.name, self.mode, &tag_parent_path)?;
                debug!("Creating variable '{}' as {}", tag.name, id);
                let handle = sink.create_variable(
                    id,
                    &tag.name,
                    TagValue::zero(tag.value_type),
                    folder,
                )?;
                sink.set_writable(handle)?;
                variables.insert(tag.name.clone(), (handle, tag.value_type));
            }
            groups.insert(group.clone(), variables);
        }

        let handle = AddressSpaceHandle { groups };
        info!(
            "Address space built: {} groups, {} variables ({} addressing)",
            self.catalog.groups().len(),
            handle.variable_count(),
            self.mode
        );
        Ok(handle)
    }
}
