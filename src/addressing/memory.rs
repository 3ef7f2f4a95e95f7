// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! In-process address space.
//!
//! Backs the daemon, the Modbus bridge and the test suite with a slab of
//! nodes behind a single `RwLock`. Identifier uniqueness is enforced here:
//! creating two nodes with the same [`NodeId`] fails with
//! [`SinkError::DuplicateNode`] regardless of node kind.

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::sink::{AddressSpaceSink, FolderHandle, SinkError, VariableHandle};
use super::NodeId;
use crate::catalog::{TagValue, ValueType};

#[derive(Debug)]
struct FolderNode {
    id: NodeId,
    name: String,
    #[allow(dead_code)]
    parent: Option<usize>,
}

#[derive(Debug)]
struct VariableNode {
    id: NodeId,
    name: String,
    #[allow(dead_code)]
    parent: usize,
    value: TagValue,
    value_type: ValueType,
    writable: bool,
    updated_at: Option<DateTime<Utc>>,
    write_count: u64,
}

#[derive(Debug, Default)]
struct Inner {
    folders: Vec<FolderNode>,
    variables: Vec<VariableNode>,
    ids: HashSet<NodeId>,
    started: bool,
}

/// Thread-safe in-memory address space.
#[derive(Debug, Default)]
pub struct MemoryAddressSpace {
    inner: RwLock<Inner>,
}

impl MemoryAddressSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a variable's current value.
    pub fn read(&self, handle: VariableHandle) -> Result<TagValue, SinkError> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .get(handle.0)
            .map(|node| node.value.clone())
            .ok_or(SinkError::InvalidHandle)
    }

    /// The declared type of a variable.
    pub fn value_type(&self, handle: VariableHandle) -> Result<ValueType, SinkError> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .get(handle.0)
            .map(|node| node.value_type)
            .ok_or(SinkError::InvalidHandle)
    }

    /// How many times the variable has been written since creation.
    pub fn write_count(&self, handle: VariableHandle) -> Result<u64, SinkError> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .get(handle.0)
            .map(|node| node.write_count)
            .ok_or(SinkError::InvalidHandle)
    }

    /// Timestamp of the last write, if any.
    pub fn updated_at(&self, handle: VariableHandle) -> Result<Option<DateTime<Utc>>, SinkError> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .get(handle.0)
            .map(|node| node.updated_at)
            .ok_or(SinkError::InvalidHandle)
    }

    /// True if the variable was marked client-writable.
    pub fn is_writable(&self, handle: VariableHandle) -> Result<bool, SinkError> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .get(handle.0)
            .map(|node| node.writable)
            .ok_or(SinkError::InvalidHandle)
    }

    /// The node identifier a variable was created with.
    pub fn node_id(&self, handle: VariableHandle) -> Result<NodeId, SinkError> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .get(handle.0)
            .map(|node| node.id.clone())
            .ok_or(SinkError::InvalidHandle)
    }

    /// Find a variable by its node identifier.
    pub fn find_variable(&self, id: &NodeId) -> Option<VariableHandle> {
        let inner = self.inner.read().expect("address space lock poisoned");
        inner
            .variables
            .iter()
            .position(|node| &node.id == id)
            .map(VariableHandle)
    }

    pub fn folder_count(&self) -> usize {
        self.inner
            .read()
            .expect("address space lock poisoned")
            .folders
            .len()
    }

    pub fn variable_count(&self) -> usize {
        self.inner
            .read()
            .expect("address space lock poisoned")
            .variables
            .len()
    }
}

impl AddressSpaceSink for MemoryAddressSpace {
    fn create_folder(
        &self,
        id: NodeId,
        name: &str,
        parent: Option<FolderHandle>,
    ) -> Result<FolderHandle, SinkError> {
        let mut inner = self.inner.write().expect("address space lock poisoned");
        if !inner.ids.insert(id.clone()) {
            return Err(SinkError::DuplicateNode(id));
        }
        if let Some(parent) = parent {
            if parent.0 >= inner.folders.len() {
                return Err(SinkError::InvalidHandle);
            }
        }
        inner.folders.push(FolderNode {
            id,
            name: name.to_string(),
            parent: parent.map(|p| p.0),
        });
        Ok(FolderHandle(inner.folders.len() - 1))
    }

    fn create_variable(
        &self,
        id: NodeId,
        name: &str,
        initial: TagValue,
        parent: FolderHandle,
    ) -> Result<VariableHandle, SinkError> {
        let mut inner = self.inner.write().expect("address space lock poisoned");
        if !inner.ids.insert(id.clone()) {
            return Err(SinkError::DuplicateNode(id));
        }
        if parent.0 >= inner.folders.len() {
            return Err(SinkError::InvalidHandle);
        }
        let value_type = initial.value_type();
        inner.variables.push(VariableNode {
            id,
            name: name.to_string(),
            parent: parent.0,
            value: initial,
            value_type,
            writable: false,
            updated_at: None,
            write_count: 0,
        });
        Ok(VariableHandle(inner.variables.len() - 1))
    }

    fn write(&self, handle: VariableHandle, value: TagValue) -> Result<(), SinkError> {
        let mut inner = self.inner.write().expect("address space lock poisoned");
        let node = inner
            .variables
            .get_mut(handle.0)
            .ok_or(SinkError::InvalidHandle)?;
        if value.value_type() != node.value_type {
            return Err(SinkError::WriteRejected(format!(
                "type mismatch on '{}': variable is {:?}, value is {:?}",
                node.name,
                node.value_type,
                value.value_type()
            )));
        }
        node.value = value;
        node.updated_at = Some(Utc::now());
        node.write_count += 1;
        Ok(())
    }

    fn set_writable(&self, handle: VariableHandle) -> Result<(), SinkError> {
        let mut inner = self.inner.write().expect("address space lock poisoned");
        let node = inner
            .variables
            .get_mut(handle.0)
            .ok_or(SinkError::InvalidHandle)?;
        node.writable = true;
        Ok(())
    }

    fn start(&self) -> Result<(), SinkError> {
        let mut inner = self.inner.write().expect("address space lock poisoned");
        inner.started = true;
        info!(
            "Address space serving {} folders and {} variables",
            inner.folders.len(),
            inner.variables.len()
        );
        Ok(())
    }

    fn stop(&self) -> Result<(), SinkError> {
        let mut inner = self.inner.write().expect("address space lock poisoned");
        inner.started = false;
        debug!("Address space stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let space = MemoryAddressSpace::new();
        let root = space
            .create_folder(NodeId::Text("Root".into()), "Root", None)
            .unwrap();
        space
            .create_variable(
                NodeId::Text("A".into()),
                "A",
                TagValue::Float64(0.0),
                root,
            )
            .unwrap();

        let err = space
            .create_variable(
                NodeId::Text("A".into()),
                "A",
                TagValue::Float64(0.0),
                root,
            )
            .unwrap_err();
        assert!(matches!(err, SinkError::DuplicateNode(_)));

        // Collisions are detected across node kinds too
        let err = space
            .create_folder(NodeId::Text("A".into()), "A", Some(root))
            .unwrap_err();
        assert!(matches!(err, SinkError::DuplicateNode(_)));
    }

    #[test]
    fn writes_update_value_and_counters() {
        let space = MemoryAddressSpace::new();
        let root = space
            .create_folder(NodeId::Text("Root".into()), "Root", None)
            .unwrap();
        let var = space
            .create_variable(
                NodeId::Text("A".into()),
                "A",
                TagValue::Float64(0.0),
                root,
            )
            .unwrap();

        assert_eq!(space.write_count(var).unwrap(), 0);
        assert_eq!(space.updated_at(var).unwrap(), None);

        space.write(var, TagValue::Float64(4.5)).unwrap();
        assert_eq!(space.read(var).unwrap(), TagValue::Float64(4.5));
        assert_eq!(space.write_count(var).unwrap(), 1);
        assert!(space.updated_at(var).unwrap().is_some());
    }

    #[test]
    fn writes_reject_type_mismatches() {
        let space = MemoryAddressSpace::new();
        let root = space
            .create_folder(NodeId::Text("Root".into()), "Root", None)
            .unwrap();
        let var = space
            .create_variable(
                NodeId::Text("A".into()),
                "A",
                TagValue::Boolean(false),
                root,
            )
            .unwrap();

        let err = space.write(var, TagValue::Float64(1.0)).unwrap_err();
        assert!(matches!(err, SinkError::WriteRejected(_)));
        assert_eq!(space.read(var).unwrap(), TagValue::Boolean(false));
    }
}
