// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Address-space sink abstraction.
//!
//! The protocol server that actually owns the node tree sits behind this
//! trait; the builder and the update scheduler only ever see these six
//! operations. The in-process implementation is [`super::MemoryAddressSpace`].

use thiserror::Error;

use super::NodeId;
use crate::catalog::TagValue;

/// Opaque handle to a folder node created in the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderHandle(pub(crate) usize);

/// Opaque handle to a variable node created in the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableHandle(pub(crate) usize);

/// Errors surfaced by an address-space sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Node creation collided with an existing identifier. Signals a catalog
    /// or addressing bug; fatal at build time and never retried.
    #[error("node identifier {0} already exists in the address space")]
    DuplicateNode(NodeId),

    /// A handle did not refer to a live node of the expected kind.
    #[error("stale or foreign node handle")]
    InvalidHandle,

    /// The sink rejected a value write (e.g. the backing transport dropped).
    /// Recoverable: the owning shard retries on its next tick.
    #[error("write rejected by address space: {0}")]
    WriteRejected(String),
}

/// Operations the tag server core needs from the external address space.
///
/// `create_folder` / `create_variable` / `set_writable` are build-time-only;
/// `write` is the single steady-state operation and is atomic per value from
/// the sink's point of view. `start` and `stop` bracket the serving
/// lifecycle: `start` is called after the address space is fully built,
/// `stop` after every update shard has exited.
pub trait AddressSpaceSink: Send + Sync {
    /// Create a folder node. `parent` of `None` attaches it under the root.
    fn create_folder(
        &self,
        id: NodeId,
        name: &str,
        parent: Option<FolderHandle>,
    ) -> Result<FolderHandle, SinkError>;

    /// Create a variable node with its initial value (which also fixes the
    /// variable's declared type).
    fn create_variable(
        &self,
        id: NodeId,
        name: &str,
        initial: TagValue,
        parent: FolderHandle,
    ) -> Result<VariableHandle, SinkError>;

    /// Overwrite the variable's current value.
    fn write(&self, handle: VariableHandle, value: TagValue) -> Result<(), SinkError>;

    /// Mark the variable writable for clients.
    fn set_writable(&self, handle: VariableHandle) -> Result<(), SinkError>;

    /// Begin serving.
    fn start(&self) -> Result<(), SinkError>;

    /// Stop serving and flush.
    fn stop(&self) -> Result<(), SinkError>;
}
