// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP bridge for the tag address space
//!
//! Exposes every numeric and boolean tag's current value as a pair of input
//! registers holding an IEEE-754 f32, high word first, at register address
//! `2 × sequence_index`. Text tags have no register representation and are
//! not mapped.
//!
//! ## Register Map
//!
//! | Register Address   | Contents                          |
//! |--------------------|-----------------------------------|
//! | `2 × idx`          | f32 high word of tag `idx`        |
//! | `2 × idx + 1`      | f32 low word of tag `idx`         |
//!
//! Booleans are encoded as 0.0/1.0, Int32 values as their f32 conversion.
//!
//! Only `ReadInputRegisters` (0x04) is implemented; the bridge is strictly
//! read-only and every other function code answers `IllegalFunction`. Reads
//! always reflect the latest value written by the update shards, because
//! each request reads through to the shared address space.

use std::collections::BTreeMap;
use std::future;
use std::sync::Arc;

use log::{debug, error, warn};
use tokio_modbus::prelude::*;

use crate::addressing::{AddressSpaceHandle, MemoryAddressSpace, VariableHandle};
use crate::catalog::{TagCatalog, ValueType};

/// A Modbus TCP server bridging into the tag address space.
///
/// The server is cheap to clone per connection: it shares the address space
/// and the register map behind `Arc`s.
#[derive(Clone)]
pub struct TagModbusServer {
    space: Arc<MemoryAddressSpace>,
    /// First (high-word) register address of each mapped tag.
    registers: Arc<BTreeMap<u16, VariableHandle>>,
}

impl TagModbusServer {
    /// Build the register map for every non-text tag of the catalog.
    pub fn new(
        catalog: &TagCatalog,
        handles: &AddressSpaceHandle,
        space: Arc<MemoryAddressSpace>,
    ) -> Self {
        let mut registers = BTreeMap::new();
        for tag in catalog.iter() {
            if tag.value_type == ValueType::Text {
                continue;
            }
            let Some((handle, _)) = handles.variable(&tag.group, &tag.name) else {
                continue;
            };
            match u16::try_from(tag.sequence_index * 2) {
                Ok(base) => {
                    registers.insert(base, handle);
                }
                Err(_) => {
                    warn!(
                        "tag '{}' sequence index {} exceeds the register space, not mapped",
                        tag.name, tag.sequence_index
                    );
                }
            }
        }
        debug!("Modbus bridge mapping {} tags", registers.len());
        Self {
            space,
            registers: Arc::new(registers),
        }
    }

    /// Number of tags with a register mapping.
    pub fn mapped_tags(&self) -> usize {
        self.registers.len()
    }

    fn read_registers(&self, addr: u16, cnt: u16) -> Result<Vec<u16>, ExceptionCode> {
        let mut response_values = vec![0; cnt.into()];

        for i in 0..cnt {
            let reg_addr = addr + i;
            // Each mapped tag owns the register pair (base, base + 1)
            let base = reg_addr & !1;
            let Some(&handle) = self.registers.get(&base) else {
                error!(
                    "Exception::IllegalDataAddress - Register {} not mapped",
                    reg_addr
                );
                return Err(ExceptionCode::IllegalDataAddress);
            };
            let value = self.space.read(handle).map_err(|e| {
                error!("Failed to read tag behind register {}: {}", reg_addr, e);
                ExceptionCode::ServerDeviceFailure
            })?;
            // Mapped tags are numeric or boolean, both have an f32 view
            let bits = (value.as_f64().unwrap_or(0.0) as f32).to_bits();
            response_values[i as usize] = if reg_addr == base {
                (bits >> 16) as u16
            } else {
                bits as u16
            };
        }

        debug!("Successfully read {} registers from address {}", cnt, addr);
        Ok(response_values)
    }
}

impl tokio_modbus::server::Service for TagModbusServer {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    /// Process a Modbus request and provide a response
    ///
    /// Only `ReadInputRegisters` (0x04) is supported; the address space is
    /// mutated exclusively by the update shards, never over Modbus.
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);

        let res = match req {
            Request::ReadInputRegisters(addr, cnt) => {
                debug!(
                    "Reading {} input registers starting from address {}",
                    cnt, addr
                );
                self.read_registers(addr, cnt)
                    .map(Response::ReadInputRegisters)
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("Modbus request error: {:?}", e);
        }

        future::ready(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::{AddressSpaceBuilder, AddressSpaceSink, AddressingMode};
    use crate::catalog::{TagDefinition, TagValue};

    fn bridge_fixture() -> (TagModbusServer, Arc<MemoryAddressSpace>, AddressSpaceHandle) {
        let tags = vec![
            TagDefinition {
                name: "Flow".to_string(),
                group: "G1".to_string(),
                value_type: ValueType::Float64,
                min: 0.0,
                max: 100.0,
                base_value: None,
                sequence_index: 0,
            },
            TagDefinition {
                name: "Running".to_string(),
                group: "G1".to_string(),
                value_type: ValueType::Boolean,
                min: 0.0,
                max: 1.0,
                base_value: None,
                sequence_index: 1,
            },
            TagDefinition {
                name: "Label".to_string(),
                group: "G1".to_string(),
                value_type: ValueType::Text,
                min: 0.0,
                max: 0.0,
                base_value: None,
                sequence_index: 2,
            },
        ];
        let catalog = TagCatalog::new(tags).unwrap();
        let space = Arc::new(MemoryAddressSpace::new());
        let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
            .build(space.as_ref())
            .unwrap();
        let bridge = TagModbusServer::new(&catalog, &handles, space.clone());
        (bridge, space, handles)
    }

    #[test]
    fn text_tags_are_not_mapped() {
        let (bridge, _, _) = bridge_fixture();
        assert_eq!(bridge.mapped_tags(), 2);
    }

    #[test]
    fn register_pairs_decode_to_the_written_value() {
        let (bridge, space, handles) = bridge_fixture();
        let (flow, _) = handles.variable("G1", "Flow").unwrap();
        space.write(flow, TagValue::Float64(42.5)).unwrap();

        let words = bridge.read_registers(0, 2).unwrap();
        let decoded = f32::from_bits((u32::from(words[0]) << 16) | u32::from(words[1]));
        assert_eq!(decoded, 42.5);
    }

    #[test]
    fn boolean_tags_read_as_zero_or_one() {
        let (bridge, space, handles) = bridge_fixture();
        let (running, _) = handles.variable("G1", "Running").unwrap();

        let words = bridge.read_registers(2, 2).unwrap();
        let decoded = f32::from_bits((u32::from(words[0]) << 16) | u32::from(words[1]));
        assert_eq!(decoded, 0.0);

        space.write(running, TagValue::Boolean(true)).unwrap();
        let words = bridge.read_registers(2, 2).unwrap();
        let decoded = f32::from_bits((u32::from(words[0]) << 16) | u32::from(words[1]));
        assert_eq!(decoded, 1.0);
    }

    #[test]
    fn unmapped_registers_answer_illegal_data_address() {
        let (bridge, _, _) = bridge_fixture();
        // Sequence index 2 is a text tag: its register pair is unmapped
        assert_eq!(
            bridge.read_registers(4, 2).unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
        assert_eq!(
            bridge.read_registers(100, 1).unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
    }
}
