//! Tests for the Modbus TCP bridge
//!
//! These tests validate the bridge by starting a server instance and
//! connecting to it via a Modbus client: live tag values must decode from
//! their input register pairs, writes must be refused, and unmapped
//! registers must answer with an exception.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time;
use tokio_modbus::{
    prelude::*,
    server::tcp::{accept_tcp_connection, Server},
};

use rust_tagsim::addressing::{
    AddressSpaceBuilder, AddressSpaceHandle, AddressingMode, MemoryAddressSpace,
};
use rust_tagsim::catalog::{builtin::builtin_catalog, TagValue};
use rust_tagsim::modbus::TagModbusServer;

/// Test utility function to start a bridge server in the background
async fn start_test_server() -> Result<
    (
        SocketAddr,
        Arc<MemoryAddressSpace>,
        AddressSpaceHandle,
        tokio::task::JoinHandle<()>,
    ),
    Box<dyn std::error::Error>,
> {
    let catalog = builtin_catalog();
    let space = Arc::new(MemoryAddressSpace::new());
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(space.as_ref())?;
    let bridge = TagModbusServer::new(&catalog, &handles, space.clone());

    // Use port 0 to let the OS assign an available port
    let socket_addr = SocketAddr::from_str("127.0.0.1:0").unwrap();
    let listener = TcpListener::bind(socket_addr).await?;
    let socket_addr = listener.local_addr()?;

    let server = Server::new(listener);
    let on_connected = move |stream, socket_addr| {
        let bridge = bridge.clone();
        async move {
            accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                Ok(Some(bridge.clone()))
            })
        }
    };
    let on_process_error = |err| {
        eprintln!("Server error: {}", err);
    };

    let handle = tokio::spawn(async move {
        if let Err(e) = server.serve(&on_connected, on_process_error).await {
            eprintln!("Server error: {}", e);
        }
    });

    // Give the server a moment to start
    time::sleep(Duration::from_millis(100)).await;

    Ok((socket_addr, space, handles, handle))
}

fn decode_f32(words: &[u16]) -> f32 {
    f32::from_bits((u32::from(words[0]) << 16) | u32::from(words[1]))
}

#[tokio::test]
async fn test_initial_values_read_as_zero() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, _space, _handles, _server_handle) = start_test_server().await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // Sequence index 0 (D1001VFDStop) occupies registers 0 and 1
    let data = ctx.read_input_registers(0, 2).await??;
    assert_eq!(data.len(), 2);
    assert_eq!(decode_f32(&data), 0.0);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_live_value_is_served() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, space, handles, _server_handle) = start_test_server().await?;

    // Simulate an update shard writing a new value
    let (var, _) = handles
        .variable("VFD_CNTRL_TAGS", "D1001VFDStopSpeedSetpoint")
        .unwrap();
    use rust_tagsim::addressing::AddressSpaceSink;
    space.write(var, TagValue::Float64(36.25))?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // Sequence index 1 occupies registers 2 and 3
    let data = ctx.read_input_registers(2, 2).await??;
    assert_eq!(decode_f32(&data), 36.25);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_unmapped_register_is_an_exception() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, _space, _handles, _server_handle) = start_test_server().await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // Sequence index 10 is a text tag: registers 20/21 have no mapping
    let response = ctx.read_input_registers(20, 2).await?;
    assert!(response.is_err());

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_writes_are_refused() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, _space, _handles, _server_handle) = start_test_server().await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // The bridge is read-only: every write function code is illegal
    let response = ctx.write_single_register(0, 42).await?;
    assert!(response.is_err());

    ctx.disconnect().await?;
    Ok(())
}
