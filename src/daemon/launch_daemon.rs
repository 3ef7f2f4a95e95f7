// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Daemon Management Module
//!
//! This module provides functionality for running and managing the background
//! tasks of the tag server. It handles the lifecycle of:
//!
//! - The address-space build (once, synchronously, before anything else)
//! - The sharded value update scheduler
//! - The Modbus TCP bridge
//! - System health monitoring (heartbeat)
//!
//! ## Architecture
//!
//! The daemon uses Tokio's asynchronous runtime to manage concurrent tasks.
//! Each service runs as an independent task; a shared atomic flag coordinates
//! graceful shutdown. The address space itself is never built concurrently:
//! a resolver or creation error aborts startup before any task is spawned,
//! because a half-built address space must not be served.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};

use crate::addressing::{
    AddressSpaceBuilder, AddressSpaceHandle, AddressSpaceSink, MemoryAddressSpace,
};
use crate::catalog::{builtin::builtin_catalog, TagCatalog};
use crate::config::Config;
use crate::modbus::TagModbusServer;
use crate::simulation::UpdateScheduler;

/// Represents a daemon task manager that coordinates the background services
///
/// This structure maintains a collection of asynchronous tasks and provides
/// methods to start, stop, and monitor them.
///
/// # Thread Safety
///
/// The `running` flag is wrapped in an `Arc` to allow safe sharing between
/// tasks. Each task checks this flag periodically to determine if it should
/// continue running or gracefully terminate.
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    address_space: Arc<MemoryAddressSpace>,
    catalog: TagCatalog,
    handles: Option<AddressSpaceHandle>,
    scheduler: Option<UpdateScheduler>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a new daemon instance backed by the built-in catalog.
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            address_space: Arc::new(MemoryAddressSpace::new()),
            catalog: builtin_catalog(),
            handles: None,
            scheduler: None,
        }
    }

    /// The shared address space served by this daemon.
    pub fn address_space(&self) -> Arc<MemoryAddressSpace> {
        self.address_space.clone()
    }

    /// The per-group variable handle map, available after `launch`.
    pub fn handles(&self) -> Option<&AddressSpaceHandle> {
        self.handles.as_ref()
    }

    /// Launch all configured tasks based on configuration
    ///
    /// Builds the address space first (synchronously, exactly once), then
    /// starts the services that are enabled in the configuration. Each
    /// service runs as a separate asynchronous task.
    ///
    /// # Errors
    ///
    /// Fails, without spawning anything, if the address space cannot be
    /// fully built - an unknown name or a node identifier collision is a
    /// fatal configuration/catalog bug, never retried. Also fails if the
    /// Modbus bridge cannot bind its socket.
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        // The address space must be complete before any shard runs
        let mut builder = AddressSpaceBuilder::new(
            &self.catalog,
            config.address_space.addressing_mode,
        );
        if let Some(base_path) = &config.address_space.long_base_path {
            builder = builder.with_long_base_path(base_path.clone());
        }
        let handles = builder
            .build(self.address_space.as_ref())
            .context("Failed to build the address space")?;

        self.address_space
            .start()
            .context("Failed to start the address space")?;

        info!(
            "'{}' serving {} variables ({} addressing)",
            config.address_space.server_name,
            handles.variable_count(),
            config.address_space.addressing_mode
        );

        // Start the update shards if enabled
        if config.simulation.enabled {
            self.scheduler = Some(UpdateScheduler::start(
                &config.simulation,
                &self.catalog,
                &handles,
                self.address_space.clone(),
            ));
        } else {
            info!("Simulation disabled, serving initial values only");
        }

        // Start the Modbus bridge if enabled
        if config.modbus.enabled {
            let bridge =
                TagModbusServer::new(&self.catalog, &handles, self.address_space.clone());
            self.start_modbus_server(config, bridge).await?;
        }

        self.handles = Some(handles);

        // Start heartbeat task for monitoring
        self.start_heartbeat()?;

        Ok(())
    }

    /// Launch the Modbus bridge
    ///
    /// Binds the listener up front so a bad address or occupied port aborts
    /// startup; the accept loop then runs as a background task until the
    /// daemon's `running` flag is cleared, at which point the server task is
    /// aborted with a bounded shutdown timeout.
    async fn start_modbus_server(&mut self, config: &Config, bridge: TagModbusServer) -> Result<()> {
        info!(
            "Starting Modbus bridge on {}:{} ({} mapped tags)",
            config.modbus.address,
            config.modbus.port,
            bridge.mapped_tags()
        );

        let socket_addr: SocketAddr = format!("{}:{}", config.modbus.address, config.modbus.port)
            .parse()
            .context("Invalid Modbus socket address")?;
        let listener = TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("Failed to bind Modbus bridge to {socket_addr}"))?;

        let running = self.running.clone();
        let task = tokio::spawn(async move {
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
                error!("Modbus bridge error: {err}");
            };

            // Run the accept loop in its own task so shutdown can abort it
            let server_handle = tokio::spawn(async move {
                if let Err(e) = server.serve(&on_connected, on_process_error).await {
                    error!("Modbus bridge error: {}", e);
                }
            });

            // Check every second if we should continue running
            while running.load(Ordering::SeqCst) {
                time::sleep(Duration::from_secs(1)).await;
            }

            info!("Shutting down Modbus bridge...");
            server_handle.abort();

            match tokio::time::timeout(Duration::from_secs(5), server_handle).await {
                Ok(_) => info!("Modbus bridge shut down successfully"),
                Err(_) => {
                    warn!("Modbus bridge shutdown timed out, forcing termination");
                }
            }

            Ok(())
        });

        self.tasks.push(task);
        info!("Modbus bridge started");
        Ok(())
    }

    /// Start a heartbeat task that logs system status periodically
    ///
    /// The heartbeat task runs every 60 seconds and continues until the
    /// daemon's `running` flag is set to `false`. In a production
    /// environment these messages could be monitored by an external system
    /// to detect if the daemon has stopped functioning.
    fn start_heartbeat(&mut self) -> Result<()> {
        debug!("Starting heartbeat monitor");

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                debug!("Daemon heartbeat: running");
                time::sleep(Duration::from_secs(60)).await;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Stop all running tasks
    ///
    /// Update shards observe the signal within one tick interval; the other
    /// tasks within their own check period.
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }
        // Tasks check the running flag and terminate gracefully
    }

    /// Wait for all tasks to complete, then stop the address space.
    pub async fn join(mut self) -> Result<()> {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.join().await?;
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("Task panicked: {}", e);
            }
        }
        if let Err(e) = self.address_space.stop() {
            error!("Failed to stop the address space: {}", e);
        }
        Ok(())
    }
}
