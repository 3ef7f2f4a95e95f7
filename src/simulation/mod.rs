// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Value Simulation
//!
//! Everything that makes the served tags move: the typed value generator and
//! the sharded update scheduler that drives it against the address space.
//!
//! ## Components
//!
//! * [`ValueGenerator`] - next-value computation per declared type, bounds
//!   and optional random-walk anchor
//! * [`UpdateScheduler`] - disjoint fixed-membership shards, one concurrent
//!   update loop each, single writer per tag

pub mod generator;
pub mod scheduler;

pub use generator::{ValueGenerationError, ValueGenerator};
pub use scheduler::UpdateScheduler;
