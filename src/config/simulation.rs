// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Update scheduler configuration
//!
//! Controls the cadence and shape of the simulated value updates: how often
//! each shard ticks, how far values may jump, whether generated values become
//! the new random-walk anchor, and how many independent shards the tag set is
//! split into.

use serde::{Deserialize, Serialize};

/// Configuration for the concurrent tag update scheduler.
///
/// # Example
///
/// ```yaml
/// simulation:
///   enabled: true
///   change_rate: 0.5
///   step: 2.5
///   persist_base: true
///   shard_count: 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Whether the update scheduler runs at all. With this off the server
    /// serves the initial zero values and never mutates them.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between update ticks of each shard. Must be greater than zero.
    #[serde(default = "default_change_rate")]
    pub change_rate: f64,

    /// Perturbation magnitude for tags with a base value. When unset, every
    /// tick draws uniformly from the tag's full range instead.
    #[serde(default)]
    pub step: Option<f64>,

    /// Random-walk mode: each generated value becomes the anchor for the
    /// next perturbation instead of jittering around a fixed point.
    #[serde(default)]
    pub persist_base: bool,

    /// Number of independent update shards the tag set is split into.
    /// At least 1.
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_change_rate() -> f64 {
    1.0
}

fn default_shard_count() -> usize {
    4
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            change_rate: default_change_rate(),
            step: None,
            persist_base: false,
            shard_count: default_shard_count(),
        }
    }
}
