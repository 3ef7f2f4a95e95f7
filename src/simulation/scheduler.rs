// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sharded tag update scheduler.
//!
//! The full tag set is split once, at startup, into `shard_count` disjoint
//! fixed-membership shards: tags are ordered by sequence index and cut into
//! contiguous chunks. Each shard runs as an independent tokio task with its
//! own cadence timer and exclusively owns the mutable state of its tags
//! (including the random-walk base values), so no locking is needed across
//! shards and no tag ever has two writers.
//!
//! Failures are contained at the smallest possible scope: a value-generation
//! error skips that tag for the tick, a sink write error makes the shard back
//! off and retry on its next tick. After enough consecutive failing ticks a
//! shard reports itself degraded but keeps retrying; it never exits on its
//! own and never affects its siblings.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::addressing::{AddressSpaceHandle, AddressSpaceSink, VariableHandle};
use crate::catalog::{TagCatalog, TagDefinition};
use crate::config::SimulationConfig;
use crate::simulation::generator::ValueGenerator;

/// Consecutive failing ticks after which a shard reports itself degraded.
const DEGRADED_AFTER_TICKS: u32 = 5;

/// Pause after a tick with write failures before the next attempt.
const WRITE_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// One tag owned by a shard: its definition (with the shard-local, mutable
/// random-walk base) and the live variable handle.
struct TagSlot {
    def: TagDefinition,
    handle: VariableHandle,
}

/// Cut the catalog into `shard_count` contiguous chunks of sequence-ordered
/// tags, resolving each tag to its variable handle.
fn partition(
    catalog: &TagCatalog,
    handles: &AddressSpaceHandle,
    shard_count: usize,
) -> Vec<Vec<TagSlot>> {
    let slots: Vec<TagSlot> = catalog
        .iter()
        .filter_map(|def| match handles.variable(&def.group, &def.name) {
            Some((handle, _)) => Some(TagSlot {
                def: def.clone(),
                handle,
            }),
            None => {
                warn!("tag '{}' has no address-space variable, skipping", def.name);
                None
            }
        })
        .collect();

    if slots.is_empty() {
        return Vec::new();
    }

    let shard_count = shard_count.max(1);
    let chunk_size = slots.len().div_ceil(shard_count);
    let mut shards: Vec<Vec<TagSlot>> = Vec::with_capacity(shard_count);
    let mut current = Vec::with_capacity(chunk_size);
    for slot in slots {
        current.push(slot);
        if current.len() == chunk_size {
            shards.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        shards.push(current);
    }
    shards
}

/// Runs the per-shard update loops and owns their lifecycle.
pub struct UpdateScheduler {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    assignments: Vec<Vec<String>>,
}

impl UpdateScheduler {
    /// Partition the catalog and spawn one update task per non-empty shard.
    ///
    /// Must be called from within a tokio runtime. The address space is
    /// expected to be fully built; the scheduler only ever writes through
    /// handles obtained from `handles`.
    pub fn start(
        config: &SimulationConfig,
        catalog: &TagCatalog,
        handles: &AddressSpaceHandle,
        sink: Arc<dyn AddressSpaceSink>,
    ) -> Self {
        let shards = partition(catalog, handles, config.shard_count);
        let assignments: Vec<Vec<String>> = shards
            .iter()
            .map(|slots| slots.iter().map(|s| s.def.name.clone()).collect())
            .collect();

        let running = Arc::new(AtomicBool::new(true));
        let change_rate = Duration::from_secs_f64(config.change_rate);

        info!(
            "Starting update scheduler: {} tags across {} shards, tick every {:?}{}",
            assignments.iter().map(Vec::len).sum::<usize>(),
            assignments.len(),
            change_rate,
            if config.persist_base {
                ", persisting base values"
            } else {
                ""
            }
        );

        let tasks = shards
            .into_iter()
            .enumerate()
            .map(|(shard_id, slots)| {
                let sink = sink.clone();
                let running = running.clone();
                let step = config.step;
                let persist_base = config.persist_base;
                tokio::spawn(async move {
                    run_shard(
                        shard_id,
                        slots,
                        sink,
                        running,
                        change_rate,
                        step,
                        persist_base,
                    )
                    .await
                })
            })
            .collect();

        Self {
            tasks,
            running,
            assignments,
        }
    }

    /// Tag names owned by each shard, in update order.
    pub fn shard_assignments(&self) -> &[Vec<String>] {
        &self.assignments
    }

    /// Signal every shard to exit its loop. Each shard observes the signal
    /// within one tick interval.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for all shard tasks to finish.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Update shard ended with error: {e}"),
                Err(e) => error!("Update shard panicked: {e}"),
            }
        }
        Ok(())
    }
}

/// The per-shard update loop.
///
/// Within a tick, tags update in their fixed sequence order. The shard owns
/// `slots` exclusively, including the base values mutated in persist mode.
async fn run_shard(
    shard_id: usize,
    mut slots: Vec<TagSlot>,
    sink: Arc<dyn AddressSpaceSink>,
    running: Arc<AtomicBool>,
    change_rate: Duration,
    step: Option<f64>,
    persist_base: bool,
) -> Result<()> {
    debug!("Shard {} starting with {} tags", shard_id, slots.len());
    let mut generator = ValueGenerator::new();
    let mut interval = time::interval(change_rate);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut consecutive_failed_ticks: u32 = 0;
    let mut degraded = false;
    let mut tick_count: u64 = 0;

    while running.load(Ordering::Relaxed) {
        interval.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
        tick_count += 1;

        let mut write_failures = 0usize;
        for slot in slots.iter_mut() {
            let def = &slot.def;
            let value =
                match generator.next(def.value_type, def.min, def.max, def.base_value, step) {
                    Ok(value) => value,
                    Err(e) => {
                        // Contained to this tag and this tick only
                        error!("Shard {}: skipping '{}' this tick: {}", shard_id, def.name, e);
                        continue;
                    }
                };

            let numeric = value.as_f64();
            match sink.write(slot.handle, value) {
                Ok(()) => {
                    if persist_base && slot.def.base_value.is_some() {
                        // Random walk: the written value becomes the next anchor
                        if let Some(v) = numeric {
                            slot.def.base_value = Some(v);
                        }
                    }
                }
                Err(e) => {
                    write_failures += 1;
                    debug!(
                        "Shard {}: write for '{}' rejected: {}",
                        shard_id, slot.def.name, e
                    );
                }
            }
        }

        if write_failures > 0 {
            consecutive_failed_ticks += 1;
            if consecutive_failed_ticks >= DEGRADED_AFTER_TICKS && !degraded {
                degraded = true;
                warn!(
                    "Shard {} degraded: {} consecutive ticks with write failures, still retrying",
                    shard_id, consecutive_failed_ticks
                );
            }
            time::sleep(WRITE_RETRY_BACKOFF).await;
        } else if consecutive_failed_ticks > 0 {
            consecutive_failed_ticks = 0;
            if degraded {
                degraded = false;
                info!("Shard {} recovered", shard_id);
            }
        }
    }

    debug!("Shard {} stopped after {} ticks", shard_id, tick_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{TagDefinition, ValueType};

    fn catalog_of(n: u32) -> TagCatalog {
        let tags = (0..n)
            .map(|i| TagDefinition {
                name: format!("T{i}"),
                group: "G1".to_string(),
                value_type: ValueType::Float64,
                min: 0.0,
                max: 1.0,
                base_value: None,
                sequence_index: i,
            })
            .collect();
        TagCatalog::new(tags).unwrap()
    }

    fn handles_for(catalog: &TagCatalog) -> AddressSpaceHandle {
        use crate::addressing::{AddressSpaceBuilder, AddressingMode, MemoryAddressSpace};
        let sink = MemoryAddressSpace::new();
        AddressSpaceBuilder::new(catalog, AddressingMode::Short)
            .build(&sink)
            .unwrap()
    }

    #[test]
    fn partition_is_disjoint_and_covers_all_tags() {
        let catalog = catalog_of(10);
        let handles = handles_for(&catalog);
        let shards = partition(&catalog, &handles, 3);

        assert_eq!(shards.len(), 3);
        let mut seen = std::collections::HashSet::new();
        for shard in &shards {
            for slot in shard {
                assert!(seen.insert(slot.def.name.clone()), "tag in two shards");
            }
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn partition_is_stable_chunking_by_sequence_index() {
        let catalog = catalog_of(4);
        let handles = handles_for(&catalog);
        let shards = partition(&catalog, &handles, 2);

        let names: Vec<Vec<&str>> = shards
            .iter()
            .map(|s| s.iter().map(|slot| slot.def.name.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["T0", "T1"], vec!["T2", "T3"]]);
    }

    #[test]
    fn partition_handles_more_shards_than_tags() {
        let catalog = catalog_of(2);
        let handles = handles_for(&catalog);
        let shards = partition(&catalog, &handles, 8);
        // chunk size of 1: one shard per tag, empty shards never created
        assert_eq!(shards.len(), 2);
        assert!(shards.iter().all(|s| s.len() == 1));
    }
}
