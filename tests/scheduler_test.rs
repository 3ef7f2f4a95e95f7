//! Tests for the sharded update scheduler.
//!
//! The timing-sensitive tests run on Tokio's paused clock, so tick counts
//! are exact rather than load-dependent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_tagsim::addressing::{
    AddressSpaceBuilder, AddressSpaceSink, AddressingMode, FolderHandle, MemoryAddressSpace,
    NodeId, SinkError, VariableHandle,
};
use rust_tagsim::catalog::{TagCatalog, TagDefinition, TagValue, ValueType};
use rust_tagsim::config::SimulationConfig;
use rust_tagsim::simulation::UpdateScheduler;

fn float_catalog(n: u32) -> TagCatalog {
    let tags = (0..n)
        .map(|i| TagDefinition {
            name: format!("T{i}"),
            group: "G1".to_string(),
            value_type: ValueType::Float64,
            min: 0.0,
            max: 100.0,
            base_value: Some(50.0),
            sequence_index: i,
        })
        .collect();
    TagCatalog::new(tags).unwrap()
}

fn simulation_config(change_rate: f64, shard_count: usize) -> SimulationConfig {
    SimulationConfig {
        enabled: true,
        change_rate,
        step: None,
        persist_base: false,
        shard_count,
    }
}

#[tokio::test(start_paused = true)]
async fn two_shards_tick_each_tag_within_bounds() {
    let catalog = float_catalog(4);
    let sink = Arc::new(MemoryAddressSpace::new());
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(sink.as_ref())
        .unwrap();

    let config = simulation_config(0.1, 2);
    let scheduler = UpdateScheduler::start(&config, &catalog, &handles, sink.clone());

    // No tag may appear in two shards
    let assignments = scheduler.shard_assignments().to_vec();
    assert_eq!(assignments.len(), 2);
    assert_eq!(assignments[0], vec!["T0", "T1"]);
    assert_eq!(assignments[1], vec!["T2", "T3"]);

    tokio::time::sleep(Duration::from_millis(350)).await;
    scheduler.stop();
    scheduler.join().await.unwrap();

    // Ticks at 0.0, 0.1, 0.2 and 0.3 seconds: 3 to 4 writes per tag
    for name in ["T0", "T1", "T2", "T3"] {
        let (var, _) = handles.variable("G1", name).unwrap();
        let writes = sink.write_count(var).unwrap();
        assert!(
            (3..=4).contains(&writes),
            "tag {name} written {writes} times"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn generated_values_respect_tag_bounds() {
    let catalog = float_catalog(6);
    let sink = Arc::new(MemoryAddressSpace::new());
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(sink.as_ref())
        .unwrap();

    let config = SimulationConfig {
        enabled: true,
        change_rate: 0.05,
        step: Some(5.0),
        persist_base: true,
        shard_count: 3,
    };
    let scheduler = UpdateScheduler::start(&config, &catalog, &handles, sink.clone());

    tokio::time::sleep(Duration::from_secs(2)).await;
    scheduler.stop();
    scheduler.join().await.unwrap();

    for (_, name, var, _) in handles.iter() {
        match sink.read(var).unwrap() {
            TagValue::Float64(v) => {
                assert!((0.0..=100.0).contains(&v), "tag {name} out of range: {v}")
            }
            other => panic!("unexpected value {other:?}"),
        }
        assert!(sink.write_count(var).unwrap() > 0, "tag {name} never written");
    }
}

/// Sink wrapper that rejects every write to one designated variable.
struct FailingSink {
    inner: Arc<MemoryAddressSpace>,
    failing: VariableHandle,
    rejected: AtomicUsize,
}

impl AddressSpaceSink for FailingSink {
    fn create_folder(
        &self,
        id: NodeId,
        name: &str,
        parent: Option<FolderHandle>,
    ) -> Result<FolderHandle, SinkError> {
        self.inner.create_folder(id, name, parent)
    }

    fn create_variable(
        &self,
        id: NodeId,
        name: &str,
        initial: TagValue,
        parent: FolderHandle,
    ) -> Result<VariableHandle, SinkError> {
        self.inner.create_variable(id, name, initial, parent)
    }

    fn write(&self, handle: VariableHandle, value: TagValue) -> Result<(), SinkError> {
        if handle == self.failing {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(SinkError::WriteRejected("connection dropped".to_string()));
        }
        self.inner.write(handle, value)
    }

    fn set_writable(&self, handle: VariableHandle) -> Result<(), SinkError> {
        self.inner.set_writable(handle)
    }

    fn start(&self) -> Result<(), SinkError> {
        self.inner.start()
    }

    fn stop(&self) -> Result<(), SinkError> {
        self.inner.stop()
    }
}

#[tokio::test(start_paused = true)]
async fn write_failures_do_not_stop_sibling_tags_or_shards() {
    let catalog = float_catalog(4);
    let memory = Arc::new(MemoryAddressSpace::new());
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(memory.as_ref())
        .unwrap();

    let (failing, _) = handles.variable("G1", "T0").unwrap();
    let sink = Arc::new(FailingSink {
        inner: memory.clone(),
        failing,
        rejected: AtomicUsize::new(0),
    });

    let config = simulation_config(0.1, 2);
    let scheduler = UpdateScheduler::start(&config, &catalog, &handles, sink.clone());

    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.stop();
    scheduler.join().await.unwrap();

    // The failing tag was attempted but never stored
    assert!(sink.rejected.load(Ordering::SeqCst) >= 3);
    let (t0, _) = handles.variable("G1", "T0").unwrap();
    assert_eq!(memory.write_count(t0).unwrap(), 0);

    // Its shard sibling and the other shard kept updating
    for name in ["T1", "T2", "T3"] {
        let (var, _) = handles.variable("G1", name).unwrap();
        assert!(
            memory.write_count(var).unwrap() >= 3,
            "tag {name} starved by an unrelated failure"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn degenerate_zero_range_updates_cleanly() {
    // Degenerate single-tag shard: the update loop must still run and the
    // 0/0-range tag must read back exactly zero on every tick.
    let tags = vec![TagDefinition {
        name: "ZeroRange".to_string(),
        group: "G1".to_string(),
        value_type: ValueType::Int32,
        min: 0.0,
        max: 0.0,
        base_value: None,
        sequence_index: 0,
    }];
    let catalog = TagCatalog::new(tags).unwrap();
    let sink = Arc::new(MemoryAddressSpace::new());
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(sink.as_ref())
        .unwrap();

    let config = simulation_config(0.1, 1);
    let scheduler = UpdateScheduler::start(&config, &catalog, &handles, sink.clone());

    tokio::time::sleep(Duration::from_millis(500)).await;
    scheduler.stop();
    scheduler.join().await.unwrap();

    let (var, _) = handles.variable("G1", "ZeroRange").unwrap();
    assert!(sink.write_count(var).unwrap() >= 4);
    assert_eq!(sink.read(var).unwrap(), TagValue::Int32(0));
}
