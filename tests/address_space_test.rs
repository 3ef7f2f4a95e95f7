//! Tests for address-space construction across the three addressing modes.
//!
//! These tests build real address spaces against the in-memory sink and
//! verify the identifiers and initial values a client would observe.

use rust_tagsim::addressing::{AddressSpaceBuilder, AddressingMode, MemoryAddressSpace, NodeId};
use rust_tagsim::catalog::{builtin::builtin_catalog, TagCatalog, TagDefinition, TagValue, ValueType};

fn three_tag_catalog() -> TagCatalog {
    let tags = vec![
        TagDefinition {
            name: "A".to_string(),
            group: "G1".to_string(),
            value_type: ValueType::Float32,
            min: 0.0,
            max: 1.0,
            base_value: None,
            sequence_index: 0,
        },
        TagDefinition {
            name: "B".to_string(),
            group: "G1".to_string(),
            value_type: ValueType::Boolean,
            min: 0.0,
            max: 1.0,
            base_value: None,
            sequence_index: 1,
        },
        TagDefinition {
            name: "C".to_string(),
            group: "G1".to_string(),
            value_type: ValueType::Text,
            min: 0.0,
            max: 0.0,
            base_value: None,
            sequence_index: 2,
        },
    ];
    TagCatalog::new(tags).unwrap()
}

#[test]
fn short_mode_variable_identifiers_are_bare_names() {
    let catalog = three_tag_catalog();
    let sink = MemoryAddressSpace::new();
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(&sink)
        .unwrap();

    for name in ["A", "B", "C"] {
        let (var, _) = handles.variable("G1", name).unwrap();
        assert_eq!(sink.node_id(var).unwrap(), NodeId::Text(name.to_string()));
    }
}

#[test]
fn long_mode_variable_identifiers_are_group_qualified() {
    let catalog = three_tag_catalog();
    let sink = MemoryAddressSpace::new();
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Long)
        .build(&sink)
        .unwrap();

    for name in ["A", "B", "C"] {
        let (var, _) = handles.variable("G1", name).unwrap();
        assert_eq!(
            sink.node_id(var).unwrap(),
            NodeId::Text(format!("G1.{name}"))
        );
    }
}

#[test]
fn initial_values_match_the_zero_table() {
    let catalog = builtin_catalog();
    let sink = MemoryAddressSpace::new();
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Short)
        .build(&sink)
        .unwrap();

    assert_eq!(handles.variable_count(), 103);

    for (_, _, var, value_type) in handles.iter() {
        let value = sink.read(var).unwrap();
        assert_eq!(value, TagValue::zero(value_type));
        assert!(sink.is_writable(var).unwrap());
    }
}

#[test]
fn numeric_mode_builds_collision_free_identifiers() {
    let catalog = builtin_catalog();
    let sink = MemoryAddressSpace::new();
    let handles = AddressSpaceBuilder::new(&catalog, AddressingMode::Numeric)
        .build(&sink)
        .unwrap();

    // 5 chain containers + 7 group folders, 103 variables
    assert_eq!(sink.folder_count(), 12);
    assert_eq!(sink.variable_count(), 103);

    // Tag identifiers start at 2001 in sequence order
    let (var, _) = handles.variable("VFD_CNTRL_TAGS", "D1001VFDStop").unwrap();
    assert_eq!(sink.node_id(var).unwrap(), NodeId::Numeric(2001));

    let (var, _) = handles
        .variable("Inputs", "PT2001PELubeSupplyPressSetpoint_ENG")
        .unwrap();
    assert_eq!(sink.node_id(var).unwrap(), NodeId::Numeric(2001 + 25));
}

#[test]
fn rebuilding_into_the_same_sink_is_a_fatal_collision() {
    let catalog = three_tag_catalog();
    let sink = MemoryAddressSpace::new();
    let builder = AddressSpaceBuilder::new(&catalog, AddressingMode::Short);

    builder.build(&sink).unwrap();
    let err = builder.build(&sink).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn unknown_catalog_name_aborts_a_numeric_build() {
    // A catalog whose group never appears in the structural list cannot
    // happen through TagCatalog; simulate the unknown-name failure through
    // the resolver contract instead.
    use rust_tagsim::addressing::NodeIdResolver;

    let catalog = three_tag_catalog();
    let resolver = NodeIdResolver::new(&catalog);
    let err = resolver
        .resolve("NotInCatalog", AddressingMode::Numeric, "")
        .unwrap_err();
    assert!(err.to_string().contains("NotInCatalog"));
}
