// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Tag Catalog
//!
//! This module defines the static catalog of process tags served by the
//! simulator: tag names, the group (folder) each tag lives under, its declared
//! value type, numeric range and optional base value used for random-walk
//! generation.
//!
//! The catalog is pure data. It is loaded once at startup, validated for
//! catalog-wide uniqueness of names and sequence indices, and never mutated
//! afterwards. All addressing and scheduling decisions derive from it.
//!
//! ## Components
//!
//! * [`ValueType`] - The closed set of value types a tag can declare
//! * [`TagValue`] - A runtime value tagged with its type
//! * [`TagDefinition`] - One catalog entry
//! * [`TagCatalog`] - The validated collection, indexed by name and ordered
//!   by sequence index
//!
//! The built-in HPU mud-pump catalog lives in [`builtin`].

pub mod builtin;

use std::collections::HashMap;

use thiserror::Error;

/// Value types a tag can declare.
///
/// This is the closed set of types the simulator supports; every generation
/// and encoding decision is an exhaustive match over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 32-bit signed integer
    Int32,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Boolean
    Boolean,
    /// Text string
    Text,
}

/// A runtime tag value, tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    Text(String),
}

impl TagValue {
    /// The type-appropriate zero value used to initialize every variable at
    /// address-space build time.
    ///
    /// * `Int32` → `0`
    /// * `Float32`/`Float64` → `0.0`
    /// * `Boolean` → `false`
    /// * `Text` → `""`
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Int32 => TagValue::Int32(0),
            ValueType::Float32 => TagValue::Float32(0.0),
            ValueType::Float64 => TagValue::Float64(0.0),
            ValueType::Boolean => TagValue::Boolean(false),
            ValueType::Text => TagValue::Text(String::new()),
        }
    }

    /// The declared type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            TagValue::Int32(_) => ValueType::Int32,
            TagValue::Float32(_) => ValueType::Float32,
            TagValue::Float64(_) => ValueType::Float64,
            TagValue::Boolean(_) => ValueType::Boolean,
            TagValue::Text(_) => ValueType::Text,
        }
    }

    /// Numeric view of the value, if it has one.
    ///
    /// Booleans map to 0.0/1.0; text has no numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Int32(v) => Some(f64::from(*v)),
            TagValue::Float32(v) => Some(f64::from(*v)),
            TagValue::Float64(v) => Some(*v),
            TagValue::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            TagValue::Text(_) => None,
        }
    }
}

/// One catalog entry: a named process variable and its generation parameters.
///
/// `name` is unique across the whole catalog, not merely within its group.
/// `sequence_index` is a stable small integer assigned once at catalog
/// definition time; it drives numeric addressing and must never be reassigned
/// after deployment, or numeric-mode clients lose compatibility.
#[derive(Debug, Clone)]
pub struct TagDefinition {
    /// Catalog-wide unique tag name.
    pub name: String,
    /// Group (folder) the tag lives under.
    pub group: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Lower numeric bound. Present but meaningless for Boolean/Text.
    pub min: f64,
    /// Upper numeric bound. Present but meaningless for Boolean/Text.
    pub max: f64,
    /// Optional anchor for random-walk generation. Only numeric tags carry one.
    pub base_value: Option<f64>,
    /// Stable catalog-wide unique index used by numeric addressing.
    pub sequence_index: u32,
}

/// Errors raised while validating a catalog definition.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("duplicate tag name '{0}' in catalog")]
    DuplicateName(String),
    #[error("duplicate sequence index {index} (tags '{first}' and '{second}')")]
    DuplicateSequenceIndex {
        index: u32,
        first: String,
        second: String,
    },
}

/// The validated tag catalog.
///
/// Tags are held in ascending `sequence_index` order, which is the canonical
/// iteration order everywhere (address-space build, shard partitioning,
/// per-tick updates). Groups are listed in order of first appearance.
#[derive(Debug, Clone)]
pub struct TagCatalog {
    tags: Vec<TagDefinition>,
    by_name: HashMap<String, usize>,
    groups: Vec<String>,
}

impl TagCatalog {
    /// Build a catalog from raw definitions, validating catalog-wide
    /// uniqueness of `name` and `sequence_index`.
    pub fn new(mut tags: Vec<TagDefinition>) -> Result<Self, CatalogError> {
        tags.sort_by_key(|t| t.sequence_index);

        let mut by_name = HashMap::with_capacity(tags.len());
        let mut by_index: HashMap<u32, usize> = HashMap::with_capacity(tags.len());
        let mut groups: Vec<String> = Vec::new();

        for (pos, tag) in tags.iter().enumerate() {
            if by_name.insert(tag.name.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateName(tag.name.clone()));
            }
            if let Some(prev) = by_index.insert(tag.sequence_index, pos) {
                return Err(CatalogError::DuplicateSequenceIndex {
                    index: tag.sequence_index,
                    first: tags[prev].name.clone(),
                    second: tag.name.clone(),
                });
            }
            if !groups.iter().any(|g| g == &tag.group) {
                groups.push(tag.group.clone());
            }
        }

        Ok(Self {
            tags,
            by_name,
            groups,
        })
    }

    /// Look a tag up by name.
    pub fn get(&self, name: &str) -> Option<&TagDefinition> {
        self.by_name.get(name).map(|&pos| &self.tags[pos])
    }

    /// Iterate over all tags in ascending sequence-index order.
    pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.iter()
    }

    /// Group names in order of first appearance.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Iterate over the tags of one group, in sequence-index order.
    pub fn tags_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a TagDefinition> {
        self.tags.iter().filter(move |t| t.group == group)
    }

    /// Number of tags in the catalog.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True if the catalog holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
