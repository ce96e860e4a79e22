//! Attribute indexing over the content tree
//!
//! The indexer walks the tree in document order and gathers attribute
//! values from every element of a given local name, whatever its
//! namespace prefix. Duplicates are kept: occurrence counts depend on them.

use std::collections::HashMap;

use odtkit_dom::{NodeId, XmlTree};

/// Collect `attribute` from every element named `element_kind`
///
/// `element_kind` is a local name (`section`, `user-field-get`) or `*` for
/// any element. Elements without the attribute are skipped.
pub fn collect(tree: &XmlTree, element_kind: &str, attribute: &str) -> Vec<String> {
    tree.elements_named(element_kind)
        .filter_map(|id| tree.attribute(id, attribute))
        .map(str::to_string)
        .collect()
}

/// Elements named `element_kind` whose `attribute` equals `value`
pub fn nodes_with(
    tree: &XmlTree,
    element_kind: &str,
    attribute: &str,
    value: &str,
) -> Vec<NodeId> {
    tree.elements_named(element_kind)
        .filter(|&id| tree.attribute(id, attribute) == Some(value))
        .collect()
}

/// An indexed sequence together with its frequency table
#[derive(Debug, Clone, Default)]
pub struct Indexed {
    values: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Indexed {
    /// Build from raw values, preserving order and duplicates
    pub fn new(values: Vec<String>) -> Self {
        let mut counts = HashMap::new();
        for v in &values {
            *counts.entry(v.clone()).or_insert(0) += 1;
        }
        Self { values, counts }
    }

    /// The raw sequence in document order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether `name` occurs at least once
    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    /// Number of occurrences of `name`
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Number of entries, duplicates included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
