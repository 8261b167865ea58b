//! Undirected relationship graph over table names.
//!
//! A foreign key from `A` to `B` makes `A` and `B` adjacent in both directions,
//! so a table and the tables referencing it are equally close. Nodes are plain
//! table names; tables are resolved from the schema only when a subset is built.

use super::Schema;
use ahash::AHashMap;
use std::collections::BTreeSet;

/// Symmetric adjacency map keyed by table name
#[derive(Debug, Default, Clone)]
pub struct RelationshipGraph {
    adjacency: AHashMap<String, BTreeSet<String>>,
}

impl RelationshipGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from every foreign key in the schema
    pub fn from_schema(schema: &Schema) -> Self {
        let mut graph = Self::new();

        for table in schema.iter() {
            for fk in &table.foreign_keys {
                graph.put_symmetric(&table.name, &fk.to_table);
            }
        }

        graph
    }

    /// Record that `a` and `b` are adjacent (both directions).
    ///
    /// Adding the same pair again has no effect. `a == b` is stored as a self
    /// loop.
    pub fn put_symmetric(&mut self, a: &str, b: &str) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    /// Adjacent nodes, sorted ascending. Unknown nodes have no neighbors.
    pub fn neighbors(&self, name: &str) -> Vec<String> {
        self.adjacency
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Iterate over the neighbors of `name` without allocating
    pub fn neighbors_iter<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of nodes with at least one edge
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }
}
