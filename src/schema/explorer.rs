//! Distance-bounded exploration of the relationship graph.

use super::{RelationshipGraph, Schema};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Finds the tables surrounding a given table
#[derive(Debug)]
pub struct SchemaExplorer {
    graph: RelationshipGraph,
}

impl SchemaExplorer {
    /// Build the relationship graph for `schema`
    pub fn new(schema: &Schema) -> Self {
        let graph = RelationshipGraph::from_schema(schema);
        debug!(nodes = graph.node_count(), "built relationship graph");
        Self { graph }
    }

    /// Explorer over an existing graph
    pub fn from_graph(graph: RelationshipGraph) -> Self {
        Self { graph }
    }

    /// Names of all tables within `max_distance` hops of `start_table`, sorted.
    ///
    /// `start_table` is always part of the result, whether or not it has any
    /// relationship. Negative distances behave like 0.
    pub fn explore(&self, start_table: &str, max_distance: i64) -> Vec<String> {
        self.explore_with_distances(start_table, max_distance)
            .into_keys()
            .collect()
    }

    /// Like [`explore`](Self::explore), keeping the shortest distance of each table
    pub fn explore_with_distances(
        &self,
        start_table: &str,
        max_distance: i64,
    ) -> BTreeMap<String, usize> {
        let max_distance = max_distance.max(0) as usize;

        let mut distances: BTreeMap<String, usize> = BTreeMap::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();

        distances.insert(start_table.to_string(), 0);
        queue.push_back((start_table.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_distance {
                continue;
            }

            for neighbor in self.graph.neighbors_iter(&current) {
                if !distances.contains_key(neighbor) {
                    distances.insert(neighbor.to_string(), depth + 1);
                    queue.push_back((neighbor.to_string(), depth + 1));
                }
            }
        }

        debug!(
            table = start_table,
            max_distance,
            found = distances.len(),
            "explored surrounding tables"
        );

        distances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ForeignKey, Table};

    // users <- articles <- comments <- reactions, plus an isolated table
    fn chain_schema() -> Schema {
        Schema::new(vec![
            Table::new("articles")
                .with_foreign_keys(vec![ForeignKey::new("user_id", "users", "id")]),
            Table::new("comments")
                .with_foreign_keys(vec![ForeignKey::new("article_id", "articles", "id")]),
            Table::new("reactions")
                .with_foreign_keys(vec![ForeignKey::new("comment_id", "comments", "id")]),
            Table::new("users"),
            Table::new("settings"),
        ])
    }

    #[test]
    fn test_explore_distance_zero() {
        let explorer = SchemaExplorer::new(&chain_schema());
        assert_eq!(explorer.explore("articles", 0), vec!["articles"]);
    }

    #[test]
    fn test_explore_follows_both_directions() {
        let explorer = SchemaExplorer::new(&chain_schema());
        assert_eq!(
            explorer.explore("articles", 1),
            vec!["articles", "comments", "users"]
        );
    }

    #[test]
    fn test_explore_distance_two() {
        let explorer = SchemaExplorer::new(&chain_schema());
        assert_eq!(
            explorer.explore("users", 2),
            vec!["articles", "comments", "users"]
        );
    }

    #[test]
    fn test_negative_distance_is_clamped() {
        let explorer = SchemaExplorer::new(&chain_schema());
        assert_eq!(explorer.explore("articles", -5), vec!["articles"]);
    }

    #[test]
    fn test_isolated_and_unknown_tables() {
        let explorer = SchemaExplorer::new(&chain_schema());
        assert_eq!(explorer.explore("settings", 3), vec!["settings"]);
        assert_eq!(explorer.explore("ghost", 3), vec!["ghost"]);
    }

    #[test]
    fn test_shortest_distances() {
        let mut graph = RelationshipGraph::new();
        // a - b - c - d and a shortcut a - d
        graph.put_symmetric("a", "b");
        graph.put_symmetric("b", "c");
        graph.put_symmetric("c", "d");
        graph.put_symmetric("a", "d");

        let explorer = SchemaExplorer::from_graph(graph);
        let distances = explorer.explore_with_distances("a", 5);

        assert_eq!(distances["a"], 0);
        assert_eq!(distances["b"], 1);
        assert_eq!(distances["d"], 1);
        assert_eq!(distances["c"], 2);
    }
}
