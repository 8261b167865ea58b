//! Schema model for ERD generation.
//!
//! This module provides:
//! - Data models for tables, columns, foreign keys and indexes
//! - An undirected relationship graph built from foreign keys
//! - Distance-bounded exploration of that graph
//! - Subsetting and regex filtering that share tables with the source schema

mod explorer;
mod graph;

pub use explorer::SchemaExplorer;
pub use graph::RelationshipGraph;

use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Database-native type text, rendered as is
    pub col_type: String,
    /// Whether the column rejects NULL values
    pub not_null: bool,
    /// Whether this column is part of the primary key
    pub primary_key: bool,
}

impl Column {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
            not_null: false,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Foreign key reference from one column of a table.
///
/// Composite keys are stored as one entry per column pair; `sequence` holds the
/// position of the pair inside the constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKey {
    /// Column in the owning table
    pub from_column: String,
    /// Referenced table (may be absent from the schema)
    pub to_table: String,
    /// Referenced column
    pub to_column: String,
    /// Position within a composite key
    pub sequence: u32,
}

impl ForeignKey {
    pub fn new(
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
            sequence: 0,
        }
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }
}

/// Index definition (primary-key-backed indexes are never stored here)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    /// Index name
    pub name: String,
    /// Columns in key order
    pub columns: Vec<String>,
    /// Whether this is a unique index
    pub unique: bool,
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, columns: I, unique: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique,
        }
    }
}

/// Table metadata as extracted by an adapter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Table name, possibly `schema.table`
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<Column>,
    /// Foreign keys in adapter order
    pub foreign_keys: Vec<ForeignKey>,
    /// Secondary indexes in adapter order
    pub indexes: Vec<Index>,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: Vec<ForeignKey>) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<Index>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Primary key columns, in declaration order
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Non-primary key columns, in declaration order
    pub fn non_primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    /// Check whether a column is the source of any foreign key
    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.from_column == column)
    }
}

/// Complete database schema.
///
/// Tables are reference counted so that subsets and filtered views share them
/// with the schema they were derived from.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Tables in adapter order
    pub tables: Vec<Arc<Table>>,
}

impl Schema {
    /// Create a schema owning the given tables
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables: tables.into_iter().map(Arc::new).collect(),
        }
    }

    /// Create a schema from already shared tables
    pub fn from_shared(tables: Vec<Arc<Table>>) -> Self {
        Self { tables }
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if schema is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterate over all tables
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.iter()
    }

    /// Get a table by exact name
    pub fn find_table(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Check whether a table with exactly this name exists
    pub fn contains_table(&self, name: &str) -> bool {
        self.find_table(name).is_some()
    }

    /// Table names within `distance` foreign-key hops of `table_name`, sorted
    pub fn surrounding_tables_within(&self, table_name: &str, distance: i64) -> Vec<String> {
        SchemaExplorer::new(self).explore(table_name, distance)
    }

    /// Build the schema of every table within `distance` hops of `table_name`.
    ///
    /// Tables come out in name order. Names without a table (an unknown start
    /// table, or a foreign key to a table that was not introspected) are dropped.
    pub fn subset(&self, table_name: &str, distance: i64) -> Schema {
        let names = self.surrounding_tables_within(table_name, distance);
        let tables: Vec<Arc<Table>> = names
            .iter()
            .filter_map(|name| self.find_table(name).cloned())
            .collect();

        debug!(
            table = table_name,
            distance,
            reachable = names.len(),
            kept = tables.len(),
            "built schema subset"
        );

        Schema::from_shared(tables)
    }

    /// Drop every table whose name matches `pattern` anywhere
    pub fn exclude_matching(&self, pattern: &Regex) -> Schema {
        let tables: Vec<Arc<Table>> = self
            .tables
            .iter()
            .filter(|t| !pattern.is_match(&t.name))
            .cloned()
            .collect();

        debug!(
            pattern = pattern.as_str(),
            skipped = self.tables.len() - tables.len(),
            "filtered tables"
        );

        Schema::from_shared(tables)
    }
}
