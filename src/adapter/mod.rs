//! Schema sources.
//!
//! An adapter lists table names and returns the metadata of one table at a
//! time. [`load_schema`] drives any adapter and assembles a [`Schema`].

pub mod dump;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use self::mysql::{MysqlAdapter, MysqlOptions};
pub use self::postgres::{PostgresAdapter, PostgresOptions};
pub use dump::{Compression, DumpAdapter};
pub use sqlite::SqliteAdapter;

use crate::schema::{Schema, Table};
use anyhow::{Context, Result};
use tracing::debug;

/// Read access to a database's structural metadata
pub trait Adapter {
    /// All table names, in the order tables should be rendered
    fn table_names(&mut self) -> Result<Vec<String>>;

    /// Columns, foreign keys and indexes of one table
    fn table(&mut self, name: &str) -> Result<Table>;
}

/// Load every table of the adapter into a schema.
///
/// The first failing query aborts the load; a partial schema is never returned.
pub fn load_schema<A: Adapter + ?Sized>(adapter: &mut A) -> Result<Schema> {
    let names = adapter.table_names().context("failed to list tables")?;

    let mut tables = Vec::with_capacity(names.len());
    for name in &names {
        let table = adapter
            .table(name)
            .with_context(|| format!("failed to load table {}", name))?;
        debug!(
            table = %name,
            columns = table.columns.len(),
            foreign_keys = table.foreign_keys.len(),
            indexes = table.indexes.len(),
            "loaded table"
        );
        tables.push(table);
    }

    Ok(Schema::new(tables))
}
