//! SQLite adapter reading the schema through PRAGMA table-valued functions.

use super::Adapter;
use crate::schema::{Column, ForeignKey, Index, Table};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Row of `pragma_table_info`
struct TableInfoRow {
    name: String,
    col_type: String,
    not_null: bool,
    /// 1-based position in the primary key, 0 when not part of it
    pk: i64,
}

/// Row of `pragma_foreign_key_list`
struct ForeignKeyRow {
    seq: u32,
    table: String,
    from: String,
    to: Option<String>,
}

/// Row of `pragma_index_list`
struct IndexListRow {
    name: String,
    unique: bool,
    /// `c` for CREATE INDEX, `u` for UNIQUE constraints, `pk` for primary keys
    origin: String,
}

pub struct SqliteAdapter {
    conn: Connection,
}

impl SqliteAdapter {
    /// Open a database file read-only
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("database file does not exist: {}", path.display());
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

        Ok(Self { conn })
    }

    /// Use an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn columns(&self, table: &str) -> Result<Vec<Column>> {
        let mut stmt = self
            .conn
            .prepare(r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1)"#)?;
        let rows = stmt
            .query_map(params![table], |row| {
                Ok(TableInfoRow {
                    name: row.get(0)?,
                    col_type: row.get(1)?,
                    not_null: row.get(2)?,
                    pk: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|row| Column {
                name: row.name,
                col_type: row.col_type,
                not_null: row.not_null,
                primary_key: row.pk != 0,
            })
            .collect())
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT seq, "table", "from", "to" FROM pragma_foreign_key_list(?1)"#,
        )?;
        let rows = stmt
            .query_map(params![table], |row| {
                Ok(ForeignKeyRow {
                    seq: row.get(0)?,
                    table: row.get(1)?,
                    from: row.get(2)?,
                    to: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|row| ForeignKey {
                from_column: row.from,
                to_table: row.table,
                // A missing target column refers to the parent's primary key
                to_column: row.to.unwrap_or_else(|| "id".to_string()),
                sequence: row.seq,
            })
            .collect())
    }

    fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        let mut stmt = self
            .conn
            .prepare(r#"SELECT name, "unique", origin FROM pragma_index_list(?1)"#)?;
        let rows = stmt
            .query_map(params![table], |row| {
                Ok(IndexListRow {
                    name: row.get(0)?,
                    unique: row.get(1)?,
                    origin: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut indexes = Vec::with_capacity(rows.len());
        for row in rows.into_iter().filter(|row| row.origin != "pk") {
            let columns = self.index_columns(&row.name)?;
            indexes.push(Index {
                name: row.name,
                columns,
                unique: row.unique,
            });
        }

        Ok(indexes)
    }

    fn index_columns(&self, index: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
        // Expression columns have no name
        let names = stmt
            .query_map(params![index], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names.into_iter().flatten().collect())
    }
}

impl Adapter for SqliteAdapter {
    fn table_names(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn table(&mut self, name: &str) -> Result<Table> {
        Ok(Table {
            name: name.to_string(),
            columns: self.columns(name)?,
            foreign_keys: self.foreign_keys(name)?,
            indexes: self.indexes(name)?,
        })
    }
}
