//! MySQL adapter reading `information_schema` for the connected database.

use super::Adapter;
use crate::schema::{Column, ForeignKey, Index, Table};
use anyhow::{Context, Result};
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const TABLES_SQL: &str = "\
SELECT table_name
FROM information_schema.tables
WHERE table_schema = database()
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT column_name, column_type, is_nullable, column_key
FROM information_schema.columns
WHERE table_schema = database() AND table_name = ?
ORDER BY ordinal_position";

const FOREIGN_KEYS_SQL: &str = "\
SELECT kcu.column_name, kcu.referenced_table_name, kcu.referenced_column_name, kcu.ordinal_position
FROM information_schema.referential_constraints rc
JOIN information_schema.key_column_usage kcu
  ON rc.constraint_schema = kcu.constraint_schema
 AND rc.constraint_name = kcu.constraint_name
 AND rc.table_name = kcu.table_name
WHERE kcu.table_schema = database() AND kcu.table_name = ?
ORDER BY rc.constraint_name, kcu.ordinal_position";

const INDEXES_SQL: &str = "\
SELECT index_name, non_unique, column_name
FROM information_schema.statistics
WHERE table_schema = database() AND table_name = ? AND index_name <> 'PRIMARY'
ORDER BY index_name, seq_in_index";

static COLLATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").unwrap());

/// Connection settings for [`MysqlAdapter::connect`]
#[derive(Debug, Clone)]
pub struct MysqlOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Connection collation, e.g. `utf8mb4_general_ci`
    pub collation: Option<String>,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
            database: String::new(),
            collation: None,
        }
    }
}

impl MysqlOptions {
    fn to_opts(&self) -> Result<OptsBuilder> {
        let mut init = Vec::new();
        if let Some(collation) = &self.collation {
            if !COLLATION_RE.is_match(collation) {
                anyhow::bail!("invalid collation '{}'", collation);
            }
            init.push(format!("SET collation_connection = '{}'", collation));
        }

        Ok(OptsBuilder::new()
            .ip_or_hostname(Some(self.host.clone()))
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(self.password.clone())
            .db_name(Some(self.database.clone()))
            .init(init))
    }
}

/// Row of `information_schema.columns`
struct ColumnRow {
    name: String,
    column_type: String,
    /// `YES` or `NO`
    is_nullable: String,
    /// `PRI`, `UNI`, `MUL` or empty
    column_key: String,
}

/// One column pair of a foreign key constraint
struct ForeignKeyRow {
    column: String,
    to_table: String,
    to_column: String,
    /// 1-based position within the constraint
    ordinal_position: u32,
}

/// One column of an index from `information_schema.statistics`
struct IndexRow {
    name: String,
    non_unique: i64,
    /// NULL for functional key parts
    column: Option<String>,
}

pub struct MysqlAdapter {
    conn: Conn,
}

impl MysqlAdapter {
    pub fn connect(options: &MysqlOptions) -> Result<Self> {
        let conn = Conn::new(options.to_opts()?).with_context(|| {
            format!(
                "failed to connect to MySQL at {}:{}",
                options.host, options.port
            )
        })?;
        debug!(database = %options.database, "connected to MySQL");

        Ok(Self { conn })
    }

    fn columns(&mut self, table: &str) -> Result<Vec<Column>> {
        let rows = self.conn.exec_map(
            COLUMNS_SQL,
            (table,),
            |(name, column_type, is_nullable, column_key): (String, String, String, String)| {
                ColumnRow {
                    name,
                    column_type,
                    is_nullable,
                    column_key,
                }
            },
        )?;

        Ok(rows
            .into_iter()
            .map(|row| Column {
                name: row.name,
                col_type: row.column_type,
                not_null: row.is_nullable == "NO",
                primary_key: row.column_key == "PRI",
            })
            .collect())
    }

    fn foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>> {
        let rows = self.conn.exec_map(
            FOREIGN_KEYS_SQL,
            (table,),
            |(column, to_table, to_column, ordinal_position): (String, String, String, u32)| {
                ForeignKeyRow {
                    column,
                    to_table,
                    to_column,
                    ordinal_position,
                }
            },
        )?;

        let mut fks: Vec<ForeignKey> = rows
            .into_iter()
            .map(|row| ForeignKey {
                from_column: row.column,
                to_table: row.to_table,
                to_column: row.to_column,
                sequence: row.ordinal_position.saturating_sub(1),
            })
            .collect();
        fks.sort_by(|a, b| {
            (&a.from_column, &a.to_table, &a.to_column)
                .cmp(&(&b.from_column, &b.to_table, &b.to_column))
        });

        Ok(fks)
    }

    fn indexes(&mut self, table: &str) -> Result<Vec<Index>> {
        let rows = self.conn.exec_map(
            INDEXES_SQL,
            (table,),
            |(name, non_unique, column): (String, i64, Option<String>)| IndexRow {
                name,
                non_unique,
                column,
            },
        )?;

        Ok(group_index_rows(rows))
    }
}

impl Adapter for MysqlAdapter {
    fn table_names(&mut self) -> Result<Vec<String>> {
        let names = self.conn.query_map(TABLES_SQL, |name: String| name)?;
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

/// Fold consecutive rows of the same index into one [`Index`]
fn group_index_rows(rows: Vec<IndexRow>) -> Vec<Index> {
    let mut indexes: Vec<Index> = Vec::new();

    for row in rows {
        match indexes.last_mut() {
            Some(last) if last.name == row.name => last.columns.extend(row.column),
            _ => indexes.push(Index {
                name: row.name,
                columns: row.column.into_iter().collect(),
                unique: row.non_unique == 0,
            }),
        }
    }

    indexes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, non_unique: i64, column: Option<&str>) -> IndexRow {
        IndexRow {
            name: name.to_string(),
            non_unique,
            column: column.map(str::to_string),
        }
    }

    #[test]
    fn test_group_index_rows() {
        let indexes = group_index_rows(vec![
            row("index_article_id_and_user_id", 0, Some("article_id")),
            row("index_article_id_and_user_id", 0, Some("user_id")),
            row("index_lower_title", 1, None),
            row("index_user_id", 1, Some("user_id")),
        ]);

        assert_eq!(
            indexes,
            vec![
                Index::new(
                    "index_article_id_and_user_id",
                    ["article_id", "user_id"],
                    true
                ),
                Index::new("index_lower_title", Vec::<String>::new(), false),
                Index::new("index_user_id", ["user_id"], false),
            ]
        );
    }

    #[test]
    fn test_collation_is_validated() {
        let options = MysqlOptions {
            collation: Some("utf8'; DROP TABLE users; --".to_string()),
            ..Default::default()
        };
        assert!(options.to_opts().is_err());

        let options = MysqlOptions {
            collation: Some("utf8mb4_general_ci".to_string()),
            ..Default::default()
        };
        assert!(options.to_opts().is_ok());
    }
}
