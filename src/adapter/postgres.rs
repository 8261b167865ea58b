//! PostgreSQL adapter reading `information_schema` and the `pg_catalog` tables.
//!
//! Table names are schema-qualified (`public.users`) because every user
//! schema is listed. Catalog identifiers are cast to `text` in each query so
//! they decode as plain strings.

use super::Adapter;
use crate::schema::{Column, ForeignKey, Index, Table};
use anyhow::{Context, Result};
pub use postgres::config::SslMode;
use postgres::{Client, Config, NoTls, Row};
use tracing::debug;

const TABLES_SQL: &str = "\
SELECT schemaname::text, relname::text
FROM pg_stat_user_tables
ORDER BY schemaname, relname";

const COLUMNS_SQL: &str = "\
SELECT column_name::text, data_type::text, is_nullable::text
FROM information_schema.columns
WHERE table_catalog = current_database() AND table_schema = $1 AND table_name = $2
ORDER BY ordinal_position";

const PRIMARY_KEY_SQL: &str = "\
SELECT ccu.column_name::text
FROM information_schema.table_constraints tc
JOIN information_schema.constraint_column_usage ccu
  ON tc.constraint_schema = ccu.constraint_schema
 AND tc.constraint_name = ccu.constraint_name
WHERE tc.constraint_type = 'PRIMARY KEY'
  AND tc.table_catalog = current_database()
  AND tc.table_schema = $1
  AND tc.table_name = $2";

const FOREIGN_KEYS_SQL: &str = "\
SELECT t2.oid::regclass::text, a1.attname::text, a2.attname::text, (k.ord - 1)::int4
FROM pg_constraint c
JOIN pg_class t1 ON c.conrelid = t1.oid
JOIN pg_class t2 ON c.confrelid = t2.oid
JOIN pg_namespace n ON t1.relnamespace = n.oid
CROSS JOIN LATERAL unnest(c.conkey, c.confkey) WITH ORDINALITY AS k(from_attnum, to_attnum, ord)
JOIN pg_attribute a1 ON a1.attrelid = t1.oid AND a1.attnum = k.from_attnum
JOIN pg_attribute a2 ON a2.attrelid = t2.oid AND a2.attnum = k.to_attnum
WHERE c.contype = 'f' AND n.nspname = $1 AND t1.relname = $2
ORDER BY c.conname, k.ord";

const INDEXES_SQL: &str = "\
SELECT i.relname::text, d.indisunique,
       ARRAY(SELECT a.attname::text
             FROM unnest(d.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
             ORDER BY k.ord)
FROM pg_class t
JOIN pg_index d ON t.oid = d.indrelid
JOIN pg_class i ON d.indexrelid = i.oid
JOIN pg_namespace n ON t.relnamespace = n.oid
WHERE i.relkind = 'i' AND NOT d.indisprimary AND n.nspname = $1 AND t.relname = $2
ORDER BY i.relname";

/// Connection settings for [`PostgresAdapter::connect`]
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub ssl_mode: SslMode,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            database: "postgres".to_string(),
            ssl_mode: SslMode::Disable,
        }
    }
}

impl PostgresOptions {
    fn to_config(&self) -> Config {
        let mut config = Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.database)
            .ssl_mode(self.ssl_mode);
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

/// Row of `pg_stat_user_tables`
struct TableRow {
    schema: String,
    name: String,
}

impl TableRow {
    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            schema: row.try_get(0)?,
            name: row.try_get(1)?,
        })
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Row of `information_schema.columns`
struct ColumnRow {
    name: String,
    data_type: String,
    /// `YES` or `NO`
    is_nullable: String,
}

impl ColumnRow {
    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            name: row.try_get(0)?,
            data_type: row.try_get(1)?,
            is_nullable: row.try_get(2)?,
        })
    }
}

/// One column pair of a foreign key constraint
struct ForeignKeyRow {
    /// `regclass` text: schema-qualified unless the schema is on the search path
    to_table: String,
    column: String,
    primary_key: String,
    seq: i32,
}

impl ForeignKeyRow {
    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            to_table: row.try_get(0)?,
            column: row.try_get(1)?,
            primary_key: row.try_get(2)?,
            seq: row.try_get(3)?,
        })
    }
}

struct IndexRow {
    name: String,
    unique: bool,
    columns: Vec<String>,
}

impl IndexRow {
    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            name: row.try_get(0)?,
            unique: row.try_get(1)?,
            columns: row.try_get(2)?,
        })
    }
}

pub struct PostgresAdapter {
    client: Client,
}

impl PostgresAdapter {
    pub fn connect(options: &PostgresOptions) -> Result<Self> {
        let client = options.to_config().connect(NoTls).with_context(|| {
            format!(
                "failed to connect to PostgreSQL at {}:{}",
                options.host, options.port
            )
        })?;
        debug!(database = %options.database, "connected to PostgreSQL");

        Ok(Self { client })
    }

    fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<Column>> {
        let primary_keys: Vec<String> = self
            .client
            .query(PRIMARY_KEY_SQL, &[&schema, &table])?
            .iter()
            .map(|row| row.try_get(0))
            .collect::<Result<_, _>>()?;

        let rows = self
            .client
            .query(COLUMNS_SQL, &[&schema, &table])?
            .iter()
            .map(ColumnRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|row| Column {
                primary_key: primary_keys.contains(&row.name),
                not_null: row.is_nullable == "NO",
                name: row.name,
                col_type: row.data_type,
            })
            .collect())
    }

    fn foreign_keys(&mut self, schema: &str, table: &str) -> Result<Vec<ForeignKey>> {
        let rows = self
            .client
            .query(FOREIGN_KEYS_SQL, &[&schema, &table])?
            .iter()
            .map(ForeignKeyRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|row| ForeignKey {
                from_column: row.column,
                to_table: qualify_table_name(&row.to_table),
                to_column: row.primary_key,
                sequence: row.seq.max(0) as u32,
            })
            .collect())
    }

    fn indexes(&mut self, schema: &str, table: &str) -> Result<Vec<Index>> {
        let rows = self
            .client
            .query(INDEXES_SQL, &[&schema, &table])?
            .iter()
            .map(IndexRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|row| Index {
                name: row.name,
                columns: row.columns,
                unique: row.unique,
            })
            .collect())
    }
}

impl Adapter for PostgresAdapter {
    fn table_names(&mut self) -> Result<Vec<String>> {
        let rows = self
            .client
            .query(TABLES_SQL, &[])?
            .iter()
            .map(TableRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.iter().map(TableRow::qualified_name).collect())
    }

    fn table(&mut self, name: &str) -> Result<Table> {
        let (schema, table) = split_table_name(name);

        Ok(Table {
            name: name.to_string(),
            columns: self.columns(schema, table)?,
            foreign_keys: self.foreign_keys(schema, table)?,
            indexes: self.indexes(schema, table)?,
        })
    }
}

/// `schema.table` into its parts; a bare name lives in `public`
fn split_table_name(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or(("public", name))
}

/// Referenced tables on the search path come back unqualified
fn qualify_table_name(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("public.{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_table_name() {
        assert_eq!(split_table_name("sales.orders"), ("sales", "orders"));
        assert_eq!(split_table_name("users"), ("public", "users"));
    }

    #[test]
    fn test_qualify_table_name() {
        assert_eq!(qualify_table_name("users"), "public.users");
        assert_eq!(qualify_table_name("sales.orders"), "sales.orders");
    }

    #[test]
    fn test_default_options() {
        let options = PostgresOptions::default();
        assert_eq!(options.port, 5432);
        assert_eq!(options.user, "postgres");
        assert!(matches!(options.ssl_mode, SslMode::Disable));

        let config = options.to_config();
        assert_eq!(config.get_dbname(), Some("postgres"));
        assert_eq!(config.get_ports(), &[5432]);
    }
}
