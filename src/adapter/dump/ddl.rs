//! DDL parsing for schema extraction from dump files.
//!
//! Parses CREATE TABLE, ALTER TABLE and CREATE INDEX statements to extract:
//! - Column definitions with their declared types
//! - Primary key constraints (inline, table-level and added by ALTER TABLE)
//! - Foreign key constraints (table-level, inline REFERENCES, ALTER TABLE)
//! - Secondary indexes (inline INDEX/KEY, UNIQUE constraints and CREATE INDEX)

use crate::schema::{Column, ForeignKey, Index, Table};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex to extract table name from CREATE TABLE
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), table (SQLite/unquoted), schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)CREATE\s+(?:\w+\s+)*?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?"#)
        .unwrap()
});

/// Regex to extract table name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s]+)[\]`"]?"#).unwrap()
});

/// Regex for column definition: name, then an optional type with its
/// arguments and multi-word suffixes (`unsigned`, `varying(n)`, `with time zone`, ...)
static COLUMN_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*[\[`"]?([^\[\]`"\s,()]+)[\]`"]?(?:\s+(?i)(\w+(?:\s*\([^)]*\))?(?:\s+(?:unsigned|zerofill|precision|varying(?:\s*\([^)]*\))?|with(?:out)?\s+time\s+zone))*(?:\[\])?))?"#,
    )
    .unwrap()
});

/// Words that open a column constraint, so a column starting with one has no type
const CONSTRAINT_WORDS: &[&str] = &[
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "REFERENCES",
    "DEFAULT",
    "CHECK",
    "CONSTRAINT",
    "COLLATE",
    "GENERATED",
    "AS",
    "AUTOINCREMENT",
];

/// Table-level constraint at the start of a CREATE TABLE body item
static TABLE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:CONSTRAINT\s|PRIMARY\s+KEY\b|FOREIGN\s+KEY\b|CHECK\s*\(|EXCLUDE\b)")
        .unwrap()
});

/// Index definition keyword at the start of a CREATE TABLE body item
static INDEX_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:UNIQUE|FULLTEXT|SPATIAL|INDEX|KEY)\b").unwrap());

/// Regex for UNIQUE constraints, either leading a table body item or added by
/// ALTER TABLE: `[CONSTRAINT name] UNIQUE [KEY|INDEX] [name] (cols)`
static UNIQUE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:^|\bADD\s+)(?:CONSTRAINT\s+[\[`"]?(\w+)[\]`"]?\s+)?UNIQUE(?:\s+(?:KEY|INDEX))?(?:\s+[\[`"]?(\w+)[\]`"]?)?\s*(?:NULLS\s+(?:NOT\s+)?DISTINCT\s*)?\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Regex for PRIMARY KEY constraint
/// Supports MSSQL CLUSTERED/NONCLUSTERED keywords: PRIMARY KEY CLUSTERED ([col])
static PRIMARY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]+)\)").unwrap()
});

/// Regex for inline PRIMARY KEY on column
static INLINE_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// Regex for FOREIGN KEY constraint with optional constraint name
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Regex for an inline `REFERENCES table [(column)]` on a column definition
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bREFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(,]+)[\]`"]?\s*(?:\(([^)]+)\))?"#,
    )
    .unwrap()
});

/// Regex to detect NOT NULL constraint
static NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());

/// Regex for inline INDEX/KEY in CREATE TABLE
/// Matches: INDEX idx_name (col1, col2), KEY idx_name (col1), UNIQUE INDEX idx_name (col1),
/// FULLTEXT KEY idx_name (col1)
static INLINE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(?:(?:(UNIQUE)|FULLTEXT|SPATIAL)\s+)?(?:INDEX|KEY)\s+[\[`"]?(\w+)[\]`"]?\s*(?:USING\s+\w+\s*)?\(([^)]+)\)"#)
        .unwrap()
});

/// Regex for CREATE INDEX statement
/// Matches: CREATE [UNIQUE] [CLUSTERED|NONCLUSTERED] INDEX [CONCURRENTLY] [IF NOT EXISTS] idx_name ON [ONLY] table [USING method] (columns)
static CREATE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)CREATE\s+(UNIQUE\s+)?(?:CLUSTERED\s+|NONCLUSTERED\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)?[\[`"]?(\w+)[\]`"]?\s+ON\s+(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?(\w+)[\]`"]?\s*(?:USING\s+\w+\s*)?\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Builder collecting tables from DDL statements in statement order
#[derive(Debug, Default)]
pub struct DdlSchemaBuilder {
    tables: Vec<Table>,
    /// Lowercased table name to position in `tables`
    lookup: AHashMap<String, usize>,
}

impl DdlSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CREATE TABLE statement and add the table.
    ///
    /// A second CREATE TABLE for a known name is ignored.
    pub fn parse_create_table(&mut self, stmt: &str) -> Option<usize> {
        let table_name = extract_create_table_name(stmt)?;

        if let Some(pos) = self.position(&table_name) {
            return Some(pos);
        }

        let body = extract_table_body(stmt)?;
        let mut table = Table::new(table_name);
        parse_table_body(body, &mut table);

        let pos = self.tables.len();
        self.lookup.insert(table.name.to_lowercase(), pos);
        self.tables.push(table);
        Some(pos)
    }

    /// Parse an ALTER TABLE statement, applying added keys to a known table
    pub fn parse_alter_table(&mut self, stmt: &str) -> Option<usize> {
        let table_name = extract_alter_table_name(stmt)?;
        let pos = self.position(&table_name)?;
        let table = &mut self.tables[pos];

        if let Some(pk_cols) = parse_primary_key_constraint(stmt) {
            mark_primary_key(table, &pk_cols);
        }
        table.foreign_keys.extend(parse_foreign_keys(stmt));
        let uniques = parse_unique_constraints(&table.name, stmt);
        table.indexes.extend(uniques);

        Some(pos)
    }

    /// Parse a CREATE INDEX statement and add the index to its table
    pub fn parse_create_index(&mut self, stmt: &str) -> Option<usize> {
        let caps = CREATE_INDEX_RE.captures(stmt)?;

        let unique = caps.get(1).is_some();
        let name = caps.get(2)?.as_str().to_string();
        let table_name = caps.get(3)?.as_str();
        let columns = parse_column_list(caps.get(4)?.as_str());

        let pos = self.position(table_name)?;
        self.tables[pos].indexes.push(Index {
            name,
            columns,
            unique,
        });

        Some(pos)
    }

    pub fn build(self) -> Vec<Table> {
        self.tables
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.lookup.get(&name.to_lowercase()).copied()
    }
}

/// Extract table name from CREATE TABLE statement
pub fn extract_create_table_name(stmt: &str) -> Option<String> {
    CREATE_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract table name from ALTER TABLE statement
pub fn extract_alter_table_name(stmt: &str) -> Option<String> {
    ALTER_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Tracks quoting while walking DDL text byte by byte.
///
/// Single-quoted strings honour backslash escapes. Double quotes, backticks
/// and brackets quote identifiers, so a `,` or `)` inside `"a,b"` is data.
#[derive(Debug, Default)]
struct QuoteTracker {
    /// Byte that closes the open quote
    closing: Option<u8>,
    escaped: bool,
}

impl QuoteTracker {
    /// Feed one byte, returning true when it sits outside any quote
    fn is_code(&mut self, b: u8) -> bool {
        if let Some(closing) = self.closing {
            if self.escaped {
                self.escaped = false;
            } else if b == b'\\' && closing == b'\'' {
                self.escaped = true;
            } else if b == closing {
                self.closing = None;
            }
            return false;
        }

        self.closing = match b {
            b'\'' | b'"' | b'`' => Some(b),
            b'[' => Some(b']'),
            _ => return true,
        };
        false
    }
}

/// Body of a CREATE TABLE statement, between the first `(` and its match
fn extract_table_body(stmt: &str) -> Option<&str> {
    let mut quotes = QuoteTracker::default();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, b) in stmt.bytes().enumerate() {
        if !quotes.is_code(b) {
            continue;
        }
        match b {
            b'(' => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(&stmt[start..i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the body of a CREATE TABLE to extract columns and constraints
fn parse_table_body(body: &str, table: &mut Table) {
    for part in split_table_body(body) {
        if TABLE_CONSTRAINT_RE.is_match(part) {
            if let Some(pk_cols) = parse_primary_key_constraint(part) {
                mark_primary_key(table, &pk_cols);
            }
            table.foreign_keys.extend(parse_foreign_keys(part));
            let uniques = parse_unique_constraints(&table.name, part);
            table.indexes.extend(uniques);
            continue;
        }

        if INDEX_KEYWORD_RE.is_match(part) {
            let index = parse_inline_index(part)
                .or_else(|| parse_unique_constraints(&table.name, part).into_iter().next());
            if let Some(index) = index {
                table.indexes.push(index);
                continue;
            }
            // An unquoted column called `key` or `index` reads as a column
            if !is_column_named_keyword(part) {
                continue;
            }
        }

        if let Some(col) = parse_column_def(part) {
            if let Some(fk) = parse_inline_reference(&col.name, part) {
                table.foreign_keys.push(fk);
            }
            table.columns.push(col);
        }
    }
}

fn is_column_named_keyword(part: &str) -> bool {
    let first = part.split_whitespace().next().unwrap_or_default();
    first.eq_ignore_ascii_case("key") || first.eq_ignore_ascii_case("index")
}

/// Split a table body on top-level commas, skipping quoted text and
/// parenthesized arguments. Items come back trimmed and non-empty.
pub fn split_table_body(body: &str) -> Vec<&str> {
    let mut quotes = QuoteTracker::default();
    let mut depth = 0usize;
    let mut start = 0;
    let mut parts = Vec::new();

    for (i, b) in body.bytes().enumerate() {
        if !quotes.is_code(b) {
            continue;
        }
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(body[start..].trim());

    parts.retain(|p| !p.is_empty());
    parts
}

/// Parse a column definition; inline PRIMARY KEY implies NOT NULL
fn parse_column_def(def: &str) -> Option<Column> {
    let caps = COLUMN_DEF_RE.captures(def)?;
    let name = caps.get(1)?.as_str().to_string();
    let col_type = caps
        .get(2)
        .map(|m| m.as_str())
        .filter(|ty| !starts_with_constraint_word(ty))
        .map(normalize_whitespace)
        .unwrap_or_default();

    let primary_key = INLINE_PRIMARY_KEY_RE.is_match(def);
    let not_null = primary_key || NOT_NULL_RE.is_match(def);

    Some(Column {
        name,
        col_type,
        not_null,
        primary_key,
    })
}

fn starts_with_constraint_word(ty: &str) -> bool {
    let word = ty
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .next()
        .unwrap_or_default();
    CONSTRAINT_WORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(word))
}

/// Parse PRIMARY KEY constraint, returns column names
fn parse_primary_key_constraint(constraint: &str) -> Option<Vec<String>> {
    let caps = PRIMARY_KEY_RE.captures(constraint)?;
    let cols_str = caps.get(1)?.as_str();
    Some(parse_column_list(cols_str))
}

fn mark_primary_key(table: &mut Table, pk_cols: &[String]) {
    for col_name in pk_cols {
        if let Some(col) = table
            .columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(col_name))
        {
            col.primary_key = true;
            col.not_null = true;
        }
    }
}

/// Parse inline INDEX/KEY constraint from CREATE TABLE body
fn parse_inline_index(constraint: &str) -> Option<Index> {
    let caps = INLINE_INDEX_RE.captures(constraint)?;

    let unique = caps.get(1).is_some();
    let name = caps.get(2)?.as_str().to_string();
    let columns = parse_column_list(caps.get(3)?.as_str());

    // `key varchar(10)` is a column, not an index on column `10`
    if columns
        .iter()
        .all(|c| c.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    Some(Index {
        name,
        columns,
        unique,
    })
}

/// Parse UNIQUE constraints into unique indexes. Unnamed constraints get
/// the `<table>_<columns>_key` name PostgreSQL would give them.
fn parse_unique_constraints(table: &str, stmt: &str) -> Vec<Index> {
    UNIQUE_CONSTRAINT_RE
        .captures_iter(stmt)
        .filter_map(|caps| {
            let columns = parse_column_list(caps.get(3)?.as_str());
            if columns.is_empty() {
                return None;
            }
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| format!("{}_{}_key", table, columns.join("_")));

            Some(Index {
                name,
                columns,
                unique: true,
            })
        })
        .collect()
}

/// Parse FOREIGN KEY constraints, one entry per column pair
fn parse_foreign_keys(stmt: &str) -> Vec<ForeignKey> {
    let mut fks = Vec::new();

    for caps in FOREIGN_KEY_RE.captures_iter(stmt) {
        let local_cols = caps
            .get(1)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();
        let ref_table = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let ref_cols = caps
            .get(3)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();

        if ref_table.is_empty() {
            continue;
        }

        for (seq, (from, to)) in local_cols.iter().zip(ref_cols.iter()).enumerate() {
            fks.push(ForeignKey {
                from_column: from.clone(),
                to_table: ref_table.to_string(),
                to_column: to.clone(),
                sequence: seq as u32,
            });
        }
    }

    fks
}

/// `col INT REFERENCES users(id)`; without a column list the target is `id`
fn parse_inline_reference(column: &str, def: &str) -> Option<ForeignKey> {
    let caps = INLINE_REFERENCES_RE.captures(def)?;
    let to_table = caps.get(1)?.as_str();
    let to_column = caps
        .get(2)
        .and_then(|m| parse_column_list(m.as_str()).into_iter().next())
        .unwrap_or_else(|| "id".to_string());

    Some(ForeignKey::new(column, to_table, to_column))
}

/// Parse a comma-separated column list, stripping quotes (backticks, double quotes, brackets)
/// and MySQL prefix lengths / sort orders
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| {
            let c = c.trim();
            let c = c.split_whitespace().next().unwrap_or(c);
            let c = c.split('(').next().unwrap_or(c);
            c.trim_matches('`')
                .trim_matches('"')
                .trim_matches('[')
                .trim_matches(']')
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
