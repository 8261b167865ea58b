//! Schema source reading the DDL of a SQL dump file.
//!
//! Only CREATE TABLE, ALTER TABLE and CREATE INDEX statements are used; data
//! statements are read past. Compressed dumps (gzip, bzip2, xz, zstd) are
//! decompressed on the fly based on the file extension.

mod ddl;
mod reader;

pub use ddl::DdlSchemaBuilder;
pub use reader::{statement_type, StatementReader, StatementType};

use super::Adapter;
use crate::progress::ProgressReader;
use crate::schema::Table;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the matching decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(
                zstd::stream::read::Decoder::new(reader)
                    .context("failed to initialize zstd decoder")?,
            ),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// Tables parsed from a dump, served in CREATE TABLE order
#[derive(Debug)]
pub struct DumpAdapter {
    tables: Vec<Table>,
}

impl DumpAdapter {
    /// Parse a dump file
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_progress(path, None::<fn(u64)>)
    }

    /// Parse a dump file, reporting raw bytes read to `progress`
    pub fn open_with_progress<F>(path: &Path, progress: Option<F>) -> Result<Self>
    where
        F: FnMut(u64) + 'static,
    {
        let file = File::open(path)
            .with_context(|| format!("failed to open dump file {}", path.display()))?;
        let compression = Compression::from_path(path);
        debug!(file = %path.display(), %compression, "reading dump");

        let raw: Box<dyn Read> = match progress {
            Some(cb) => Box::new(ProgressReader::new(file, cb)),
            None => Box::new(file),
        };
        let reader = compression.wrap_reader(raw)?;

        Self::from_reader(reader).with_context(|| format!("failed to read {}", path.display()))
    }

    /// Parse uncompressed SQL from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut statements = StatementReader::new(reader);
        let mut builder = DdlSchemaBuilder::new();
        let mut count = 0usize;

        while let Some(stmt) = statements.read_statement()? {
            count += 1;
            match statement_type(&stmt) {
                StatementType::CreateTable => {
                    builder.parse_create_table(&stmt);
                }
                StatementType::AlterTable => {
                    builder.parse_alter_table(&stmt);
                }
                StatementType::CreateIndex => {
                    builder.parse_create_index(&stmt);
                }
                StatementType::Unknown => trace!("skipping non-DDL statement"),
            }
        }

        let tables = builder.build();
        debug!(statements = count, tables = tables.len(), "parsed dump");
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

impl Adapter for DumpAdapter {
    fn table_names(&mut self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn table(&mut self, name: &str) -> Result<Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .with_context(|| format!("table {} not found in dump", name))
    }
}
