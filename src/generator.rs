//! ERD generation pipeline: validate, filter, subset, render, write.

use crate::error::ErdError;
use crate::render::{self, OutputFormat, RenderOptions};
use crate::schema::Schema;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings for one ERD generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Output file (stdout when None)
    pub output: Option<PathBuf>,
    /// Only show tables surrounding this table
    pub table: Option<String>,
    /// Foreign key hops from `table`; 0 or less renders the whole schema
    pub distance: i64,
    /// Omit index sections (plant_uml only)
    pub skip_index: bool,
    /// Skip tables whose name matches this regex
    pub skip_table: Option<String>,
    /// Notation name: `plant_uml` (also the empty string) or `mermaid`
    pub format: String,
    /// Print key markers and comments (mermaid only)
    pub show_comment: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output: None,
            table: None,
            distance: 0,
            skip_index: false,
            skip_table: None,
            format: OutputFormat::default().to_string(),
            show_comment: true,
        }
    }
}

/// Counts describing a rendered ERD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErdStats {
    pub tables: usize,
    pub columns: usize,
    pub relationships: usize,
}

/// A rendered diagram that has not been written anywhere yet
#[derive(Debug, Clone)]
pub struct RenderedErd {
    pub content: String,
    pub format: OutputFormat,
    pub stats: ErdStats,
}

pub struct ErdGenerator {
    config: GeneratorConfig,
}

impl ErdGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.config.output = Some(output);
        self
    }

    pub fn with_table(mut self, table: impl Into<String>, distance: i64) -> Self {
        self.config.table = Some(table.into());
        self.config.distance = distance;
        self
    }

    pub fn with_skip_index(mut self, skip_index: bool) -> Self {
        self.config.skip_index = skip_index;
        self
    }

    pub fn with_skip_table(mut self, pattern: impl Into<String>) -> Self {
        self.config.skip_table = Some(pattern.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    pub fn with_show_comment(mut self, show_comment: bool) -> Self {
        self.config.show_comment = show_comment;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render the schema and write it to the configured output.
    ///
    /// Nothing is written unless the whole diagram rendered successfully.
    pub fn run(&self, schema: &Schema) -> Result<ErdStats> {
        let erd = self.generate(schema)?;
        self.output(&erd.content)?;
        Ok(erd.stats)
    }

    /// Render the schema and write it to `writer` instead of the configured output
    pub fn run_to_writer<W: Write>(&self, schema: &Schema, writer: &mut W) -> Result<ErdStats> {
        let erd = self.generate(schema)?;
        writer
            .write_all(erd.content.as_bytes())
            .context("failed to write ERD")?;
        writer.flush().context("failed to write ERD")?;
        Ok(erd.stats)
    }

    /// Render the schema without writing it
    pub fn generate(&self, schema: &Schema) -> Result<RenderedErd, ErdError> {
        self.check_focus_table(schema)?;

        let filtered;
        let schema = match self.skip_pattern()? {
            Some(pattern) => {
                filtered = schema.exclude_matching(&pattern);
                &filtered
            }
            None => schema,
        };

        let format: OutputFormat = self.config.format.parse()?;
        let options = RenderOptions {
            show_index: !self.config.skip_index,
            show_comment: self.config.show_comment,
        };

        let subset;
        let target = match self.focus_table() {
            Some(table) if self.config.distance > 0 => {
                subset = schema.subset(table, self.config.distance);
                &subset
            }
            _ => schema,
        };

        let edges = render::relationships(target);
        let content = render::render_edges(target, &edges, format, options);
        let stats = ErdStats {
            tables: target.len(),
            columns: target.iter().map(|t| t.columns.len()).sum(),
            relationships: edges.len(),
        };

        info!(
            format = %format,
            tables = stats.tables,
            relationships = stats.relationships,
            "rendered ERD"
        );

        Ok(RenderedErd {
            content,
            format,
            stats,
        })
    }

    fn focus_table(&self) -> Option<&str> {
        self.config.table.as_deref().filter(|t| !t.is_empty())
    }

    fn check_focus_table(&self, schema: &Schema) -> Result<(), ErdError> {
        match self.focus_table() {
            Some(table) if !schema.contains_table(table) => {
                Err(ErdError::FocusTableNotFound(table.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn skip_pattern(&self) -> Result<Option<Regex>, ErdError> {
        let Some(pattern) = self.config.skip_table.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };

        Regex::new(pattern)
            .map(Some)
            .map_err(|source| ErdError::InvalidSkipPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    fn output(&self, content: &str) -> Result<()> {
        match &self.config.output {
            Some(path) => {
                fs::write(path, content)
                    .with_context(|| format!("failed to write ERD to {}", path.display()))?;
                debug!(path = %path.display(), bytes = content.len(), "wrote ERD file");
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(content.as_bytes())
                    .context("failed to write ERD to stdout")?;
                stdout.flush().context("failed to write ERD to stdout")?;
            }
        }
        Ok(())
    }
}
