//! Text notations for ERD output.

pub mod mermaid;
pub mod plant_uml;

pub use mermaid::to_mermaid;
pub use plant_uml::to_plant_uml;

use crate::error::ErdError;
use crate::schema::Schema;
use ahash::AHashSet;
use std::fmt;
use std::str::FromStr;

/// Output notation for the ERD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// PlantUML entity blocks
    #[default]
    PlantUml,
    /// Mermaid erDiagram
    Mermaid,
}

impl FromStr for OutputFormat {
    type Err = ErdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "plant_uml" => Ok(OutputFormat::PlantUml),
            "mermaid" => Ok(OutputFormat::Mermaid),
            _ => Err(ErdError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::PlantUml => write!(f, "plant_uml"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
        }
    }
}

/// Switches threaded through the renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print index sections (plant_uml only)
    pub show_index: bool,
    /// Print key markers and "not null" comments (mermaid only)
    pub show_comment: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_index: true,
            show_comment: true,
        }
    }
}

/// Render a schema in the given notation
pub fn render(schema: &Schema, format: OutputFormat, options: RenderOptions) -> String {
    render_edges(schema, &relationships(schema), format, options)
}

/// Render with relationship edges the caller already collected
pub(crate) fn render_edges(
    schema: &Schema,
    edges: &[Relationship<'_>],
    format: OutputFormat,
    options: RenderOptions,
) -> String {
    match format {
        OutputFormat::PlantUml => plant_uml::plant_uml_document(schema, edges, options.show_index),
        OutputFormat::Mermaid => mermaid::mermaid_document(schema, edges, options.show_comment),
    }
}

/// A foreign key edge that points at a table of the same schema
pub(crate) struct Relationship<'a> {
    pub from_table: &'a str,
    /// Lowercased referenced table name
    pub to_table: String,
}

/// Foreign key edges of the schema, dangling references dropped.
///
/// Targets are matched case-insensitively and come out lowercased.
pub(crate) fn relationships(schema: &Schema) -> Vec<Relationship<'_>> {
    let table_names: AHashSet<String> = schema.iter().map(|t| t.name.to_lowercase()).collect();

    schema
        .iter()
        .flat_map(|table| table.foreign_keys.iter().map(move |fk| (table, fk)))
        .filter_map(|(table, fk)| {
            let to_table = fk.to_table.to_lowercase();
            table_names.contains(&to_table).then(|| Relationship {
                from_table: table.name.as_str(),
                to_table,
            })
        })
        .collect()
}
