//! Mermaid erDiagram format output.

use super::{relationships, Relationship};
use crate::schema::{Column, Schema, Table};

/// Generate a Mermaid erDiagram from a schema
pub fn to_mermaid(schema: &Schema, show_comment: bool) -> String {
    mermaid_document(schema, &relationships(schema), show_comment)
}

pub(crate) fn mermaid_document(
    schema: &Schema,
    edges: &[Relationship<'_>],
    show_comment: bool,
) -> String {
    let mut blocks = vec!["erDiagram".to_string()];

    for table in schema.iter() {
        blocks.push(table_to_mermaid(table, show_comment));
    }

    // The referenced table is the "one" side
    for edge in edges {
        blocks.push(format!(
            "{} ||--o{{ {} : owns",
            edge.to_table, edge.from_table
        ));
    }

    blocks.join("\n\n")
}

/// Render one entity block with two-space indented attributes
pub fn table_to_mermaid(table: &Table, show_comment: bool) -> String {
    let mut lines = Vec::with_capacity(table.columns.len() + 2);
    lines.push(format!("{} {{", table.name));

    for column in &table.columns {
        let is_foreign_key = table.is_foreign_key_column(&column.name);
        lines.push(format!(
            "  {}",
            column_to_mermaid(column, is_foreign_key, show_comment)
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

/// `type name [PK|FK] ["not null"]`; markers only when `show_comment` is set
pub fn column_to_mermaid(column: &Column, is_foreign_key: bool, show_comment: bool) -> String {
    let mut line = format!("{} {}", escape_mermaid_type(&column.col_type), column.name);

    if show_comment {
        if column.primary_key {
            line.push_str(" PK");
        } else if is_foreign_key {
            line.push_str(" FK");
        }

        if column.not_null {
            line.push_str(" \"not null\"");
        }
    }

    line
}

/// Mermaid cannot parse parentheses or spaces inside a type token
pub fn escape_mermaid_type(s: &str) -> String {
    s.replace('(', "_").replace(')', "").replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_mermaid_type() {
        assert_eq!(escape_mermaid_type("integer(10) unsigned"), "integer_10_unsigned");
        assert_eq!(escape_mermaid_type("varchar(255)"), "varchar_255");
        assert_eq!(escape_mermaid_type("decimal(10,2)"), "decimal_10,2");
        assert_eq!(escape_mermaid_type("text"), "text");
    }

    #[test]
    fn test_column_markers() {
        let pk = Column::new("id", "integer").not_null().primary_key();
        let fk = Column::new("user_id", "integer").not_null();
        let plain = Column::new("name", "text");

        assert_eq!(column_to_mermaid(&pk, false, true), "integer id PK \"not null\"");
        assert_eq!(column_to_mermaid(&fk, true, true), "integer user_id FK \"not null\"");
        assert_eq!(column_to_mermaid(&plain, false, true), "text name");
    }

    #[test]
    fn test_primary_key_wins_over_foreign_key() {
        let column = Column::new("user_id", "integer").primary_key();
        assert_eq!(column_to_mermaid(&column, true, true), "integer user_id PK");
    }

    #[test]
    fn test_comments_disabled() {
        let pk = Column::new("id", "integer").not_null().primary_key();
        assert_eq!(column_to_mermaid(&pk, false, false), "integer id");
    }

    #[test]
    fn test_table_block() {
        let table = Table::new("users").with_columns(vec![
            Column::new("id", "int(11)").not_null().primary_key(),
            Column::new("name", "varchar(255)"),
        ]);

        assert_eq!(
            table_to_mermaid(&table, true),
            "users {\n  int_11 id PK \"not null\"\n  varchar_255 name\n}"
        );
    }
}
