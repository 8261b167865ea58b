//! PlantUML entity notation.

use super::{relationships, Relationship};
use crate::schema::{Column, Index, Schema, Table};

/// Render a whole schema: entity blocks, then `from }-- to` relationship lines,
/// every item separated by a blank line.
pub fn to_plant_uml(schema: &Schema, show_index: bool) -> String {
    plant_uml_document(schema, &relationships(schema), show_index)
}

pub(crate) fn plant_uml_document(
    schema: &Schema,
    edges: &[Relationship<'_>],
    show_index: bool,
) -> String {
    let mut blocks: Vec<String> = schema
        .iter()
        .map(|table| table_to_plant_uml(table, show_index))
        .collect();

    for edge in edges {
        blocks.push(format!("{} }}-- {}", edge.from_table, edge.to_table));
    }

    blocks.join("\n\n")
}

/// Render one `entity` block.
///
/// Primary key columns, other columns and indexes form up to three sections;
/// `--` separates the non-empty ones.
pub fn table_to_plant_uml(table: &Table, show_index: bool) -> String {
    let mut sections: Vec<Vec<String>> = Vec::with_capacity(3);

    let pk_lines: Vec<String> = table.primary_key_columns().map(column_to_plant_uml).collect();
    if !pk_lines.is_empty() {
        sections.push(pk_lines);
    }

    let column_lines: Vec<String> = table
        .non_primary_key_columns()
        .map(column_to_plant_uml)
        .collect();
    if !column_lines.is_empty() {
        sections.push(column_lines);
    }

    if show_index && !table.indexes.is_empty() {
        sections.push(table.indexes.iter().map(index_to_plant_uml).collect());
    }

    let body = sections
        .iter()
        .map(|lines| {
            lines
                .iter()
                .map(|line| format!("  {}", line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n  --\n");

    format!("entity {} {{\n{}\n}}", table.name, body)
}

/// `* name : type` for required columns, `name : type` otherwise
pub fn column_to_plant_uml(column: &Column) -> String {
    if column.not_null {
        format!("* {} : {}", column.name, column.col_type)
    } else {
        format!("{} : {}", column.name, column.col_type)
    }
}

/// `- name (a, b)` for unique indexes, `name (a, b)` otherwise
pub fn index_to_plant_uml(index: &Index) -> String {
    let columns = index.columns.join(", ");
    if index.unique {
        format!("- {} ({})", index.name, columns)
    } else {
        format!("{} ({})", index.name, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lines() {
        let required = Column::new("id", "integer").not_null();
        let optional = Column::new("title", "text");

        assert_eq!(column_to_plant_uml(&required), "* id : integer");
        assert_eq!(column_to_plant_uml(&optional), "title : text");
    }

    #[test]
    fn test_index_lines() {
        let unique = Index::new("index_a_b", ["a", "b"], true);
        let plain = Index::new("index_b", ["b"], false);

        assert_eq!(index_to_plant_uml(&unique), "- index_a_b (a, b)");
        assert_eq!(index_to_plant_uml(&plain), "index_b (b)");
    }

    #[test]
    fn test_table_without_primary_key() {
        let table = Table::new("articles").with_columns(vec![
            Column::new("id", "integer").not_null(),
            Column::new("user_id", "integer").not_null(),
            Column::new("title", "text"),
        ]);

        assert_eq!(
            table_to_plant_uml(&table, true),
            "entity articles {\n  * id : integer\n  * user_id : integer\n  title : text\n}"
        );
    }

    #[test]
    fn test_table_with_only_primary_key() {
        let table = Table::new("tags")
            .with_columns(vec![Column::new("id", "integer").not_null().primary_key()]);

        assert_eq!(
            table_to_plant_uml(&table, true),
            "entity tags {\n  * id : integer\n}"
        );
    }

    #[test]
    fn test_index_section_follows_pk_when_no_other_columns() {
        let table = Table::new("tags")
            .with_columns(vec![Column::new("id", "integer").not_null().primary_key()])
            .with_indexes(vec![Index::new("index_tags_id", ["id"], false)]);

        assert_eq!(
            table_to_plant_uml(&table, true),
            "entity tags {\n  * id : integer\n  --\n  index_tags_id (id)\n}"
        );
    }
}
