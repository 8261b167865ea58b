//! Unit tests for the PlantUML and Mermaid renderers.

use plant_erd::render::mermaid::{column_to_mermaid, table_to_mermaid, to_mermaid};
use plant_erd::render::plant_uml::{index_to_plant_uml, table_to_plant_uml, to_plant_uml};
use plant_erd::render::{render, OutputFormat, RenderOptions};
use plant_erd::schema::{Column, ForeignKey, Index, Schema, Table};

fn articles() -> Table {
    Table::new("articles")
        .with_columns(vec![
            Column::new("id", "integer").not_null().primary_key(),
            Column::new("user_id", "integer").not_null(),
        ])
        .with_foreign_keys(vec![ForeignKey::new("user_id", "users", "id")])
        .with_indexes(vec![Index::new("index_user_id_on_articles", ["user_id"], false)])
}

fn users() -> Table {
    Table::new("users").with_columns(vec![
        Column::new("id", "integer").not_null().primary_key(),
        Column::new("name", "text"),
    ])
}

fn blog_schema() -> Schema {
    Schema::new(vec![articles(), users()])
}

#[test]
fn test_plant_uml_two_tables() {
    let expected = "\
entity articles {
  * id : integer
  --
  * user_id : integer
  --
  index_user_id_on_articles (user_id)
}

entity users {
  * id : integer
  --
  name : text
}

articles }-- users";

    assert_eq!(to_plant_uml(&blog_schema(), true), expected);
}

#[test]
fn test_plant_uml_without_indexes() {
    let expected = "\
entity articles {
  * id : integer
  --
  * user_id : integer
}";

    assert_eq!(table_to_plant_uml(&articles(), false), expected);
}

#[test]
fn test_plant_uml_table_without_primary_key() {
    let likes = Table::new("likes")
        .with_columns(vec![
            Column::new("article_id", "integer").not_null(),
            Column::new("user_id", "integer").not_null(),
        ])
        .with_indexes(vec![
            Index::new("index_user_id_on_likes", ["user_id"], false),
            Index::new("index_article_id_and_user_id_on_likes", ["article_id", "user_id"], true),
        ]);

    let expected = "\
entity likes {
  * article_id : integer
  * user_id : integer
  --
  index_user_id_on_likes (user_id)
  - index_article_id_and_user_id_on_likes (article_id, user_id)
}";

    assert_eq!(table_to_plant_uml(&likes, true), expected);
}

#[test]
fn test_plant_uml_primary_key_only() {
    let table = Table::new("tags").with_columns(vec![Column::new("name", "text")
        .not_null()
        .primary_key()]);

    assert_eq!(table_to_plant_uml(&table, true), "entity tags {\n  * name : text\n}");
}

#[test]
fn test_plant_uml_unique_index_marker() {
    let index = Index::new("index_slug", ["slug"], true);
    assert_eq!(index_to_plant_uml(&index), "- index_slug (slug)");
}

#[test]
fn test_relationship_target_is_lowercased() {
    let schema = Schema::new(vec![
        Table::new("articles").with_foreign_keys(vec![ForeignKey::new("user_id", "Users", "id")]),
        Table::new("Users"),
    ]);

    let out = to_plant_uml(&schema, true);
    assert!(out.ends_with("articles }-- users"), "got: {}", out);

    let out = to_mermaid(&schema, true);
    assert!(out.ends_with("users ||--o{ articles : owns"), "got: {}", out);
}

#[test]
fn test_dangling_foreign_keys_are_skipped() {
    let schema = Schema::new(vec![articles()]);

    assert!(!to_plant_uml(&schema, true).contains("}--"));
    assert!(!to_mermaid(&schema, true).contains("||--o{"));
}

#[test]
fn test_mermaid_two_tables() {
    let expected = "\
erDiagram

articles {
  integer id PK \"not null\"
  integer user_id FK \"not null\"
}

users {
  integer id PK \"not null\"
  text name
}

users ||--o{ articles : owns";

    assert_eq!(to_mermaid(&blog_schema(), true), expected);
}

#[test]
fn test_mermaid_without_comments() {
    let expected = "articles {\n  integer id\n  integer user_id\n}";
    assert_eq!(table_to_mermaid(&articles(), false), expected);
}

#[test]
fn test_mermaid_type_sanitization() {
    let column = Column::new("price", "integer(10) unsigned").not_null();
    assert_eq!(
        column_to_mermaid(&column, false, true),
        "integer_10_unsigned price \"not null\""
    );

    let column = Column::new("label", "character varying(255)");
    assert_eq!(column_to_mermaid(&column, true, true), "character_varying_255 label FK");
}

#[test]
fn test_mermaid_empty_schema() {
    assert_eq!(to_mermaid(&Schema::default(), true), "erDiagram");
    assert_eq!(to_plant_uml(&Schema::default(), true), "");
}

#[test]
fn test_render_dispatch() {
    let schema = blog_schema();
    let options = RenderOptions::default();

    assert_eq!(
        render(&schema, OutputFormat::PlantUml, options),
        to_plant_uml(&schema, true)
    );
    assert_eq!(
        render(&schema, OutputFormat::Mermaid, options),
        to_mermaid(&schema, true)
    );

    let options = RenderOptions {
        show_index: false,
        show_comment: false,
    };
    assert!(!render(&schema, OutputFormat::PlantUml, options).contains("index_user_id"));
    assert!(!render(&schema, OutputFormat::Mermaid, options).contains("PK"));
}
