//! Integration tests for the plant-erd binary.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn plant_erd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_plant-erd"));
    cmd.env_remove("PLANT_ERD_FORMAT")
        .env_remove("PLANT_ERD_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn create_database(dir: &Path) -> PathBuf {
    let path = dir.join("blog.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE users (
                 id   integer not null primary key,
                 name text
             );
             CREATE TABLE articles (
                 id      integer not null primary key,
                 user_id integer not null,
                 FOREIGN KEY(user_id) REFERENCES users(id)
             );
             CREATE INDEX index_user_id_on_articles ON articles(user_id);
             CREATE TABLE QRTZ_LOCKS (lock_name text not null primary key);
             CREATE TABLE settings (key text);",
        )
        .unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_sqlite_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());

    let output = plant_erd()
        .args(["sqlite", db.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    let out = stdout(&output);
    assert!(out.starts_with("entity QRTZ_LOCKS {"));
    assert!(out.contains("entity articles {\n  * id : INTEGER\n  --\n  * user_id : INTEGER\n  --\n  index_user_id_on_articles (user_id)\n}"));
    assert!(out.ends_with("articles }-- users"));
    assert!(stderr(&output).contains("ERD: 4 tables, 6 columns, 1 relationships"));
}

#[test]
fn test_sqlite_to_file_with_focus_table() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());
    let erd = temp_dir.path().join("erd.puml");

    let output = plant_erd()
        .args([
            "sqlite",
            db.to_str().unwrap(),
            "-f",
            erd.to_str().unwrap(),
            "-t",
            "users",
            "-d",
            "1",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("ERD written to:"));

    let written = fs::read_to_string(&erd).unwrap();
    assert!(written.contains("entity articles {"));
    assert!(written.contains("entity users {"));
    assert!(!written.contains("settings"));
    assert!(!written.contains("QRTZ_LOCKS"));
}

#[test]
fn test_mermaid_with_skip_table() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());

    let output = plant_erd()
        .args([
            "s",
            db.to_str().unwrap(),
            "--format",
            "mermaid",
            "--skip-table",
            "^QRTZ_",
            "--show-comment",
            "false",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    let out = stdout(&output);
    assert!(out.starts_with("erDiagram\n\narticles {\n  INTEGER id\n"));
    assert!(!out.contains("QRTZ"));
    assert!(out.ends_with("users ||--o{ articles : owns"));
}

#[test]
fn test_format_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());

    let output = plant_erd()
        .env("PLANT_ERD_FORMAT", "mermaid")
        .args(["sqlite", db.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).starts_with("erDiagram"));
}

#[test]
fn test_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());
    let config = temp_dir.path().join("plant_erd.yml");
    fs::write(&config, "table: articles\ndistance: 1\nskip_index: true\n").unwrap();

    let output = plant_erd()
        .args([
            "sqlite",
            db.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    let out = stdout(&output);
    assert!(out.starts_with("entity articles {"));
    assert!(!out.contains("index_user_id_on_articles"));
    assert!(!out.contains("settings"));
}

#[test]
fn test_unknown_table_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());

    let output = plant_erd()
        .args(["sqlite", db.to_str().unwrap(), "-t", "ghost"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("ghost is not found in database"));
}

#[test]
fn test_unknown_format_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_database(temp_dir.path());
    let erd = temp_dir.path().join("erd.txt");

    let output = plant_erd()
        .args([
            "sqlite",
            db.to_str().unwrap(),
            "--format",
            "graphviz",
            "-f",
            erd.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("graphviz is unknown format"));
    assert!(!erd.exists());
}

#[test]
fn test_missing_database_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = plant_erd()
        .args(["sqlite", temp_dir.path().join("nope.db").to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn test_dump_command() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("schema.sql");
    fs::write(
        &dump,
        "CREATE TABLE users (id integer PRIMARY KEY, name text);\n\
         CREATE TABLE articles (id integer PRIMARY KEY, user_id integer NOT NULL REFERENCES users(id));\n\
         INSERT INTO users VALUES (1, 'alice');\n",
    )
    .unwrap();

    let output = plant_erd()
        .args(["dump", dump.to_str().unwrap(), "--progress"])
        .output()
        .unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    let out = stdout(&output);
    assert!(out.starts_with("entity users {\n  * id : integer\n  --\n  name : text\n}"));
    assert!(out.ends_with("articles }-- users"));
}

#[test]
fn test_completions() {
    let output = plant_erd().args(["completions", "bash"]).output().unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).contains("plant-erd"));
}
