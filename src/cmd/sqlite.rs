use super::{write_erd, GenerateArgs};
use crate::adapter::{load_schema, SqliteAdapter};
use std::path::PathBuf;

pub fn run(database: PathBuf, args: GenerateArgs) -> anyhow::Result<()> {
    let config = args.generator_config()?;

    let mut adapter = SqliteAdapter::open(&database)?;
    let schema = load_schema(&mut adapter)?;

    write_erd(&schema, config)?;
    Ok(())
}
