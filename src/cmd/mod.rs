mod dump;
mod mysql;
mod postgres;
mod sqlite;

use crate::config::ErdYamlConfig;
use crate::generator::{ErdGenerator, ErdStats, GeneratorConfig};
use crate::schema::Schema;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-erd")]
#[command(version)]
#[command(
    about = "Generate PlantUML or Mermaid ER diagrams from database schemas",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an ERD from a SQLite database
    #[command(visible_alias = "s")]
    Sqlite {
        /// SQLite database file
        database: PathBuf,

        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Generate an ERD from a MySQL database
    #[command(visible_alias = "m")]
    Mysql {
        #[command(flatten)]
        connection: self::mysql::MysqlArgs,

        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Generate an ERD from a PostgreSQL database
    #[command(visible_aliases = ["p", "postgres"])]
    Postgresql {
        #[command(flatten)]
        connection: self::postgres::PostgresArgs,

        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Generate an ERD from the DDL in a SQL dump file
    #[command(visible_alias = "d")]
    Dump {
        /// SQL dump file
        /// Supports .gz, .bz2, .xz, .zst compression
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show progress while reading the dump
        #[arg(short, long)]
        progress: bool,

        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Flags shared by every schema source
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Only show tables surrounding this table
    #[arg(short, long)]
    pub table: Option<String>,

    /// Foreign key hops from --table (0 shows every table)
    #[arg(short, long, allow_negative_numbers = true)]
    pub distance: Option<i64>,

    /// Omit indexes (plant_uml only)
    #[arg(short = 'i', long)]
    pub skip_index: bool,

    /// Skip tables whose name matches this regular expression
    #[arg(short, long)]
    pub skip_table: Option<String>,

    /// Output format: plant_uml or mermaid
    #[arg(long, env = "PLANT_ERD_FORMAT")]
    pub format: Option<String>,

    /// Show key markers and comments (mermaid only)
    #[arg(long, value_name = "BOOL")]
    pub show_comment: Option<bool>,

    /// YAML configuration file
    #[arg(short, long, env = "PLANT_ERD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Generator settings: flags over config file over defaults
    pub fn generator_config(&self) -> anyhow::Result<GeneratorConfig> {
        let file_config = match &self.config {
            Some(path) => ErdYamlConfig::load(path)?,
            None => ErdYamlConfig::default(),
        };
        let base = file_config.to_generator_config();

        Ok(GeneratorConfig {
            output: self.file.clone().or(base.output),
            table: self.table.clone().or(base.table),
            distance: self.distance.unwrap_or(base.distance),
            skip_index: self.skip_index || base.skip_index,
            skip_table: self.skip_table.clone().or(base.skip_table),
            format: self.format.clone().unwrap_or(base.format),
            show_comment: self.show_comment.unwrap_or(base.show_comment),
        })
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Sqlite { database, args } => {
            setup_logging(args.verbose);
            sqlite::run(database, args)
        }
        Commands::Mysql { connection, args } => {
            setup_logging(args.verbose);
            self::mysql::run(connection, args)
        }
        Commands::Postgresql { connection, args } => {
            setup_logging(args.verbose);
            self::postgres::run(connection, args)
        }
        Commands::Dump {
            input,
            progress,
            args,
        } => {
            setup_logging(args.verbose);
            dump::run(input, progress, args)
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "plant-erd", &mut io::stdout());
            Ok(())
        }
    }
}

/// Render the schema with the merged settings and report where it went
fn write_erd(schema: &Schema, config: GeneratorConfig) -> anyhow::Result<ErdStats> {
    let output = config.output.clone();
    let stats = ErdGenerator::new(config).run(schema)?;

    if let Some(path) = output {
        eprintln!("ERD written to: {}", path.display());
    }
    eprintln!(
        "\nERD: {} tables, {} columns, {} relationships",
        stats.tables, stats.columns, stats.relationships
    );

    Ok(stats)
}

/// Log to stderr so stdout only carries the diagram
fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}
