use super::{write_erd, GenerateArgs};
use crate::adapter::postgres::SslMode;
use crate::adapter::{load_schema, PostgresAdapter, PostgresOptions};
use clap::{Args, ValueEnum};

/// TLS is not compiled in, so `prefer` falls back to plain connections
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslModeArg {
    #[default]
    Disable,
    Prefer,
    Require,
}

impl From<SslModeArg> for SslMode {
    fn from(mode: SslModeArg) -> Self {
        match mode {
            SslModeArg::Disable => SslMode::Disable,
            SslModeArg::Prefer => SslMode::Prefer,
            SslModeArg::Require => SslMode::Require,
        }
    }
}

/// Connection flags of the `postgresql` command
#[derive(Args, Debug, Clone)]
pub struct PostgresArgs {
    /// Server host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Server port
    #[arg(long, default_value_t = 5432)]
    pub port: u16,

    /// User name
    #[arg(long, default_value = "postgres")]
    pub user: String,

    /// Password
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(long)]
    pub database: String,

    /// SSL mode
    #[arg(long, value_enum, default_value_t = SslModeArg::Disable)]
    pub sslmode: SslModeArg,
}

impl PostgresArgs {
    pub fn options(&self) -> PostgresOptions {
        PostgresOptions {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            ssl_mode: self.sslmode.into(),
        }
    }
}

pub fn run(connection: PostgresArgs, args: GenerateArgs) -> anyhow::Result<()> {
    let config = args.generator_config()?;

    let mut adapter = PostgresAdapter::connect(&connection.options())?;
    let schema = load_schema(&mut adapter)?;

    write_erd(&schema, config)?;
    Ok(())
}
