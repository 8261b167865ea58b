use super::{write_erd, GenerateArgs};
use crate::adapter::{load_schema, MysqlAdapter, MysqlOptions};
use clap::Args;

/// Connection flags of the `mysql` command
#[derive(Args, Debug, Clone)]
pub struct MysqlArgs {
    /// Server host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Server port
    #[arg(long, default_value_t = 3306)]
    pub port: u16,

    /// User name
    #[arg(long, default_value = "root")]
    pub user: String,

    /// Password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(long)]
    pub database: String,

    /// Connection collation
    #[arg(long)]
    pub collation: Option<String>,
}

impl MysqlArgs {
    pub fn options(&self) -> MysqlOptions {
        MysqlOptions {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            collation: self.collation.clone(),
        }
    }
}

pub fn run(connection: MysqlArgs, args: GenerateArgs) -> anyhow::Result<()> {
    let config = args.generator_config()?;

    let mut adapter = MysqlAdapter::connect(&connection.options())?;
    let schema = load_schema(&mut adapter)?;

    write_erd(&schema, config)?;
    Ok(())
}
