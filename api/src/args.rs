use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lowquery_core::domain::common::{
    DEFAULT_MAX_PAGE_SIZE, DatabaseConfig, EngineConfig, LowQueryConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "lowquery", version, about = "Filter, sort and projection query service")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(id = "server_host", long = "server-host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(id = "server_port", long = "server-port", env = "SERVER_PORT", default_value_t = 3333)]
    pub port: u16,

    #[arg(long = "server-root-path", env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    #[arg(id = "database_host", long = "database-host", env = "DATABASE_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(id = "database_port", long = "database-port", env = "DATABASE_PORT", default_value_t = 5432)]
    pub port: u16,

    #[arg(long = "database-user", env = "DATABASE_USER", default_value = "postgres")]
    pub user: String,

    #[arg(long = "database-password", env = "DATABASE_PASSWORD", default_value = "postgres")]
    pub password: String,

    #[arg(long = "database-name", env = "DATABASE_NAME", default_value = "lowquery")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, clap::Args)]
pub struct QueryArgs {
    /// JSON file declaring entities, fields, relations and views.
    #[arg(long = "schema", env = "SCHEMA_PATH", default_value = "demos/schema.json")]
    pub schema_path: PathBuf,

    #[arg(long = "engine", env = "QUERY_ENGINE", value_enum, default_value_t = EngineKind::Postgres)]
    pub engine: EngineKind,

    /// Tables for the in-memory engine.
    #[arg(long = "fixtures", env = "FIXTURES_PATH")]
    pub fixtures_path: Option<PathBuf>,

    #[arg(
        long = "max-page-size",
        env = "MAX_PAGE_SIZE",
        default_value_t = DEFAULT_MAX_PAGE_SIZE,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub max_page_size: i64,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(long = "log-filter", env = "LOG_FILTER", default_value = "info")]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false)]
    pub json: bool,
}

impl From<Args> for LowQueryConfig {
    fn from(args: Args) -> Self {
        let engine = match args.query.engine {
            EngineKind::Postgres => EngineConfig::Postgres(DatabaseConfig {
                host: args.db.host,
                port: args.db.port,
                username: args.db.user,
                password: args.db.password,
                name: args.db.name,
            }),
            EngineKind::Memory => EngineConfig::InMemory {
                fixtures_path: args.query.fixtures_path,
            },
        };

        LowQueryConfig {
            schema_path: args.query.schema_path,
            engine,
            max_page_size: args.query.max_page_size,
        }
    }
}
