use std::path::PathBuf;

pub mod entities;
pub mod services;

pub const DEFAULT_MAX_PAGE_SIZE: i64 = 1000;

#[derive(Clone, Debug)]
pub struct LowQueryConfig {
    pub schema_path: PathBuf,
    pub engine: EngineConfig,
    pub max_page_size: i64,
}

#[derive(Clone, Debug)]
pub enum EngineConfig {
    Postgres(DatabaseConfig),
    InMemory { fixtures_path: Option<PathBuf> },
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}
