use tracing::{error, info};

use crate::{
    domain::{
        common::{EngineConfig, LowQueryConfig, entities::app_errors::CoreError, services::Service},
        schema::entities::Schema,
    },
    infrastructure::{
        db::postgres::{Postgres, PostgresConfig},
        low_query::repositories::{
            QueryEngineRepository, in_memory_query_engine::InMemoryQueryEngine,
            postgres_query_engine::PostgresQueryEngine,
        },
        schema::json_schema_loader::load_schema_file,
    },
};

pub type LowQueryService = Service<Schema, QueryEngineRepository>;

pub async fn create_service(config: LowQueryConfig) -> Result<LowQueryService, CoreError> {
    let schema = load_schema_file(&config.schema_path)?;

    let engine = match config.engine {
        EngineConfig::Postgres(database) => {
            let postgres = Postgres::new(PostgresConfig {
                database_url: database.url(),
            })
            .await
            .map_err(|e| {
                error!("Failed to connect to postgres: {}", e);
                CoreError::QueryExecution(e.to_string())
            })?;
            QueryEngineRepository::Postgres(PostgresQueryEngine::new(postgres.get_db()))
        }
        EngineConfig::InMemory { fixtures_path } => {
            let engine = match fixtures_path {
                Some(path) => InMemoryQueryEngine::from_file(&path)?,
                None => InMemoryQueryEngine::default(),
            };
            QueryEngineRepository::InMemory(engine)
        }
    };

    info!(max_page_size = config.max_page_size, "low query service ready");

    Ok(Service::new(schema, engine).with_max_page_size(config.max_page_size))
}
