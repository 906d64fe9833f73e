//! Builds the repository pair for the configured storage engine.

use std::sync::Arc;

use core_config::storage::StorageEngine;
use core_config::{ConfigError, FromEnv};
use database::common::RetryConfig;
use thiserror::Error;
use tracing::instrument;

use crate::app::Application;
use crate::auth::Guards;
use crate::repository::{InMemoryUserRepository, UserReadModelRepository, UserRepository};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[cfg(feature = "postgres")]
    #[error("PostgreSQL setup failed: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[cfg(feature = "mongodb")]
    #[error(transparent)]
    Mongo(#[from] database::mongodb::MongoError),

    #[error("Storage setup failed: {0}")]
    Setup(#[from] crate::error::UserError),

    #[cfg(not(all(feature = "postgres", feature = "mongodb")))]
    #[error("Storage engine '{0}' is not compiled into this build")]
    EngineDisabled(StorageEngine),
}

/// Write and read ports backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub read_models: Arc<dyn UserReadModelRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + UserReadModelRepository + 'static,
    {
        Self {
            users: store.clone(),
            read_models: store,
        }
    }

    pub fn into_application(self, guards: Guards) -> Application {
        Application::new(self.users, self.read_models, guards)
    }
}

/// Connect to `engine`, reading its connection settings from the environment.
///
/// PostgreSQL gets pending migrations applied; MongoDB gets its unique indexes.
#[instrument]
pub async fn connect_repositories(engine: StorageEngine) -> Result<Repositories, StorageError> {
    let repositories = match engine {
        StorageEngine::Memory => Repositories::from_store(Arc::new(InMemoryUserRepository::new())),
        StorageEngine::Postgres => connect_postgres().await?,
        StorageEngine::MongoDb => connect_mongodb().await?,
    };

    tracing::info!(%engine, "User storage ready");
    Ok(repositories)
}

#[cfg(feature = "postgres")]
async fn connect_postgres() -> Result<Repositories, StorageError> {
    use database::postgres::{self, PostgresConfig};

    let config = PostgresConfig::from_env()?;
    let db = postgres::connect_from_config_with_retry(config, Some(RetryConfig::new())).await?;
    postgres::run_migrations::<migration::Migrator>(&db, "users").await?;

    Ok(Repositories::from_store(Arc::new(
        crate::postgres::PgUserRepository::new(db),
    )))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres() -> Result<Repositories, StorageError> {
    Err(StorageError::EngineDisabled(StorageEngine::Postgres))
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb() -> Result<Repositories, StorageError> {
    use database::mongodb::{self, MongoConfig};

    let config = MongoConfig::from_env()?;
    let client = mongodb::connect_from_config_with_retry(&config, Some(RetryConfig::new())).await?;

    let repository = crate::mongodb::MongoUserRepository::new(client, config.database());
    repository.ensure_indexes().await?;

    Ok(Repositories::from_store(Arc::new(repository)))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb() -> Result<Repositories, StorageError> {
    Err(StorageError::EngineDisabled(StorageEngine::MongoDb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, RequestContext, Role};
    use crate::cqrs::QueryHandler;
    use crate::queries::GetUsers;

    #[tokio::test]
    async fn test_memory_engine_needs_no_configuration() {
        let repositories = connect_repositories(StorageEngine::Memory).await.unwrap();
        let app = repositories.into_application(Guards::default());

        let admin =
            RequestContext::for_user(AuthenticatedUser::new("root", "root@x.com", Role::Admin));
        let page = app
            .queries
            .get_users
            .handle(&admin, GetUsers::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn test_postgres_engine_requires_database_url() {
        let result = temp_env::async_with_vars([("DATABASE_URL", None::<&str>)], async {
            connect_repositories(StorageEngine::Postgres).await
        })
        .await;

        let err = result.err().unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[cfg(not(feature = "mongodb"))]
    #[tokio::test]
    async fn test_mongodb_engine_disabled_without_feature() {
        let err = connect_repositories(StorageEngine::MongoDb).await.err().unwrap();
        assert!(matches!(
            err,
            StorageError::EngineDisabled(StorageEngine::MongoDb)
        ));
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_postgres_engine_disabled_without_feature() {
        let err = connect_repositories(StorageEngine::Postgres).await.err().unwrap();
        assert!(matches!(
            err,
            StorageError::EngineDisabled(StorageEngine::Postgres)
        ));
    }
}
