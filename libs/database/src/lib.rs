//! Connectors for the user store backends.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL via SeaORM, plus migration running
//! - `mongodb` - MongoDB client with a ping on connect
//! - `config` - `core_config::FromEnv` for the connection configs
//! - `all` - everything above
//!
//! # Examples
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::{common::RetryConfig, postgres};
//!
//! let config = postgres::PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, Some(RetryConfig::new())).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "users").await?;
//! ```
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017/?replicaSet=rs0", "users");
//! let client = connect_from_config(&config).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "mongodb")]
pub mod mongodb;
