//! Users Domain
//!
//! User accounts with reputation, badges, roles and bans, exposed through
//! command and query handlers that authorize every call.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │       Application        │  ← Commands + Queries, handed to a transport
//! └────────────┬─────────────┘
//!              │ RequestContext (principal, deadline)
//! ┌────────────▼─────────────┐
//! │  Command/Query handlers  │  ← RBAC / ABAC guards, validation, metrics
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │     Repository ports     │  ← UserRepository (write), UserReadModelRepository (read)
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │  In-memory / Postgres /  │  ← atomic read-modify-write per user
//! │        MongoDB           │
//! └──────────────────────────┘
//! ```
//!
//! All state changes go through [`User`] methods; adapters only load, hand the
//! aggregate to an update closure and persist the result.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_users::{
//!     Application, AuthenticatedUser, Guards, InMemoryUserRepository, RequestContext, Role,
//!     commands::RegisterUser, cqrs::CommandHandler,
//! };
//!
//! # async fn example() -> domain_users::UserResult<()> {
//! let app = Application::from_store(Arc::new(InMemoryUserRepository::new()), Guards::default());
//!
//! let id = app
//!     .commands
//!     .register_user
//!     .handle(
//!         &RequestContext::anonymous(),
//!         RegisterUser { email: "ada@example.com".into(), username: "ada".into() },
//!     )
//!     .await?;
//!
//! let me = RequestContext::for_user(AuthenticatedUser::new(id, "ada@example.com", Role::Regular));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod auth;
pub mod banning;
pub mod commands;
pub mod cqrs;
pub mod error;
pub mod models;
pub mod pagination;
pub mod queries;
pub mod repository;
pub mod storage;
pub mod user;

#[cfg(feature = "mongodb")]
pub mod mongodb;
#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export commonly used types
pub use app::Application;
pub use auth::{AuthenticatedUser, Guards, Permission, RequestContext, Role};
pub use banning::{BanStatus, BanTimeline};
pub use error::{ErrorKind, UserError, UserResult};
pub use models::{GetUsersOptions, PaginatedResult, SortDirection, UserReadModel};
pub use repository::{InMemoryUserRepository, UpdateFn, UserReadModelRepository, UserRepository};
pub use storage::{Repositories, StorageError, connect_repositories};
pub use user::{Reputation, User};

#[cfg(feature = "mongodb")]
pub use crate::mongodb::MongoUserRepository;
#[cfg(feature = "postgres")]
pub use crate::postgres::PgUserRepository;
