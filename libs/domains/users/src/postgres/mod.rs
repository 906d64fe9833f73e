//! PostgreSQL storage (sea-orm). Schema lives in the `migration` crate.

pub mod entity;
mod repository;

pub use repository::PgUserRepository;
