//! MongoDB storage. Documents use camelCase fields in the `users` collection.

pub mod document;
mod repository;

pub use repository::{MongoUserRepository, USERS_COLLECTION};
