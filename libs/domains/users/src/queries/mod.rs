//! Read-side handlers: authorize, then delegate to the read port.

mod get_user;
mod list_users;

use std::sync::Arc;

pub use get_user::{GetUserByEmail, GetUserByEmailHandler, GetUserById, GetUserByIdHandler};
pub use list_users::{GetUsers, GetUsersHandler};

use crate::auth::Guards;
use crate::repository::UserReadModelRepository;

#[derive(Clone)]
pub struct Queries {
    pub get_user_by_id: GetUserByIdHandler,
    pub get_user_by_email: GetUserByEmailHandler,
    pub get_users: GetUsersHandler,
}

impl Queries {
    pub fn new(read_models: Arc<dyn UserReadModelRepository>, guards: Guards) -> Self {
        Self {
            get_user_by_id: GetUserByIdHandler::new(read_models.clone(), guards.clone()),
            get_user_by_email: GetUserByEmailHandler::new(read_models.clone(), guards.clone()),
            get_users: GetUsersHandler::new(read_models, guards),
        }
    }
}
