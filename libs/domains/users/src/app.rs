use std::sync::Arc;

use crate::auth::Guards;
use crate::commands::Commands;
use crate::queries::Queries;
use crate::repository::{UserReadModelRepository, UserRepository};

/// Entry point handed to a transport: every command and query handler.
#[derive(Clone)]
pub struct Application {
    pub commands: Commands,
    pub queries: Queries,
}

impl Application {
    pub fn new(
        users: Arc<dyn UserRepository>,
        read_models: Arc<dyn UserReadModelRepository>,
        guards: Guards,
    ) -> Self {
        Self {
            commands: Commands::new(users, read_models.clone(), guards.clone()),
            queries: Queries::new(read_models, guards),
        }
    }

    /// Application over an adapter that implements both ports.
    pub fn from_store<S>(store: Arc<S>, guards: Guards) -> Self
    where
        S: UserRepository + UserReadModelRepository + 'static,
    {
        Self::new(store.clone(), store, guards)
    }
}
