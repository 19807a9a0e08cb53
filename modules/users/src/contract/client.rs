use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{error::UsersError, model::User};

/// Public API of the users module for other modules.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Get a user by id.
    async fn get_user(&self, id: Uuid) -> Result<User, UsersError>;

    /// Ids the user follows, oldest edge first.
    async fn following(&self, id: Uuid) -> Result<Vec<Uuid>, UsersError>;
}
