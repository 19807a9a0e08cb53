use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::UsersApi, error::UsersError, model::User};
use crate::domain::service::Service;

/// Local implementation of the UsersApi trait that delegates to the domain service
pub struct UsersLocalClient {
    service: Arc<Service>,
}

impl UsersLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersApi for UsersLocalClient {
    async fn get_user(&self, id: Uuid) -> Result<User, UsersError> {
        self.service.get_profile(id).await.map_err(Into::into)
    }

    async fn following(&self, id: Uuid) -> Result<Vec<Uuid>, UsersError> {
        self.service.following(id).await.map_err(Into::into)
    }
}
