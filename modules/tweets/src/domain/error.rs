use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tweet not found: {id}")]
    TweetNotFound { id: Uuid },

    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Description and author are required")]
    MissingFields,

    #[error("Users module call failed: {message}")]
    Users { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn tweet_not_found(id: Uuid) -> Self {
        Self::TweetNotFound { id }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn users(message: impl Into<String>) -> Self {
        Self::Users {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<users::contract::UsersError> for DomainError {
    fn from(e: users::contract::UsersError) -> Self {
        match e {
            users::contract::UsersError::NotFound { id } => Self::user_not_found(id),
            other => Self::users(other.to_string()),
        }
    }
}
