use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersError {
    #[error("User not found: {id}")]
    NotFound { id: Uuid },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error")]
    Internal,
}

impl UsersError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for UsersError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::not_found(id),
            EmailAlreadyExists { email } => Self::conflict(format!("email '{email}' in use")),
            UsernameTaken { username } => {
                Self::conflict(format!("username '{username}' in use"))
            }
            AlreadyFollowing { target_name } => {
                Self::conflict(format!("already following {target_name}"))
            }
            NotFollowing => Self::conflict("not following"),
            MissingFields => Self::validation("all fields are required"),
            SelfFollow => Self::validation("cannot follow yourself"),
            InvalidCredentials | InvalidToken { .. } => Self::Unauthorized,
            Database { .. } | Credentials { .. } => Self::internal(),
        }
    }
}
