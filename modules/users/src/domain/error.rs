use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("User with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("Username '{username}' is already taken")]
    UsernameTaken { username: String },

    #[error("Required fields are missing")]
    MissingFields,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid session token: {reason}")]
    InvalidToken { reason: String },

    #[error("Already following {target_name}")]
    AlreadyFollowing { target_name: String },

    #[error("Not following the target user")]
    NotFollowing,

    #[error("A user cannot follow themselves")]
    SelfFollow,

    #[error("Credential processing failed: {message}")]
    Credentials { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::UsernameTaken {
            username: username.into(),
        }
    }

    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    pub fn already_following(target_name: impl Into<String>) -> Self {
        Self::AlreadyFollowing {
            target_name: target_name.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
