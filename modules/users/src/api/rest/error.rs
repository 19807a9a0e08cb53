use api_errors::ApiError;

use crate::domain::error::DomainError;
use crate::errors::*;

/// Map a domain error to the client-facing envelope.
pub fn map_domain_error(e: &DomainError) -> ApiError {
    match e {
        DomainError::MissingFields => ALL_FIELDS_REQUIRED.to_error(),
        DomainError::EmailAlreadyExists { .. } => USER_ALREADY_EXISTS.to_error(),
        DomainError::UsernameTaken { .. } => USERNAME_TAKEN.to_error(),
        DomainError::InvalidCredentials => INCORRECT_CREDENTIALS.to_error(),
        DomainError::InvalidToken { .. } => NOT_AUTHENTICATED.to_error(),
        DomainError::UserNotFound { .. } => USER_NOT_FOUND.to_error(),
        DomainError::AlreadyFollowing { target_name } => {
            ApiError::bad_request(format!("You already follow {target_name}"))
        }
        DomainError::NotFollowing => NOT_FOLLOWING.to_error(),
        DomainError::SelfFollow => CANNOT_FOLLOW_SELF.to_error(),
        // Internal details are logged by ApiError, never returned
        DomainError::Credentials { .. } | DomainError::Database { .. } => ApiError::internal(e),
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        map_domain_error(&e)
    }
}
