use api_errors::ApiError;

use crate::domain::error::DomainError;
use crate::errors::{FIELDS_REQUIRED, TWEET_NOT_FOUND, USER_NOT_FOUND};

pub fn map_domain_error(e: &DomainError) -> ApiError {
    match e {
        DomainError::MissingFields => FIELDS_REQUIRED.to_error(),
        DomainError::TweetNotFound { .. } => TWEET_NOT_FOUND.to_error(),
        DomainError::UserNotFound { .. } => USER_NOT_FOUND.to_error(),
        DomainError::Users { .. } | DomainError::Database { .. } => ApiError::internal(e),
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        map_domain_error(&e)
    }
}
