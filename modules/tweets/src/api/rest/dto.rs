use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{AuthorSnapshot, Tweet};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetDto {
    pub id: Uuid,
    pub description: String,
    pub user_id: Uuid,
    pub user_details: Option<AuthorDto>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create body. `id` is the author; both fields are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateTweetReq {
    pub description: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TweetsResponse {
    pub success: bool,
    pub tweets: Vec<TweetDto>,
}

impl From<AuthorSnapshot> for AuthorDto {
    fn from(a: AuthorSnapshot) -> Self {
        Self {
            id: a.id,
            name: a.name,
            username: a.username,
            email: a.email,
        }
    }
}

impl From<Tweet> for TweetDto {
    fn from(t: Tweet) -> Self {
        Self {
            id: t.id,
            description: t.description,
            user_id: t.user_id,
            user_details: t.user_details.map(Into::into),
            likes: t.likes,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
