use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post. `likes` lists liker ids in the order the likes arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub id: Uuid,
    pub description: String,
    pub user_id: Uuid,
    /// Author as they were when the tweet was created. Not refreshed on profile edits.
    pub user_details: Option<AuthorSnapshot>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public author fields copied into a tweet. Stored as JSON, hence serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Data for creating a tweet. A missing author counts as a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTweet {
    pub description: String,
    pub user_id: Option<Uuid>,
}

/// Which authors a timeline covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineScope {
    /// The user's own tweets, then the tweets of everyone they follow.
    WithOwn,
    /// Only the tweets of followed users.
    FollowingOnly,
}

impl From<users::contract::UserSummary> for AuthorSnapshot {
    fn from(s: users::contract::UserSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            username: s.username,
            email: s.email,
        }
    }
}
