use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::Tweet;

/// Which branch a like toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Disliked,
}

/// Port for the domain layer: persistence operations the domain needs.
#[async_trait]
pub trait TweetsRepository: Send + Sync {
    /// Insert a fully-formed tweet with no likes.
    async fn insert(&self, tweet: Tweet) -> anyhow::Result<()>;
    /// Delete by id together with its likes. Returns true if a tweet was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Flip `user_id`'s like on `tweet_id` atomically. `None` if the tweet does not exist.
    async fn toggle_like(&self, tweet_id: Uuid, user_id: Uuid)
        -> anyhow::Result<Option<LikeToggle>>;
    /// All tweets by any of `authors`, in store order. One query regardless of `authors.len()`.
    async fn list_by_authors(&self, authors: &[Uuid]) -> anyhow::Result<Vec<Tweet>>;
}
