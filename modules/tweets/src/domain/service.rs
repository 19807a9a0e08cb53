use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use users::contract::UsersApi;
use uuid::Uuid;

use crate::contract::model::{AuthorSnapshot, NewTweet, TimelineScope, Tweet};
use crate::domain::error::DomainError;
use crate::domain::repo::{LikeToggle, TweetsRepository};

/// Domain service for tweets. Users are reached only through their contract.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn TweetsRepository>,
    users: Arc<dyn UsersApi>,
}

impl Service {
    pub fn new(repo: Arc<dyn TweetsRepository>, users: Arc<dyn UsersApi>) -> Self {
        Self { repo, users }
    }

    #[instrument(name = "tweets.service.create", skip(self, new_tweet), fields(user_id = ?new_tweet.user_id))]
    pub async fn create(&self, new_tweet: NewTweet) -> Result<Tweet, DomainError> {
        let Some(author_id) = new_tweet.user_id else {
            return Err(DomainError::MissingFields);
        };
        if new_tweet.description.trim().is_empty() {
            return Err(DomainError::MissingFields);
        }

        let author = self.users.get_user(author_id).await?;

        let now = Utc::now();
        let tweet = Tweet {
            id: Uuid::new_v4(),
            description: new_tweet.description,
            user_id: author.id,
            user_details: Some(AuthorSnapshot::from(author.summary())),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(tweet.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Created tweet with id={}", tweet.id);
        Ok(tweet)
    }

    /// Deleting an unknown id is not an error.
    #[instrument(name = "tweets.service.delete", skip(self), fields(tweet_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(deleted, "Delete finished");
        Ok(())
    }

    #[instrument(
        name = "tweets.service.toggle_like",
        skip(self),
        fields(tweet_id = %tweet_id, user_id = %actor_id)
    )]
    pub async fn toggle_like(
        &self,
        tweet_id: Uuid,
        actor_id: Uuid,
    ) -> Result<LikeToggle, DomainError> {
        let toggled = self
            .repo
            .toggle_like(tweet_id, actor_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::tweet_not_found(tweet_id))?;
        debug!(?toggled, "Like toggled");
        Ok(toggled)
    }

    /// Own tweets first (for `WithOwn`), then tweets of followed users.
    /// Two repository calls at most, however many users are followed.
    #[instrument(name = "tweets.service.timeline", skip(self), fields(user_id = %user_id))]
    pub async fn timeline(
        &self,
        user_id: Uuid,
        scope: TimelineScope,
    ) -> Result<Vec<Tweet>, DomainError> {
        let following = self.users.following(user_id).await?;

        let mut tweets = match scope {
            TimelineScope::WithOwn => self
                .repo
                .list_by_authors(&[user_id])
                .await
                .map_err(|e| DomainError::database(e.to_string()))?,
            TimelineScope::FollowingOnly => Vec::new(),
        };

        if !following.is_empty() {
            let followed = self
                .repo
                .list_by_authors(&following)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
            tweets.extend(followed);
        }

        debug!(
            following = following.len(),
            tweets = tweets.len(),
            "Timeline assembled"
        );
        Ok(tweets)
    }
}
