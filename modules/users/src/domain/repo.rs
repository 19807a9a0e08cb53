use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::User;

/// A user together with the stored password hash. Never leaves the domain.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Which branch a bookmark toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkToggle {
    Saved,
    Removed,
}

/// Outcome of persisting a new user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInsert {
    Created,
    /// A unique email or username was claimed by another registration first.
    Conflict,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id, edges included.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Load a user and its password hash by email.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<UserCredentials>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    /// Insert a fully-formed user with no edges.
    ///
    /// Service computes id/timestamps/hash; repo persists. A unique-constraint
    /// violation is reported as [`UserInsert::Conflict`], not as an error.
    async fn insert(&self, user: User, password_hash: String) -> anyhow::Result<UserInsert>;
    /// Every user except `id`, oldest first.
    async fn list_except(&self, id: Uuid) -> anyhow::Result<Vec<User>>;
    /// Ids followed by `id`, or `None` when the user does not exist.
    async fn following_of(&self, id: Uuid) -> anyhow::Result<Option<Vec<Uuid>>>;
    /// Add a follow edge. Returns false if it already existed.
    async fn add_follow(&self, follower: Uuid, followee: Uuid) -> anyhow::Result<bool>;
    /// Remove a follow edge. Returns false if there was none.
    async fn remove_follow(&self, follower: Uuid, followee: Uuid) -> anyhow::Result<bool>;
    /// Flip bookmark membership of `tweet_id` for `user_id` atomically.
    async fn toggle_bookmark(&self, user_id: Uuid, tweet_id: Uuid)
        -> anyhow::Result<BookmarkToggle>;
}
