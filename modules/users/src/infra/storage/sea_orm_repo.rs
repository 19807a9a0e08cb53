//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over the connection so tests and the server can hand in any
//! `DatabaseConnection`. Toggles open their own transaction on it.

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::User;
use crate::domain::repo::{BookmarkToggle, UserCredentials, UserInsert, UsersRepository};
use crate::infra::storage::entity::{bookmark, follow, user};
use crate::infra::storage::mapper::{entity_to_contract, group_pairs, Edges};

/// Ids bound per `IN (...)` list; SQLite caps a statement at 32766 variables.
const IN_LIST_CHUNK: usize = 10_000;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Attach edge lists to user rows with one query per edge kind and id chunk.
    async fn hydrate(&self, rows: Vec<user::Model>) -> anyhow::Result<Vec<User>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let mut following = Vec::new();
        let mut followers = Vec::new();
        let mut bookmarks = Vec::new();
        // Each user's edges land in a single chunk, so per-user order holds.
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            following.extend(
                follow::Entity::find()
                    .filter(follow::Column::FollowerId.is_in(chunk.iter().copied()))
                    .order_by_asc(follow::Column::CreatedAt)
                    .all(&self.conn)
                    .await
                    .context("load following failed")?,
            );
            followers.extend(
                follow::Entity::find()
                    .filter(follow::Column::FolloweeId.is_in(chunk.iter().copied()))
                    .order_by_asc(follow::Column::CreatedAt)
                    .all(&self.conn)
                    .await
                    .context("load followers failed")?,
            );
            bookmarks.extend(
                bookmark::Entity::find()
                    .filter(bookmark::Column::UserId.is_in(chunk.iter().copied()))
                    .order_by_asc(bookmark::Column::CreatedAt)
                    .all(&self.conn)
                    .await
                    .context("load bookmarks failed")?,
            );
        }

        let mut edges = Edges {
            following: group_pairs(following.into_iter().map(|e| (e.follower_id, e.followee_id))),
            followers: group_pairs(followers.into_iter().map(|e| (e.followee_id, e.follower_id))),
            bookmarks: group_pairs(bookmarks.into_iter().map(|b| (b.user_id, b.tweet_id))),
        };

        Ok(rows
            .into_iter()
            .map(|row| entity_to_contract(row, &mut edges))
            .collect())
    }

    async fn hydrate_one(&self, row: Option<user::Model>) -> anyhow::Result<Option<User>> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        self.hydrate_one(found).await
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<UserCredentials>> {
        let Some(row) = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_credentials_by_email failed")?
        else {
            return Ok(None);
        };

        let password_hash = row.password_hash.clone();
        Ok(self
            .hydrate_one(Some(row))
            .await?
            .map(|user| UserCredentials {
                user,
                password_hash,
            }))
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("username_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, u: User, password_hash: String) -> anyhow::Result<UserInsert> {
        let m = user::ActiveModel {
            id: Set(u.id),
            name: Set(u.name),
            username: Set(u.username),
            email: Set(u.email),
            password_hash: Set(password_hash),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        match m.insert(&self.conn).await {
            Ok(_) => Ok(UserInsert::Created),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(UserInsert::Conflict)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert failed")),
        }
    }

    async fn list_except(&self, id: Uuid) -> anyhow::Result<Vec<User>> {
        let rows = user::Entity::find()
            .filter(user::Column::Id.ne(id))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_except failed")?;
        self.hydrate(rows).await
    }

    async fn following_of(&self, id: Uuid) -> anyhow::Result<Option<Vec<Uuid>>> {
        let exists = user::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("following_of: user lookup failed")?
            > 0;
        if !exists {
            return Ok(None);
        }

        let edges = follow::Entity::find()
            .filter(follow::Column::FollowerId.eq(id))
            .order_by_asc(follow::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("following_of failed")?;
        Ok(Some(edges.into_iter().map(|e| e.followee_id).collect()))
    }

    async fn add_follow(&self, follower: Uuid, followee: Uuid) -> anyhow::Result<bool> {
        let edge = follow::ActiveModel {
            follower_id: Set(follower),
            followee_id: Set(followee),
            created_at: Set(Utc::now()),
        };
        let inserted = follow::Entity::insert(edge)
            .on_conflict(
                OnConflict::columns([follow::Column::FollowerId, follow::Column::FolloweeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("add_follow failed")?;
        Ok(inserted > 0)
    }

    async fn remove_follow(&self, follower: Uuid, followee: Uuid) -> anyhow::Result<bool> {
        let res = follow::Entity::delete_by_id((follower, followee))
            .exec(&self.conn)
            .await
            .context("remove_follow failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        tweet_id: Uuid,
    ) -> anyhow::Result<BookmarkToggle> {
        let txn = self
            .conn
            .begin()
            .await
            .context("toggle_bookmark: begin failed")?;

        let removed = bookmark::Entity::delete_by_id((user_id, tweet_id))
            .exec(&txn)
            .await
            .context("toggle_bookmark: delete failed")?
            .rows_affected;

        let toggled = if removed > 0 {
            BookmarkToggle::Removed
        } else {
            let row = bookmark::ActiveModel {
                user_id: Set(user_id),
                tweet_id: Set(tweet_id),
                created_at: Set(Utc::now()),
            };
            bookmark::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([bookmark::Column::UserId, bookmark::Column::TweetId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("toggle_bookmark: insert failed")?;
            BookmarkToggle::Saved
        };

        txn.commit()
            .await
            .context("toggle_bookmark: commit failed")?;
        Ok(toggled)
    }
}
