//! SeaORM-backed repository for tweets and likes.

use std::collections::HashMap;

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::Tweet;
use crate::domain::repo::{LikeToggle, TweetsRepository};
use crate::infra::storage::entity::{like, tweet};
use crate::infra::storage::mapper::{entity_to_contract, snapshot_to_json};

/// Ids bound per `IN (...)` list; SQLite caps a statement at 32766 variables.
const IN_LIST_CHUNK: usize = 10_000;

pub struct SeaOrmTweetsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmTweetsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Attach likers to tweet rows, one query per chunk of tweet ids.
    async fn hydrate(&self, rows: Vec<tweet::Model>) -> anyhow::Result<Vec<Tweet>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        // A tweet's likes never straddle chunks, so per-tweet order holds.
        let mut by_tweet: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let likes = like::Entity::find()
                .filter(like::Column::TweetId.is_in(chunk.iter().copied()))
                .order_by_asc(like::Column::CreatedAt)
                .all(&self.conn)
                .await
                .context("load likes failed")?;
            for l in likes {
                by_tweet.entry(l.tweet_id).or_default().push(l.user_id);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| entity_to_contract(row, &mut by_tweet))
            .collect())
    }
}

#[async_trait::async_trait]
impl<C> TweetsRepository for SeaOrmTweetsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert(&self, t: Tweet) -> anyhow::Result<()> {
        let m = tweet::ActiveModel {
            id: Set(t.id),
            description: Set(t.description),
            user_id: Set(t.user_id),
            user_details: Set(snapshot_to_json(t.user_details.as_ref())?),
            created_at: Set(t.created_at),
            updated_at: Set(t.updated_at),
        };
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("delete: begin failed")?;

        like::Entity::delete_many()
            .filter(like::Column::TweetId.eq(id))
            .exec(&txn)
            .await
            .context("delete: likes cleanup failed")?;
        let res = tweet::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete failed")?;

        txn.commit().await.context("delete: commit failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn toggle_like(
        &self,
        tweet_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<LikeToggle>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("toggle_like: begin failed")?;

        let exists = tweet::Entity::find_by_id(tweet_id)
            .count(&txn)
            .await
            .context("toggle_like: tweet lookup failed")?
            > 0;
        if !exists {
            txn.rollback()
                .await
                .context("toggle_like: rollback failed")?;
            return Ok(None);
        }

        let removed = like::Entity::delete_by_id((tweet_id, user_id))
            .exec(&txn)
            .await
            .context("toggle_like: delete failed")?
            .rows_affected;

        let toggled = if removed > 0 {
            LikeToggle::Disliked
        } else {
            let row = like::ActiveModel {
                tweet_id: Set(tweet_id),
                user_id: Set(user_id),
                created_at: Set(Utc::now()),
            };
            like::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([like::Column::TweetId, like::Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("toggle_like: insert failed")?;
            LikeToggle::Liked
        };

        txn.commit().await.context("toggle_like: commit failed")?;
        Ok(Some(toggled))
    }

    async fn list_by_authors(&self, authors: &[Uuid]) -> anyhow::Result<Vec<Tweet>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::new();
        for chunk in authors.chunks(IN_LIST_CHUNK) {
            let part = tweet::Entity::find()
                .filter(tweet::Column::UserId.is_in(chunk.iter().copied()))
                .order_by_asc(tweet::Column::CreatedAt)
                .all(&self.conn)
                .await
                .context("list_by_authors failed")?;
            rows.extend(part);
        }
        if authors.len() > IN_LIST_CHUNK {
            rows.sort_by_key(|r| r.created_at);
        }
        self.hydrate(rows).await
    }
}
