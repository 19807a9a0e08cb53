use std::collections::HashMap;

use uuid::Uuid;

use crate::contract::model::{AuthorSnapshot, Tweet};
use crate::infra::storage::entity::tweet::Model as TweetEntity;

/// Convert a database row plus its likers to a contract model.
///
/// An unreadable snapshot is dropped rather than failing the whole read.
pub fn entity_to_contract(entity: TweetEntity, likes: &mut HashMap<Uuid, Vec<Uuid>>) -> Tweet {
    let user_details = entity.user_details.and_then(|json| {
        serde_json::from_value::<AuthorSnapshot>(json)
            .map_err(|e| tracing::warn!(tweet_id = %entity.id, error = %e, "bad author snapshot"))
            .ok()
    });

    Tweet {
        likes: likes.remove(&entity.id).unwrap_or_default(),
        id: entity.id,
        description: entity.description,
        user_id: entity.user_id,
        user_details,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

pub fn snapshot_to_json(
    snapshot: Option<&AuthorSnapshot>,
) -> anyhow::Result<Option<serde_json::Value>> {
    snapshot
        .map(serde_json::to_value)
        .transpose()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(user_details: Option<serde_json::Value>) -> TweetEntity {
        let now = Utc::now();
        TweetEntity {
            id: Uuid::new_v4(),
            description: "hello".into(),
            user_id: Uuid::new_v4(),
            user_details,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn snapshot_survives_storage() {
        let snapshot = AuthorSnapshot {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            username: "ann".into(),
            email: "ann@example.com".into(),
        };
        let json = snapshot_to_json(Some(&snapshot)).unwrap();
        let tweet = entity_to_contract(row(json), &mut HashMap::new());
        assert_eq!(tweet.user_details, Some(snapshot));
    }

    #[test]
    fn malformed_snapshot_is_dropped() {
        let tweet = entity_to_contract(row(Some(serde_json::json!({"id": 7}))), &mut HashMap::new());
        assert!(tweet.user_details.is_none());
    }

    #[test]
    fn likes_are_attached() {
        let r = row(None);
        let liker = Uuid::new_v4();
        let mut likes = HashMap::from([(r.id, vec![liker])]);
        let tweet = entity_to_contract(r, &mut likes);
        assert_eq!(tweet.likes, vec![liker]);
    }
}
