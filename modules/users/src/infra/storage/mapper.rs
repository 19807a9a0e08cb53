use std::collections::HashMap;

use uuid::Uuid;

use crate::contract::model::User;
use crate::infra::storage::entity::user::Model as UserEntity;

/// Edge lists keyed by user id.
#[derive(Debug, Default)]
pub struct Edges {
    pub following: HashMap<Uuid, Vec<Uuid>>,
    pub followers: HashMap<Uuid, Vec<Uuid>>,
    pub bookmarks: HashMap<Uuid, Vec<Uuid>>,
}

/// Convert a database row plus its edges to a contract model.
pub fn entity_to_contract(entity: UserEntity, edges: &mut Edges) -> User {
    User {
        following: edges.following.remove(&entity.id).unwrap_or_default(),
        followers: edges.followers.remove(&entity.id).unwrap_or_default(),
        bookmarks: edges.bookmarks.remove(&entity.id).unwrap_or_default(),
        id: entity.id,
        name: entity.name,
        username: entity.username,
        email: entity.email,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

/// Group `(key, value)` pairs, keeping the input order within each group.
pub fn group_pairs(pairs: impl IntoIterator<Item = (Uuid, Uuid)>) -> HashMap<Uuid, Vec<Uuid>> {
    pairs.into_iter().fold(HashMap::new(), |mut acc, (k, v)| {
        acc.entry(k).or_insert_with(Vec::new).push(v);
        acc
    })
}
