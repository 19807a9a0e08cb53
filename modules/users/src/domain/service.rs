use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewUser, User};
use crate::domain::credentials::{self, TokenService};
use crate::domain::error::DomainError;
use crate::domain::repo::{BookmarkToggle, UserInsert, UsersRepository};

/// Successful login: the user and a freshly signed session token.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Both ends of a follow edge, as they were when the edge changed.
#[derive(Debug, Clone)]
pub struct FollowOutcome {
    pub actor: User,
    pub target: User,
}

/// Domain service with the users business rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    tokens: TokenService,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.tokens.ttl_secs()
    }

    #[instrument(
        name = "users.service.register",
        skip(self, new_user),
        fields(email = %new_user.email, username = %new_user.username)
    )]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        if [
            &new_user.name,
            &new_user.username,
            &new_user.email,
            &new_user.password,
        ]
        .iter()
        .any(|f| is_blank(f))
        {
            return Err(DomainError::MissingFields);
        }

        if self
            .repo
            .email_exists(&new_user.email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::email_already_exists(new_user.email));
        }

        if self
            .repo
            .username_exists(&new_user.username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::username_taken(new_user.username));
        }

        let password = new_user.password;
        let password_hash = tokio::task::spawn_blocking(move || {
            credentials::hash_password(&password)
        })
        .await
        .map_err(|e| DomainError::credentials(e.to_string()))??;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            username: new_user.username,
            email: new_user.email,
            following: Vec::new(),
            followers: Vec::new(),
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let inserted = self
            .repo
            .insert(user.clone(), password_hash)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if inserted == UserInsert::Conflict {
            info!("Unique field claimed by a concurrent registration");
            return Err(self.claimed_field(user.email, user.username).await?);
        }

        info!("Successfully registered user with id={}", user.id);
        Ok(user)
    }

    /// Names the field another registration took between our checks and the insert.
    async fn claimed_field(
        &self,
        email: String,
        username: String,
    ) -> Result<DomainError, DomainError> {
        let email_taken = self
            .repo
            .email_exists(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(if email_taken {
            DomainError::email_already_exists(email)
        } else {
            DomainError::username_taken(username)
        })
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(name = "users.service.login", skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, DomainError> {
        if is_blank(email) || is_blank(password) {
            return Err(DomainError::MissingFields);
        }

        let Some(found) = self
            .repo
            .find_credentials_by_email(email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        else {
            debug!("No user with this email");
            return Err(DomainError::InvalidCredentials);
        };

        let password = password.to_owned();
        let hash = found.password_hash;
        let matches =
            tokio::task::spawn_blocking(move || credentials::verify_password(&password, &hash))
                .await
                .map_err(|e| DomainError::credentials(e.to_string()))?;
        if !matches {
            debug!("Password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(found.user.id)?;
        info!(user_id = %found.user.id, "User logged in");
        Ok(LoginOutcome {
            user: found.user,
            token,
        })
    }

    /// Resolve a session token to the user id it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<Uuid, DomainError> {
        self.tokens.verify(token)
    }

    #[instrument(name = "users.service.get_profile", skip(self), fields(user_id = %id))]
    pub async fn get_profile(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users.service.list_other_users", skip(self), fields(user_id = %id))]
    pub async fn list_other_users(&self, id: Uuid) -> Result<Vec<User>, DomainError> {
        let users = self
            .repo
            .list_except(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Found {} other users", users.len());
        Ok(users)
    }

    #[instrument(name = "users.service.following", skip(self), fields(user_id = %id))]
    pub async fn following(&self, id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        self.repo
            .following_of(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(
        name = "users.service.follow",
        skip(self),
        fields(actor_id = %actor_id, target_id = %target_id)
    )]
    pub async fn follow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<FollowOutcome, DomainError> {
        if actor_id == target_id {
            return Err(DomainError::SelfFollow);
        }
        let (actor, target) = self.load_pair(actor_id, target_id).await?;

        let added = self
            .repo
            .add_follow(actor_id, target_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !added {
            return Err(DomainError::already_following(target.name));
        }

        info!("{} followed {}", actor.username, target.username);
        Ok(FollowOutcome { actor, target })
    }

    #[instrument(
        name = "users.service.unfollow",
        skip(self),
        fields(actor_id = %actor_id, target_id = %target_id)
    )]
    pub async fn unfollow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<FollowOutcome, DomainError> {
        let (actor, target) = self.load_pair(actor_id, target_id).await?;

        let removed = self
            .repo
            .remove_follow(actor_id, target_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !removed {
            return Err(DomainError::NotFollowing);
        }

        info!("{} unfollowed {}", actor.username, target.username);
        Ok(FollowOutcome { actor, target })
    }

    #[instrument(
        name = "users.service.toggle_bookmark",
        skip(self),
        fields(user_id = %actor_id, tweet_id = %tweet_id)
    )]
    pub async fn toggle_bookmark(
        &self,
        actor_id: Uuid,
        tweet_id: Uuid,
    ) -> Result<BookmarkToggle, DomainError> {
        self.get_profile(actor_id).await?;

        let toggled = self
            .repo
            .toggle_bookmark(actor_id, tweet_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(?toggled, "Bookmark toggled");
        Ok(toggled)
    }

    // Target is checked first so a missing target reports its own id.
    async fn load_pair(&self, actor_id: Uuid, target_id: Uuid) -> Result<(User, User), DomainError> {
        let target = self.get_profile(target_id).await?;
        let actor = self.get_profile(actor_id).await?;
        Ok((actor, target))
    }
}
