//! Tests to verify that the service layer emits expected tracing spans

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use tracing_test::traced_test;
use uuid::Uuid;

use users::contract::model::User;
use users::domain::credentials::TokenService;
use users::domain::error::DomainError;
use users::domain::repo::{BookmarkToggle, UserCredentials, UserInsert, UsersRepository};
use users::domain::service::Service;

const ANN: &str = "550e8400-e29b-41d4-a716-446655440000";
const BOB: &str = "550e8400-e29b-41d4-a716-446655440001";

fn user(id: &str, name: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::parse_str(id).unwrap(),
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        following: vec![],
        followers: vec![],
        bookmarks: vec![],
        created_at: now,
        updated_at: now,
    }
}

/// Field another registration commits between the existence checks and our insert.
#[derive(Clone, Copy)]
enum Race {
    Email,
    Username,
}

// Mock repository for testing
struct MockUsersRepository {
    users: Vec<User>,
    edges: Mutex<Vec<(Uuid, Uuid)>>,
    race: Option<Race>,
    claimed: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl MockUsersRepository {
    fn new() -> Self {
        Self {
            users: vec![user(ANN, "Ann"), user(BOB, "Bob")],
            edges: Mutex::new(Vec::new()),
            race: None,
            claimed: Mutex::new(Vec::new()),
        }
    }

    fn losing(race: Race) -> Self {
        Self {
            race: Some(race),
            ..Self::new()
        }
    }
}

#[async_trait::async_trait]
impl UsersRepository for MockUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_credentials_by_email(&self, _email: &str) -> Result<Option<UserCredentials>> {
        Ok(None)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let claimed = self.claimed.lock().unwrap();
        Ok(self.users.iter().any(|u| u.email == email)
            || claimed.iter().any(|(e, _)| e.as_deref() == Some(email)))
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let claimed = self.claimed.lock().unwrap();
        Ok(self.users.iter().any(|u| u.username == username)
            || claimed.iter().any(|(_, n)| n.as_deref() == Some(username)))
    }

    async fn insert(&self, user: User, _password_hash: String) -> Result<UserInsert> {
        let mut claimed = self.claimed.lock().unwrap();
        match self.race {
            None => Ok(UserInsert::Created),
            Some(Race::Email) => {
                claimed.push((Some(user.email), None));
                Ok(UserInsert::Conflict)
            }
            Some(Race::Username) => {
                claimed.push((None, Some(user.username)));
                Ok(UserInsert::Conflict)
            }
        }
    }

    async fn list_except(&self, id: Uuid) -> Result<Vec<User>> {
        Ok(self.users.iter().filter(|u| u.id != id).cloned().collect())
    }

    async fn following_of(&self, id: Uuid) -> Result<Option<Vec<Uuid>>> {
        Ok(Some(
            self.edges
                .lock()
                .unwrap()
                .iter()
                .filter(|(a, _)| *a == id)
                .map(|(_, b)| *b)
                .collect(),
        ))
    }

    async fn add_follow(&self, follower: Uuid, followee: Uuid) -> Result<bool> {
        let mut edges = self.edges.lock().unwrap();
        if edges.contains(&(follower, followee)) {
            return Ok(false);
        }
        edges.push((follower, followee));
        Ok(true)
    }

    async fn remove_follow(&self, follower: Uuid, followee: Uuid) -> Result<bool> {
        let mut edges = self.edges.lock().unwrap();
        let before = edges.len();
        edges.retain(|e| *e != (follower, followee));
        Ok(edges.len() < before)
    }

    async fn toggle_bookmark(&self, _user_id: Uuid, _tweet_id: Uuid) -> Result<BookmarkToggle> {
        Ok(BookmarkToggle::Saved)
    }
}

/// Repository whose every call fails, to observe the error path.
struct BrokenRepository;

#[async_trait::async_trait]
impl UsersRepository for BrokenRepository {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>> {
        anyhow::bail!("connection refused")
    }
    async fn find_credentials_by_email(&self, _email: &str) -> Result<Option<UserCredentials>> {
        anyhow::bail!("connection refused")
    }
    async fn email_exists(&self, _email: &str) -> Result<bool> {
        anyhow::bail!("connection refused")
    }
    async fn username_exists(&self, _username: &str) -> Result<bool> {
        anyhow::bail!("connection refused")
    }
    async fn insert(&self, _user: User, _password_hash: String) -> Result<UserInsert> {
        anyhow::bail!("connection refused")
    }
    async fn list_except(&self, _id: Uuid) -> Result<Vec<User>> {
        anyhow::bail!("connection refused")
    }
    async fn following_of(&self, _id: Uuid) -> Result<Option<Vec<Uuid>>> {
        anyhow::bail!("connection refused")
    }
    async fn add_follow(&self, _follower: Uuid, _followee: Uuid) -> Result<bool> {
        anyhow::bail!("connection refused")
    }
    async fn remove_follow(&self, _follower: Uuid, _followee: Uuid) -> Result<bool> {
        anyhow::bail!("connection refused")
    }
    async fn toggle_bookmark(&self, _user_id: Uuid, _tweet_id: Uuid) -> Result<BookmarkToggle> {
        anyhow::bail!("connection refused")
    }
}

fn service_with(repo: Arc<dyn UsersRepository>) -> Service {
    Service::new(repo, TokenService::new("tracing-test", 60))
}

#[traced_test]
#[tokio::test]
async fn get_profile_emits_spans() {
    let service = service_with(Arc::new(MockUsersRepository::new()));

    let result = service.get_profile(Uuid::parse_str(ANN).unwrap()).await;

    assert!(result.is_ok());
    assert!(logs_contain("users.service.get_profile"));
    assert!(logs_contain(ANN));
}

#[traced_test]
#[tokio::test]
async fn follow_emits_spans_and_logs() {
    let service = service_with(Arc::new(MockUsersRepository::new()));
    let (ann, bob) = (Uuid::parse_str(ANN).unwrap(), Uuid::parse_str(BOB).unwrap());

    service.follow(ann, bob).await.unwrap();

    assert!(logs_contain("users.service.follow"));
    assert!(logs_contain("ann followed bob"));
}

#[traced_test]
#[tokio::test]
async fn register_duplicate_is_rejected_before_hashing() {
    let service = service_with(Arc::new(MockUsersRepository::new()));

    let err = service
        .register(users::contract::model::NewUser {
            name: "Ann".into(),
            username: "ann2".into(),
            email: "ann@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));
    assert!(logs_contain("users.service.register"));
    assert!(!logs_contain("Successfully registered"));
}

fn carl() -> users::contract::model::NewUser {
    users::contract::model::NewUser {
        name: "Carl".into(),
        username: "carl".into(),
        email: "carl@example.com".into(),
        password: "pw".into(),
    }
}

#[traced_test]
#[tokio::test]
async fn register_losing_email_race_reports_the_email() {
    let service = service_with(Arc::new(MockUsersRepository::losing(Race::Email)));

    let err = service.register(carl()).await.unwrap_err();

    match err {
        DomainError::EmailAlreadyExists { email } => assert_eq!(email, "carl@example.com"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(logs_contain("Unique field claimed by a concurrent registration"));
    assert!(!logs_contain("Successfully registered"));
}

#[tokio::test]
async fn register_losing_username_race_reports_the_username() {
    let service = service_with(Arc::new(MockUsersRepository::losing(Race::Username)));

    let err = service.register(carl()).await.unwrap_err();

    match err {
        DomainError::UsernameTaken { username } => assert_eq!(username, "carl"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[traced_test]
#[tokio::test]
async fn storage_failures_surface_as_database_errors() {
    let service = service_with(Arc::new(BrokenRepository));

    let err = service
        .list_other_users(Uuid::new_v4())
        .await
        .unwrap_err();

    match err {
        DomainError::Database { message } => assert!(message.contains("connection refused")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(logs_contain("users.service.list_other_users"));
}
