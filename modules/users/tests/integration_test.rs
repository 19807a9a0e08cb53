//! Integration-style tests for the users module.
//!
//! - Each test runs on a fresh in-memory SQLite DB and applies migrations.
//! - Service is constructed with a SeaORM-backed repository.
//! - REST layer is exercised via an Axum Router registered through real routes.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use users::{
    api::rest::{
        auth::{AuthGate, CookieSettings},
        routes,
    },
    contract::{
        client::UsersApi,
        model::{NewUser, User},
        UsersError,
    },
    domain::{
        credentials::TokenService,
        error::DomainError,
        repo::{BookmarkToggle, UserInsert, UsersRepository},
        service::Service,
    },
    gateways::local::UsersLocalClient,
    infra::storage::{entity::user, migrations::Migrator, sea_orm_repo::SeaOrmUsersRepository},
};

const SECRET: &str = "integration-test-secret";

/// Create a fresh test database for each test (in-memory SQLite) and run migrations.
async fn create_test_db() -> DatabaseConnection {
    // One connection, so every query and transaction sees the same in-memory database.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

async fn create_test_service() -> Arc<Service> {
    let db = create_test_db().await;
    let repo = SeaOrmUsersRepository::new(db);
    Arc::new(Service::new(
        Arc::new(repo),
        TokenService::new(SECRET, 86_400),
    ))
}

fn gate_for(service: Arc<Service>) -> AuthGate {
    AuthGate::new(
        service,
        CookieSettings {
            name: "token".into(),
            secure: false,
            max_age_secs: 86_400,
        },
    )
}

async fn create_test_router() -> (Router, Arc<Service>) {
    let service = create_test_service().await;
    let router = routes::register_routes(Router::new(), service.clone(), gate_for(service.clone()));
    (router, service)
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        password: "secret123".to_string(),
    }
}

async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

/// `token=...` pair from the Set-Cookie header.
fn session_pair(resp: &Response) -> String {
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header");
    set_cookie.split(';').next().unwrap().trim().to_string()
}

/// Register through the service and log in over HTTP; returns the cookie pair.
async fn login_cookie(router: &Router, svc: &Service, name: &str) -> (Uuid, String) {
    let user = svc.register(new_user(name)).await.unwrap();
    let resp = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/user/login",
            None,
            json!({ "email": user.email, "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    (user.id, session_pair(&resp))
}

// ---------------- service ----------------

#[tokio::test]
async fn register_rejects_duplicates_without_mutation() -> Result<()> {
    let service = create_test_service().await;

    let ann = service.register(new_user("Ann")).await?;
    assert_eq!(ann.username, "ann");

    let err = service.register(new_user("Ann")).await.unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));

    let mut same_username = new_user("Ann");
    same_username.email = "other@example.com".into();
    let err = service.register(same_username).await.unwrap_err();
    assert!(matches!(err, DomainError::UsernameTaken { .. }));

    // Only Ann exists: everyone-but-a-stranger is exactly one user.
    let all = service.list_other_users(Uuid::new_v4()).await?;
    assert_eq!(all.len(), 1);
    Ok(())
}

#[tokio::test]
async fn insert_violating_unique_fields_reports_conflict() -> Result<()> {
    let db = create_test_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    let service = Service::new(
        Arc::new(SeaOrmUsersRepository::new(db)),
        TokenService::new(SECRET, 86_400),
    );
    let ann = service.register(new_user("Ann")).await?;

    let twin = |username: &str, email: &str| User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        ..ann.clone()
    };
    assert_eq!(
        repo.insert(twin("ann2", "ann@example.com"), "h".into()).await?,
        UserInsert::Conflict
    );
    assert_eq!(
        repo.insert(twin("ann", "ann2@example.com"), "h".into()).await?,
        UserInsert::Conflict
    );
    assert_eq!(
        repo.insert(twin("ann2", "ann2@example.com"), "h".into()).await?,
        UserInsert::Created
    );
    Ok(())
}

#[tokio::test]
async fn other_users_beyond_one_query_keep_their_edges() -> Result<()> {
    let db = create_test_db().await;
    let service = Service::new(
        Arc::new(SeaOrmUsersRepository::new(db.clone())),
        TokenService::new(SECRET, 86_400),
    );

    let base = DateTime::from_timestamp(1_767_225_600, 0).unwrap();
    let ids: Vec<Uuid> = (0..12_000).map(|_| Uuid::new_v4()).collect();
    for (n, batch) in ids.chunks(1_000).enumerate() {
        let rows = batch.iter().enumerate().map(|(i, id)| {
            let k = n * 1_000 + i;
            user::ActiveModel {
                id: Set(*id),
                name: Set(format!("User {k}")),
                username: Set(format!("user{k}")),
                email: Set(format!("user{k}@example.com")),
                password_hash: Set("x".into()),
                created_at: Set(base + Duration::milliseconds(k as i64)),
                updated_at: Set(base),
            }
        });
        user::Entity::insert_many(rows).exec_without_returning(&db).await?;
    }

    let ann = service.register(new_user("Ann")).await?;
    let target = ids[11_500];
    service.follow(ann.id, target).await?;

    let others = service.list_other_users(ann.id).await?;
    assert_eq!(others.len(), 12_000);
    assert_eq!(others[0].id, ids[0]);
    assert_eq!(others[11_500].id, target);
    assert_eq!(others[11_500].followers, vec![ann.id]);
    assert_eq!(others.iter().filter(|u| !u.followers.is_empty()).count(), 1);
    Ok(())
}

#[tokio::test]
async fn register_requires_every_field() {
    let service = create_test_service().await;

    for blank in ["name", "username", "email", "password"] {
        let mut u = new_user("Ann");
        match blank {
            "name" => u.name = "  ".into(),
            "username" => u.username.clear(),
            "email" => u.email.clear(),
            _ => u.password.clear(),
        }
        let err = service.register(u).await.unwrap_err();
        assert!(matches!(err, DomainError::MissingFields), "{blank}");
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let service = create_test_service().await;
    service.register(new_user("Ann")).await?;

    let wrong_password = service
        .login("ann@example.com", "nope")
        .await
        .unwrap_err();
    let unknown_email = service
        .login("ghost@example.com", "secret123")
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, DomainError::InvalidCredentials));
    assert!(matches!(unknown_email, DomainError::InvalidCredentials));

    let ok = service.login("ann@example.com", "secret123").await?;
    assert_eq!(service.authenticate(&ok.token)?, ok.user.id);
    Ok(())
}

#[tokio::test]
async fn follow_then_unfollow_restores_both_sides() -> Result<()> {
    let service = create_test_service().await;
    let a = service.register(new_user("Ann")).await?;
    let b = service.register(new_user("Bob")).await?;

    let outcome = service.follow(a.id, b.id).await?;
    assert_eq!(outcome.actor.name, "Ann");
    assert_eq!(outcome.target.name, "Bob");

    assert_eq!(service.get_profile(a.id).await?.following, vec![b.id]);
    assert_eq!(service.get_profile(b.id).await?.followers, vec![a.id]);

    let err = service.follow(a.id, b.id).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyFollowing { ref target_name } if target_name == "Bob"));

    service.unfollow(a.id, b.id).await?;
    assert!(service.get_profile(a.id).await?.following.is_empty());
    assert!(service.get_profile(b.id).await?.followers.is_empty());

    let err = service.unfollow(a.id, b.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFollowing));
    Ok(())
}

#[tokio::test]
async fn follow_edge_cases() -> Result<()> {
    let service = create_test_service().await;
    let a = service.register(new_user("Ann")).await?;

    let err = service.follow(a.id, a.id).await.unwrap_err();
    assert!(matches!(err, DomainError::SelfFollow));

    let ghost = Uuid::new_v4();
    let err = service.follow(a.id, ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound { id } if id == ghost));
    Ok(())
}

#[tokio::test]
async fn bookmark_toggle_is_an_involution() -> Result<()> {
    let service = create_test_service().await;
    let a = service.register(new_user("Ann")).await?;
    let tweet = Uuid::new_v4();

    assert_eq!(service.toggle_bookmark(a.id, tweet).await?, BookmarkToggle::Saved);
    assert_eq!(service.get_profile(a.id).await?.bookmarks, vec![tweet]);

    assert_eq!(service.toggle_bookmark(a.id, tweet).await?, BookmarkToggle::Removed);
    assert!(service.get_profile(a.id).await?.bookmarks.is_empty());

    let err = service
        .toggle_bookmark(Uuid::new_v4(), tweet)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn local_client_exposes_users_and_following() -> Result<()> {
    let service = create_test_service().await;
    let a = service.register(new_user("Ann")).await?;
    let b = service.register(new_user("Bob")).await?;
    service.follow(a.id, b.id).await?;

    let client: Arc<dyn UsersApi> = Arc::new(UsersLocalClient::new(service));
    assert_eq!(client.get_user(b.id).await?.name, "Bob");
    assert_eq!(client.following(a.id).await?, vec![b.id]);

    let ghost = Uuid::new_v4();
    assert_eq!(
        client.get_user(ghost).await.unwrap_err(),
        UsersError::NotFound { id: ghost }
    );
    assert!(client.following(ghost).await.is_err());
    Ok(())
}

// ---------------- REST ----------------

#[tokio::test]
async fn rest_register_twice() {
    let (router, _) = create_test_router().await;
    let body = json!({
        "name": "Ann", "username": "ann", "email": "ann@example.com", "password": "pw"
    });

    let resp = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/user/register", None, body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["message"], "Account created successfully.");

    let resp = router
        .oneshot(json_request(Method::POST, "/api/v1/user/register", None, body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "User already exists.");
}

#[tokio::test]
async fn rest_register_missing_field() {
    let (router, _) = create_test_router().await;
    let resp = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/user/register",
            None,
            json!({ "name": "Ann", "email": "ann@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "All fields are required.");
}

#[tokio::test]
async fn rest_malformed_json_is_400() {
    let (router, _) = create_test_router().await;
    let resp = router
        .oneshot(
            Request::post("/api/v1/user/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Invalid request.");
}

#[tokio::test]
async fn rest_login_sets_cookie_and_uniform_401() {
    let (router, svc) = create_test_router().await;
    svc.register(new_user("Ann")).await.unwrap();

    let resp = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/user/login",
            None,
            json!({ "email": "ann@example.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    let v = body_json(resp).await;
    assert_eq!(v["message"], "Welcome back Ann");
    assert_eq!(v["user"]["username"], "ann");
    assert!(v["user"].get("passwordHash").is_none());

    let mut messages = Vec::new();
    for (email, password) in [
        ("ann@example.com", "wrong"),
        ("nobody@example.com", "secret123"),
    ] {
        let resp = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/user/login",
                None,
                json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        messages.push(body_json(resp).await["message"].clone());
    }
    assert_eq!(messages[0], messages[1]);
    assert_eq!(messages[0], "Incorrect email or password.");
}

#[tokio::test]
async fn rest_logout_clears_cookie() {
    let (router, _) = create_test_router().await;
    let resp = router
        .oneshot(get_request("/api/v1/user/logout", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("1970"));
    assert_eq!(
        body_json(resp).await["message"],
        "User logged out successfully."
    );
}

#[tokio::test]
async fn rest_protected_routes_need_a_session() {
    let (router, svc) = create_test_router().await;
    let ann = svc.register(new_user("Ann")).await.unwrap();
    let uri = format!("/api/v1/user/profile/{}", ann.id);

    for cookie in [None, Some("token=garbage"), Some("other=1")] {
        let resp = router
            .clone()
            .oneshot(get_request(&uri, cookie))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["message"], "User not authenticated.");
    }

    let foreign = TokenService::new("someone-else", 60).issue(ann.id).unwrap();
    let resp = router
        .oneshot(get_request(&uri, Some(&format!("token={foreign}"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rest_profile_and_other_users() {
    let (router, svc) = create_test_router().await;
    let (ann_id, cookie) = login_cookie(&router, &svc, "Ann").await;
    let bob = svc.register(new_user("Bob")).await.unwrap();

    let resp = router
        .clone()
        .oneshot(get_request(
            &format!("/api/v1/user/profile/{ann_id}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["user"]["id"], ann_id.to_string());

    let resp = router
        .clone()
        .oneshot(get_request(
            &format!("/api/v1/user/otheruser/{ann_id}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    let v = body_json(resp).await;
    let others = v["otherUsers"].as_array().unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0]["id"], bob.id.to_string());

    let resp = router
        .clone()
        .oneshot(get_request(
            &format!("/api/v1/user/profile/{}", Uuid::new_v4()),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "User not found.");

    let resp = router
        .oneshot(get_request("/api/v1/user/profile/not-a-uuid", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Invalid request.");
}

#[tokio::test]
async fn rest_follow_unfollow_messages() {
    let (router, svc) = create_test_router().await;
    let (ann_id, cookie) = login_cookie(&router, &svc, "Ann").await;
    let bob = svc.register(new_user("Bob")).await.unwrap();
    let follow_uri = format!("/api/v1/user/follow/{}", bob.id);

    // Explicit actor in the body
    let resp = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &follow_uri,
            Some(&cookie),
            json!({ "id": ann_id }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Ann followed Bob");

    // Actor from the session
    let resp = router
        .clone()
        .oneshot(
            Request::post(&follow_uri)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "You already follow Bob");

    let resp = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/user/unfollow/{}", bob.id),
            Some(&cookie),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Ann unfollowed Bob");

    let resp = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/user/unfollow/{}", bob.id),
            Some(&cookie),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["message"],
        "You are not following this user."
    );
}

#[tokio::test]
async fn rest_bookmark_toggle_messages() {
    let (router, svc) = create_test_router().await;
    let (_, cookie) = login_cookie(&router, &svc, "Ann").await;
    let uri = format!("/api/v1/user/bookmark/{}", Uuid::new_v4());

    let mut messages = Vec::new();
    for _ in 0..2 {
        let resp = router
            .clone()
            .oneshot(json_request(Method::PUT, &uri, Some(&cookie), json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        messages.push(body_json(resp).await["message"].clone());
    }
    assert_eq!(messages, vec!["Saved to bookmarks.", "Removed from bookmarks."]);
}
