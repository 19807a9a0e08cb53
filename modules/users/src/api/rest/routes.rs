use std::sync::Arc;

use api_errors::MessageBody;
use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::auth::AuthGate;
use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register,
        handlers::login,
        handlers::logout,
        handlers::get_profile,
        handlers::list_other_users,
        handlers::follow,
        handlers::unfollow,
        handlers::toggle_bookmark,
    ),
    components(schemas(
        MessageBody,
        dto::UserDto,
        dto::RegisterReq,
        dto::LoginReq,
        dto::ActorReq,
        dto::LoginResponse,
        dto::ProfileResponse,
        dto::OtherUsersResponse,
    )),
    tags((name = "users", description = "Accounts, sessions, follows and bookmarks"))
)]
pub struct UsersApiDoc;

/// Mount the `/api/v1/user` routes onto `router`.
pub fn register_routes(router: Router, service: Arc<Service>, gate: AuthGate) -> Router {
    let protected = gate.protect(
        Router::new()
            .route("/api/v1/user/profile/{id}", get(handlers::get_profile))
            .route("/api/v1/user/otheruser/{id}", get(handlers::list_other_users))
            .route("/api/v1/user/follow/{id}", post(handlers::follow))
            .route("/api/v1/user/unfollow/{id}", post(handlers::unfollow))
            .route("/api/v1/user/bookmark/{id}", put(handlers::toggle_bookmark)),
    );

    let public = Router::new()
        .route("/api/v1/user/register", post(handlers::register))
        .route("/api/v1/user/login", post(handlers::login))
        .route("/api/v1/user/logout", get(handlers::logout));

    let users = public
        .merge(protected)
        .layer(Extension(service))
        .layer(Extension(gate));

    router.merge(users)
}
