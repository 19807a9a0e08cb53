use std::sync::Arc;

use api_errors::{reply, ApiError, MessageBody};
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::auth::{actor_from_body, AuthGate, AuthenticatedUser};
use crate::api::rest::dto::{
    ActorReq, LoginReq, LoginResponse, OtherUsersResponse, ProfileResponse, RegisterReq, UserDto,
};
use crate::domain::repo::BookmarkToggle;
use crate::domain::service::Service;

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/user/register",
    tag = "users",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = MessageBody),
        (status = 400, description = "Missing field or duplicate email/username", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody)
    )
)]
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<RegisterReq>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    svc.register(req.into()).await?;
    Ok(reply(StatusCode::CREATED, "Account created successfully."))
}

/// Log in and receive the session cookie
#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    tag = "users",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 400, description = "Missing field", body = MessageBody),
        (status = 401, description = "Incorrect email or password", body = MessageBody)
    )
)]
pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    Extension(gate): Extension<AuthGate>,
    payload: Result<Json<LoginReq>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let outcome = svc.login(&email, &password).await?;
    let cookie = gate.session_cookie(&outcome.token)?;

    let body = LoginResponse {
        success: true,
        message: format!("Welcome back {}", outcome.user.name),
        user: UserDto::from(outcome.user),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Clear the session cookie
#[utoipa::path(
    get,
    path = "/api/v1/user/logout",
    tag = "users",
    responses((status = 200, description = "Session cookie cleared", body = MessageBody))
)]
pub async fn logout(Extension(gate): Extension<AuthGate>) -> Result<Response, ApiError> {
    let cookie = gate.cleared_cookie()?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        reply(StatusCode::OK, "User logged out successfully."),
    )
        .into_response())
}

/// Get a user's profile
#[utoipa::path(
    get,
    path = "/api/v1/user/profile/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = ProfileResponse),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody)
    )
)]
pub async fn get_profile(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Path(id) = path?;
    let user = svc.get_profile(id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}

/// List every user except the given one
#[utoipa::path(
    get,
    path = "/api/v1/user/otheruser/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id to exclude")),
    responses(
        (status = 200, description = "Other users", body = OtherUsersResponse),
        (status = 401, description = "Not authenticated", body = MessageBody)
    )
)]
pub async fn list_other_users(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OtherUsersResponse>, ApiError> {
    let Path(id) = path?;
    let users = svc.list_other_users(id).await?;
    Ok(Json(OtherUsersResponse {
        success: true,
        other_users: users.into_iter().map(UserDto::from).collect(),
    }))
}

/// Follow a user
#[utoipa::path(
    post,
    path = "/api/v1/user/follow/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User to follow")),
    request_body(content = ActorReq, description = "Acting user; defaults to the session user"),
    responses(
        (status = 200, description = "Followed", body = MessageBody),
        (status = 400, description = "Already following or self-follow", body = MessageBody),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody)
    )
)]
pub async fn follow(
    Extension(svc): Extension<Arc<Service>>,
    Extension(session): Extension<AuthenticatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Path(target_id) = path?;
    let actor_id = actor_from_body(&body, session)?;

    let outcome = svc.follow(actor_id, target_id).await?;
    info!(%actor_id, %target_id, "follow edge created");
    Ok(reply(
        StatusCode::OK,
        format!("{} followed {}", outcome.actor.name, outcome.target.name),
    ))
}

/// Unfollow a user
#[utoipa::path(
    post,
    path = "/api/v1/user/unfollow/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User to unfollow")),
    request_body(content = ActorReq, description = "Acting user; defaults to the session user"),
    responses(
        (status = 200, description = "Unfollowed", body = MessageBody),
        (status = 400, description = "Not following", body = MessageBody),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody)
    )
)]
pub async fn unfollow(
    Extension(svc): Extension<Arc<Service>>,
    Extension(session): Extension<AuthenticatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Path(target_id) = path?;
    let actor_id = actor_from_body(&body, session)?;

    let outcome = svc.unfollow(actor_id, target_id).await?;
    info!(%actor_id, %target_id, "follow edge removed");
    Ok(reply(
        StatusCode::OK,
        format!("{} unfollowed {}", outcome.actor.name, outcome.target.name),
    ))
}

/// Save or remove a tweet bookmark
#[utoipa::path(
    put,
    path = "/api/v1/user/bookmark/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "Tweet id")),
    request_body(content = ActorReq, description = "Acting user; defaults to the session user"),
    responses(
        (status = 200, description = "Bookmark toggled", body = MessageBody),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody)
    )
)]
pub async fn toggle_bookmark(
    Extension(svc): Extension<Arc<Service>>,
    Extension(session): Extension<AuthenticatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Path(tweet_id) = path?;
    let actor_id = actor_from_body(&body, session)?;

    let message = match svc.toggle_bookmark(actor_id, tweet_id).await? {
        BookmarkToggle::Saved => "Saved to bookmarks.",
        BookmarkToggle::Removed => "Removed from bookmarks.",
    };
    Ok(reply(StatusCode::OK, message))
}
