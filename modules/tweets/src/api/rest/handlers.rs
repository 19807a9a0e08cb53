use std::sync::Arc;

use api_errors::{reply, ApiError, MessageBody, INVALID_REQUEST};
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use users::api::rest::dto::ActorReq;
use users::{actor_from_body, AuthenticatedUser};
use uuid::Uuid;

use crate::api::rest::dto::{CreateTweetReq, TweetDto, TweetsResponse};
use crate::contract::model::{NewTweet, TimelineScope};
use crate::domain::repo::LikeToggle;
use crate::domain::service::Service;

/// Blank or absent author is a missing field; anything else must be a UUID.
fn parse_author(raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| INVALID_REQUEST.to_error()),
    }
}

/// Create a tweet
#[utoipa::path(
    post,
    path = "/api/v1/tweet/create",
    tag = "tweets",
    request_body = CreateTweetReq,
    responses(
        (status = 201, description = "Tweet created", body = MessageBody),
        (status = 400, description = "Missing description or author", body = MessageBody),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "Author not found", body = MessageBody)
    )
)]
pub async fn create_tweet(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateTweetReq>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let new_tweet = NewTweet {
        user_id: parse_author(req.id.as_deref())?,
        description: req.description.unwrap_or_default(),
    };

    svc.create(new_tweet).await?;
    Ok(reply(StatusCode::CREATED, "Tweet created successfully."))
}

/// Delete a tweet. Succeeds whether or not it existed.
#[utoipa::path(
    delete,
    path = "/api/v1/tweet/delete/{id}",
    tag = "tweets",
    params(("id" = Uuid, Path, description = "Tweet id")),
    responses(
        (status = 200, description = "Tweet deleted", body = MessageBody),
        (status = 401, description = "Not authenticated", body = MessageBody)
    )
)]
pub async fn delete_tweet(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    svc.delete(id).await?;
    Ok(reply(StatusCode::OK, "Tweet deleted successfully."))
}

/// Like or unlike a tweet
#[utoipa::path(
    put,
    path = "/api/v1/tweet/like/{id}",
    tag = "tweets",
    params(("id" = Uuid, Path, description = "Tweet id")),
    request_body(content = ActorReq, description = "Acting user; defaults to the session user"),
    responses(
        (status = 200, description = "Like toggled", body = MessageBody),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "Tweet not found", body = MessageBody)
    )
)]
pub async fn toggle_like(
    Extension(svc): Extension<Arc<Service>>,
    Extension(session): Extension<AuthenticatedUser>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Path(tweet_id) = path?;
    let actor_id = actor_from_body(&body, session)?;

    let message = match svc.toggle_like(tweet_id, actor_id).await? {
        LikeToggle::Liked => "User liked your tweet.",
        LikeToggle::Disliked => "User disliked your tweet.",
    };
    Ok(reply(StatusCode::OK, message))
}

/// A user's tweets followed by the tweets of everyone they follow
#[utoipa::path(
    get,
    path = "/api/v1/tweet/alltweets/{id}",
    tag = "tweets",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Timeline", body = TweetsResponse),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody)
    )
)]
pub async fn all_tweets(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TweetsResponse>, ApiError> {
    let Path(id) = path?;
    timeline(&svc, id, TimelineScope::WithOwn).await
}

/// Only the tweets of users the given user follows
#[utoipa::path(
    get,
    path = "/api/v1/tweet/followingtweets/{id}",
    tag = "tweets",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Following timeline", body = TweetsResponse),
        (status = 401, description = "Not authenticated", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody)
    )
)]
pub async fn following_tweets(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TweetsResponse>, ApiError> {
    let Path(id) = path?;
    timeline(&svc, id, TimelineScope::FollowingOnly).await
}

async fn timeline(
    svc: &Service,
    id: Uuid,
    scope: TimelineScope,
) -> Result<Json<TweetsResponse>, ApiError> {
    let tweets = svc.timeline(id, scope).await?;
    Ok(Json(TweetsResponse {
        success: true,
        tweets: tweets.into_iter().map(TweetDto::from).collect(),
    }))
}
