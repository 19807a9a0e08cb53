use std::sync::Arc;

use api_errors::MessageBody;
use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use users::AuthGate;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_tweet,
        handlers::delete_tweet,
        handlers::toggle_like,
        handlers::all_tweets,
        handlers::following_tweets,
    ),
    components(schemas(
        MessageBody,
        users::api::rest::dto::ActorReq,
        dto::AuthorDto,
        dto::TweetDto,
        dto::CreateTweetReq,
        dto::TweetsResponse,
    )),
    tags((name = "tweets", description = "Posts, likes and timelines"))
)]
pub struct TweetsApiDoc;

/// Mount the `/api/v1/tweet` routes onto `router`. All of them need a session.
pub fn register_routes(router: Router, service: Arc<Service>, gate: AuthGate) -> Router {
    let tweets = gate
        .protect(
            Router::new()
                .route("/api/v1/tweet/create", post(handlers::create_tweet))
                .route("/api/v1/tweet/delete/{id}", delete(handlers::delete_tweet))
                .route("/api/v1/tweet/like/{id}", put(handlers::toggle_like))
                .route("/api/v1/tweet/alltweets/{id}", get(handlers::all_tweets))
                .route(
                    "/api/v1/tweet/followingtweets/{id}",
                    get(handlers::following_tweets),
                ),
        )
        .layer(Extension(service));

    router.merge(tweets)
}
