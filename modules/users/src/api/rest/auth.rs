//! Cookie session gate shared by every module that mounts protected routes.

use std::sync::Arc;

use api_errors::{ApiError, INVALID_REQUEST};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::Response,
    Router,
};
use uuid::Uuid;

use crate::api::rest::dto::ActorReq;
use crate::domain::service::Service;
use crate::errors::NOT_AUTHENTICATED;

/// Id of the user whose session token accompanied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    pub max_age_secs: i64,
}

/// Verifies the session cookie and writes/clears it.
#[derive(Clone)]
pub struct AuthGate {
    service: Arc<Service>,
    cookie: Arc<CookieSettings>,
}

impl AuthGate {
    pub fn new(service: Arc<Service>, cookie: CookieSettings) -> Self {
        Self {
            service,
            cookie: Arc::new(cookie),
        }
    }

    /// Put every route already on `router` behind the session check.
    /// Routes added afterwards, and the fallback, stay public.
    pub fn protect<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(self.clone(), require_auth))
    }

    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, ApiError> {
        let c = &self.cookie;
        HeaderValue::from_str(&format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax{}",
            c.name,
            token,
            c.max_age_secs,
            secure_attr(c.secure)
        ))
        .map_err(ApiError::internal)
    }

    /// Overwrites the session cookie with an already-expired empty one.
    pub fn cleared_cookie(&self) -> Result<HeaderValue, ApiError> {
        let c = &self.cookie;
        HeaderValue::from_str(&format!(
            "{}=; HttpOnly; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax{}",
            c.name,
            secure_attr(c.secure)
        ))
        .map_err(ApiError::internal)
    }

    fn token_from<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie.name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

fn secure_attr(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}

pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = gate.token_from(req.headers()) else {
        tracing::debug!("request without session cookie");
        return Err(NOT_AUTHENTICATED.to_error());
    };

    let user_id = gate.service.authenticate(token).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        NOT_AUTHENTICATED.to_error()
    })?;

    tracing::Span::current().record("user_id", tracing::field::display(user_id));
    req.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(req).await)
}

/// Acting user for a mutation: the body `id` when given, else the session user.
/// An empty body is accepted.
pub fn actor_from_body(body: &[u8], session: AuthenticatedUser) -> Result<Uuid, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(session.0);
    }
    let req: ActorReq = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "malformed actor body");
        INVALID_REQUEST.to_error()
    })?;
    Ok(req.id.unwrap_or(session.0))
}
