//! HTTP host: owns the listener and wraps every module router in the shared
//! middleware stack.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::{middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Mount the host endpoints next to `routes` and apply the middleware stack.
    ///
    /// `openapi` is only exposed when `enable_docs` is set.
    pub fn build_router(
        &self,
        routes: Router,
        openapi: Option<utoipa::openapi::OpenApi>,
    ) -> Result<Router> {
        let config = self.get_config();

        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes);

        if config.enable_docs {
            if let Some(doc) = openapi {
                let paths = doc.paths.paths.len();
                tracing::info!(paths, "serving OpenAPI document");

                let doc = Arc::new(serde_json::to_value(&doc).context("serialize OpenAPI")?);
                router = router
                    .route(
                        "/openapi.json",
                        get(move || web::serve_openapi(doc.clone())),
                    )
                    .route("/docs", get(web::serve_docs));
            }
        }

        router = router
            .method_not_allowed_fallback(web::method_not_allowed)
            .fallback(web::route_not_found);

        // Outermost to innermost:
        // PropagateRequestId -> SetRequestId -> push_req_id_to_extensions -> Trace
        //   -> envelope_layer_errors -> Timeout -> CORS -> BodyLimit
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

        if let Some(cors) = cors_layer(&config.cors_allowed_origins)? {
            router = router.layer(cors);
        }

        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(from_fn(web::envelope_layer_errors))
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                request_id::MakeReqId,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id));

        Ok(router)
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn serve<F>(&self, addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .context("HTTP server failed")
    }
}

/// Credentialed CORS needs explicit origins, so there is no wildcard mode.
fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static("x-request-id"),
            ]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_origins_means_no_cors() {
        assert!(cors_layer(&[]).unwrap().is_none());
    }

    #[test]
    fn bad_origin_is_reported() {
        let err = cors_layer(&["http://bad\norigin".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid CORS origin"));
    }

    #[test]
    fn docs_need_the_flag() {
        let ingress = ApiIngress::default();
        assert!(!ingress.get_config().enable_docs);
        assert!(ingress
            .build_router(Router::new(), Some(utoipa::openapi::OpenApiBuilder::new().build()))
            .is_ok());
    }
}
