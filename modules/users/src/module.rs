use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::auth::{AuthGate, CookieSettings};
use crate::api::rest::routes::{self, UsersApiDoc};
use crate::config::UsersConfig;
use crate::contract::client::UsersApi;
use crate::domain::credentials::TokenService;
use crate::domain::service::Service;
use crate::gateways::local::UsersLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// Users module: owns the user store, sessions and the social graph.
#[derive(Default)]
pub struct UsersModule {
    // Keep the domain service behind ArcSwap for cheap read-mostly access.
    service: ArcSwapOption<Service>,
    gate: ArcSwapOption<AuthGate>,
}

impl UsersModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users database migrations");
        Migrator::up(db, None)
            .await
            .context("users migrations failed")?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    /// Wire repository, token service and auth gate. Fails on an invalid config.
    pub fn init(&self, db: DatabaseConnection, cfg: UsersConfig) -> anyhow::Result<()> {
        info!("Initializing users module");
        cfg.validate()?;
        debug!(
            "Loaded users config: token_ttl_secs={}, cookie_name={}",
            cfg.token_ttl_secs, cfg.cookie_name
        );

        let repo = SeaOrmUsersRepository::new(db);
        let tokens = TokenService::new(&cfg.token_secret, cfg.token_ttl_secs);
        let service = Arc::new(Service::new(Arc::new(repo), tokens));

        let gate = AuthGate::new(
            service.clone(),
            CookieSettings {
                name: cfg.cookie_name,
                secure: cfg.cookie_secure,
                max_age_secs: cfg.token_ttl_secs,
            },
        );

        self.service.store(Some(service));
        self.gate.store(Some(Arc::new(gate)));
        Ok(())
    }

    fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("users module not initialized"))
    }

    /// In-process client for other modules.
    pub fn client(&self) -> anyhow::Result<Arc<dyn UsersApi>> {
        Ok(Arc::new(UsersLocalClient::new(self.service()?)))
    }

    /// Session gate for other modules' protected routes.
    pub fn auth_gate(&self) -> anyhow::Result<AuthGate> {
        self.gate
            .load_full()
            .map(|g| (*g).clone())
            .ok_or_else(|| anyhow::anyhow!("users module not initialized"))
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering users REST routes");
        let router = routes::register_routes(router, self.service()?, self.auth_gate()?);
        info!("Users REST routes registered successfully");
        Ok(router)
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        UsersApiDoc::openapi()
    }
}
