use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use users::contract::UsersApi;
use users::AuthGate;
use utoipa::OpenApi;

use crate::api::rest::routes::{self, TweetsApiDoc};
use crate::domain::service::Service;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmTweetsRepository;

/// Tweets module: posts, likes and timelines. Depends on the users contract.
#[derive(Default)]
pub struct TweetsModule {
    service: ArcSwapOption<Service>,
}

impl TweetsModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running tweets database migrations");
        Migrator::up(db, None)
            .await
            .context("tweets migrations failed")?;
        info!("Tweets database migrations completed successfully");
        Ok(())
    }

    pub fn init(&self, db: DatabaseConnection, users: Arc<dyn UsersApi>) -> anyhow::Result<()> {
        info!("Initializing tweets module");
        let repo = SeaOrmTweetsRepository::new(db);
        self.service
            .store(Some(Arc::new(Service::new(Arc::new(repo), users))));
        Ok(())
    }

    /// Mount the tweet routes behind the users module's session gate.
    pub fn register_rest(
        &self,
        router: axum::Router,
        gate: AuthGate,
    ) -> anyhow::Result<axum::Router> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("tweets module not initialized"))?;
        info!("Registering tweets REST routes");
        Ok(routes::register_routes(router, service, gate))
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        TweetsApiDoc::openapi()
    }
}
