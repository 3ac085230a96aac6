pub mod display;
pub mod error;
pub mod models;
mod openapi;
pub mod routes;
pub mod store;
pub mod validation;
pub mod workflows;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};

use models::CATALOG_ROOT;
use store::CatalogStore;

/// Lending-library catalog: authors, genres, books and their copies.
pub struct CatalogModule {
    store: CatalogStore,
}

impl CatalogModule {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn mount_path(&self) -> String {
        CATALOG_ROOT.to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::document())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

pub fn create_module(store: CatalogStore) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(store))
}
