//! Libris application library
//!
//! The catalog module plus the boot sequence that wires it into the HTTP
//! server.

pub mod modules;

use anyhow::Context;
use axum::Router;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use modules::catalog::store::CatalogStore;

/// Registry with every module registered against the configured store.
pub fn build_registry(settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, CatalogStore::open(&settings.database));
    registry
}

/// The full HTTP application, without binding a socket.
pub fn router(settings: &Settings) -> Router {
    libris_http::build_router(&build_registry(settings), settings)
}

/// Initialize and start every module, serve until shutdown, then stop them.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;
    tracing::info!(modules = registry.len(), "libris bootstrap complete");

    let served = libris_http::start_server(&registry, &settings).await;
    registry
        .stop_all()
        .await
        .context("failed to stop modules cleanly")?;
    served
}
