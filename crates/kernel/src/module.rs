//! The unit of composition: each feature area is a [`Module`] that owns its
//! routes and OpenAPI fragment and takes part in the server lifecycle.

use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while booting.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key; also used in logs.
    fn name(&self) -> &'static str;

    /// Prefix the module's router is nested under. `/api/{name}` unless
    /// overridden.
    fn mount_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Runs before the listener binds. A failure aborts startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to [`Module::mount_path`].
    fn routes(&self) -> Router {
        Router::new()
    }

    /// `paths` and `components` relative to the mount path; merged into the
    /// served document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server has drained, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
