use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_db::{Database, Migration};
use axum::Router;

/// Shared handles a module receives at init and start.
///
/// Modules clone what they need out of the context; nothing here is global.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a Database,
    pub tokens: &'a TokenService,
}

/// A resource area (books, dishes, ...) mounted as one unit.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the mount segment under `/api`
    fn name(&self) -> &'static str;

    /// Build repositories and route state. Runs before migrations.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether [`Module::init`] left the module able to serve its routes.
    /// Checked right after init; a module that is not ready aborts startup.
    fn is_ready(&self) -> bool {
        true
    }

    /// Routes mounted under `/api/{name}`. Called after [`Module::init`].
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into `/docs/openapi.json`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// SurrealQL migrations, applied once each in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called once migrations are applied
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called on shutdown, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
