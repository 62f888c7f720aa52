//! HTTP server facade for Atrium: routing, middleware, error envelope and
//! the authentication extractors shared by every module.

use anyhow::Context;
use axum::{routing::get, Router};

use atrium_kernel::{settings::Settings, ModuleRegistry};

pub mod auth;
pub mod error;
pub mod extract;
pub mod router;

pub use auth::{Admin, Authenticated, Authorized, Member, RoleSet};
pub use error::AppError;
pub use extract::{nullable, required_text, Json};

use router::RouterBuilder;

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Start the HTTP server with the given module registry.
///
/// Returns once the server has drained after ctrl-c.
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", settings.bind_addr()))?;

    tracing::info!("HTTP server listening on http://{}", settings.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under /api/{}",
            module.name()
        );
        router_builder = router_builder.mount_module(module.name(), module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors()
        .with_tracing()
        .with_request_id()
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
