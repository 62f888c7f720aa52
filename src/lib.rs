//! Atrium application: the bookstore and restaurant-menu modules and the
//! bootstrap that wires them onto storage and HTTP.

use anyhow::Context;
use atrium_authz::TokenService;
use atrium_db::Database;
use atrium_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use axum::Router;

pub mod modules;
pub mod utils;

/// Connect to the configured SurrealDB endpoint
pub async fn connect(settings: &Settings) -> anyhow::Result<Database> {
    let database = &settings.database;
    Database::connect(
        &database.endpoint,
        &database.namespace,
        &database.database,
        database.credentials().as_ref(),
    )
    .await
    .with_context(|| format!("failed to connect to {}", database.endpoint))
}

/// Register, init, migrate and start every module, then build the router.
pub async fn bootstrap(
    settings: &Settings,
    db: &Database,
    tokens: &TokenService,
) -> anyhow::Result<(ModuleRegistry, Router)> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;

    let ctx = InitCtx {
        settings,
        db,
        tokens,
    };
    registry.init_modules(&ctx).await?;

    let applied = db
        .apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations applied");

    registry.start_modules(&ctx).await?;

    let router = atrium_http::build_router(&registry, settings);
    Ok((registry, router))
}

/// Serve the API until ctrl-c, then stop the modules.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let tokens = settings.auth.token_service()?;
    let db = connect(&settings).await?;

    let (registry, _) = bootstrap(&settings, &db, &tokens).await?;
    atrium_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await
}

/// Apply pending migrations without serving. Returns how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = connect(settings).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;

    let applied = db
        .apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations applied");
    Ok(applied)
}
