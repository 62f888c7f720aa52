//! Shared fixtures for repository tests.

use atrium_db::Database;
use atrium_kernel::ModuleRegistry;

/// Fresh in-memory database with every module's migrations applied
pub async fn database() -> Database {
    let mut registry = ModuleRegistry::new();
    super::register_all(&mut registry).unwrap();

    let db = Database::in_memory().await.unwrap();
    db.apply_migrations(&registry.collect_migrations())
        .await
        .unwrap();
    db
}
