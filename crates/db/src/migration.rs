//! Schema migrations contributed by modules.

use crate::{Database, DbResult};

const MIGRATION_TABLE: &str = "atrium_migration";

/// Migration definition for modules
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

impl Database {
    /// Apply every migration not yet recorded, in the given order.
    ///
    /// Each entry is `(module name, migration)`. Returns the number of
    /// migrations that ran.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> DbResult<usize> {
        let mut applied = 0;

        for (module, migration) in migrations {
            let key = format!("{}__{}", module, migration.id);

            let existing: Option<String> = self
                .client()
                .query("SELECT VALUE record::id(id) FROM type::thing($table, $key)")
                .bind(("table", MIGRATION_TABLE))
                .bind(("key", key.clone()))
                .await?
                .take(0)?;

            if existing.is_some() {
                tracing::debug!(target: "atrium-db", module = %module, migration = migration.id, "migration already applied");
                continue;
            }

            tracing::info!(target: "atrium-db", module = %module, migration = migration.id, "applying migration");

            self.client().query(migration.up).await?.check()?;

            self.client()
                .query(
                    "CREATE type::thing($table, $key) SET module = $module, migration = $migration, applied_at = time::now()",
                )
                .bind(("table", MIGRATION_TABLE))
                .bind(("key", key))
                .bind(("module", module.clone()))
                .bind(("migration", migration.id))
                .await?
                .check()?;

            applied += 1;
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books_migration() -> Vec<(String, Migration)> {
        vec![(
            "books".to_string(),
            Migration {
                id: "001_init",
                up: r#"
                    DEFINE TABLE book SCHEMALESS;
                    DEFINE INDEX book_isbn_unique ON book FIELDS isbn UNIQUE;
                "#,
            },
        )]
    }

    #[tokio::test]
    async fn migrations_run_once() {
        let db = Database::in_memory().await.unwrap();

        let first = db.apply_migrations(&books_migration()).await.unwrap();
        let second = db.apply_migrations(&books_migration()).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn unique_index_from_migration_is_enforced() {
        let db = Database::in_memory().await.unwrap();
        db.apply_migrations(&books_migration()).await.unwrap();

        let books = db.collection("book");
        books
            .insert("a", &serde_json::json!({ "isbn": "978-1" }))
            .await
            .unwrap();
        let err = books
            .insert("b", &serde_json::json!({ "isbn": "978-1" }))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::DbError::UniqueViolation(_)));
    }
}
