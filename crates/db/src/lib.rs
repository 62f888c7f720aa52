//! SurrealDB integration for Atrium.
//!
//! A [`Database`] is constructed once at startup and cloned into every
//! repository that needs it; there is no global connection.

use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use thiserror::Error;

pub mod collection;
pub mod migration;

pub use collection::Collection;
pub use migration::Migration;

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The transaction lost a read/write race and was not committed
    #[error("write conflict: {0}")]
    WriteConflict(String),

    #[error("value is not a document")]
    NotADocument,

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Surreal(surrealdb::Error),
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // Unique index violations read "Database index `...` already contains ..."
        if message.contains("already contains") {
            DbError::UniqueViolation(message)
        } else if message.contains("can be retried") {
            DbError::WriteConflict(message)
        } else {
            DbError::Surreal(err)
        }
    }
}

/// Result type for storage operations
pub type DbResult<T> = Result<T, DbError>;

/// Root credentials used when connecting to a remote SurrealDB server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Handle to a SurrealDB namespace/database pair.
#[derive(Clone)]
pub struct Database {
    client: Surreal<Any>,
}

impl Database {
    /// Connect to `endpoint` (`ws://host:port`, `mem://`, ...) and select the namespace and database.
    pub async fn connect(
        endpoint: &str,
        namespace: &str,
        database: &str,
        credentials: Option<&Credentials>,
    ) -> DbResult<Self> {
        tracing::info!(
            target: "atrium-db",
            endpoint = %endpoint,
            namespace = %namespace,
            database = %database,
            "connecting to SurrealDB"
        );

        let client = any::connect(endpoint).await?;

        if let Some(credentials) = credentials {
            client
                .signin(Root {
                    username: &credentials.username,
                    password: &credentials.password,
                })
                .await?;
        }

        client.use_ns(namespace).use_db(database).await?;

        Ok(Self { client })
    }

    /// Fresh in-memory database, used by tests and local experiments.
    pub async fn in_memory() -> DbResult<Self> {
        Self::connect("mem://", "atrium", "scratch", None).await
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.client
    }

    /// Document helper bound to `table`
    pub fn collection(&self, table: &'static str) -> Collection {
        Collection::new(self.clone(), table)
    }
}
