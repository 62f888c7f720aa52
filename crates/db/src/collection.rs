//! Document collection helpers over a single SurrealDB table.
//!
//! Record keys are application-generated strings. Reads project the record
//! key back into a plain string `id` field so documents deserialize without
//! SurrealDB-specific types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use surrealdb::Response;

use crate::{Database, DbError, DbResult};

/// Projection that replaces the record id with its bare key
const PROJECTION: &str = "*, record::id(id) AS id";

/// Attempts per write statement before a conflict is surfaced. A conflicted
/// attempt means a rival write committed, so this many writers racing on one
/// document all get through.
const MAX_WRITE_ATTEMPTS: u32 = 8;
const BASE_BACKOFF_MS: u64 = 5;
const MAX_BACKOFF_MS: u64 = 160;

/// A single table of documents.
#[derive(Clone)]
pub struct Collection {
    db: Database,
    table: &'static str,
}

impl Collection {
    pub fn new(db: Database, table: &'static str) -> Self {
        Self { db, table }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Create the document under `id`. Any `id` field in `document` is ignored.
    pub async fn insert<T: Serialize>(&self, id: &str, document: &T) -> DbResult<()> {
        let mut bindings = keyed(id);
        bindings.insert("content".to_string(), Value::Object(content_of(document, &[])?));

        self.write("CREATE type::thing($table, $id) CONTENT $content", bindings)
            .await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> DbResult<Option<T>> {
        let mut response = self
            .db
            .client()
            .query(format!("SELECT {PROJECTION} FROM type::thing($table, $id)"))
            .bind(("table", self.table))
            .bind(("id", id.to_owned()))
            .await?;

        let documents: Vec<T> = response.take(0)?;
        Ok(documents.into_iter().next())
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE record::id(id) FROM type::thing($table, $id)")
            .bind(("table", self.table))
            .bind(("id", id.to_owned()))
            .await?;

        let keys: Vec<String> = response.take(0)?;
        Ok(!keys.is_empty())
    }

    /// First document whose `field` equals `value`.
    ///
    /// `field` is interpolated into the query and must be a trusted identifier.
    pub async fn find_one_by<T, V>(&self, field: &'static str, value: V) -> DbResult<Option<T>>
    where
        T: DeserializeOwned,
        V: Serialize + 'static,
    {
        let mut response = self
            .db
            .client()
            .query(format!(
                "SELECT {PROJECTION} FROM type::table($table) WHERE {field} = $value LIMIT 1"
            ))
            .bind(("table", self.table))
            .bind(("value", value))
            .await?;

        let documents: Vec<T> = response.take(0)?;
        Ok(documents.into_iter().next())
    }

    /// All documents, oldest first.
    pub async fn list<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        self.list_where("true", Map::new()).await
    }

    /// Documents matching a SurrealQL `condition`, oldest first.
    ///
    /// `condition` must only reference parameters supplied in `bindings`.
    pub async fn list_where<T: DeserializeOwned>(
        &self,
        condition: &str,
        bindings: Map<String, Value>,
    ) -> DbResult<Vec<T>> {
        let mut response = self
            .db
            .client()
            .query(format!(
                "SELECT {PROJECTION} FROM type::table($table) WHERE {condition} ORDER BY id"
            ))
            .bind(("table", self.table))
            .bind(Value::Object(bindings))
            .await?;

        Ok(response.take(0)?)
    }

    /// Documents whose keys appear in `ids`, in the order of `ids`. Unknown keys are skipped.
    pub async fn get_many<T>(&self, ids: &[String]) -> DbResult<Vec<T>>
    where
        T: DeserializeOwned + Keyed,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut bindings = Map::new();
        bindings.insert("ids".to_string(), Value::from(ids.to_vec()));

        let mut documents: Vec<T> = self
            .list_where("record::id(id) INSIDE $ids", bindings)
            .await?;
        documents.sort_by_key(|doc| {
            ids.iter()
                .position(|id| id == doc.key())
                .unwrap_or(usize::MAX)
        });

        Ok(documents)
    }

    /// Overwrite the named fields of an existing document, leaving the rest untouched.
    ///
    /// Every top-level field of `fields` except `id` and those in `exclude` is written.
    pub async fn merge<T: Serialize>(&self, id: &str, fields: &T, exclude: &[&str]) -> DbResult<()> {
        let mut bindings = keyed(id);
        bindings.insert("content".to_string(), Value::Object(content_of(fields, exclude)?));

        self.write("UPDATE type::thing($table, $id) MERGE $content", bindings)
            .await?;
        Ok(())
    }

    /// Run a `SET` clause against one document, e.g. `comments = []`.
    ///
    /// `assignments` may reference `$`-parameters supplied in `bindings`.
    pub async fn update_set(
        &self,
        id: &str,
        assignments: &str,
        bindings: Map<String, Value>,
    ) -> DbResult<()> {
        self.update_set_if(id, assignments, "true", bindings).await?;
        Ok(())
    }

    /// Run a `SET` clause against one document only when it matches `condition`.
    ///
    /// Returns whether the document existed and matched. Condition and
    /// assignments are evaluated in the same statement.
    pub async fn update_set_if(
        &self,
        id: &str,
        assignments: &str,
        condition: &str,
        bindings: Map<String, Value>,
    ) -> DbResult<bool> {
        let mut bindings = bindings;
        bindings.extend(keyed(id));

        let mut response = self
            .write(
                &format!(
                    "UPDATE type::thing($table, $id) SET {assignments} WHERE {condition} \
                     RETURN VALUE record::id(id)"
                ),
                bindings,
            )
            .await?;

        let touched: Vec<String> = response.take(0)?;
        Ok(!touched.is_empty())
    }

    /// Run a `SET` clause against one document, creating it when absent.
    ///
    /// Fields of a fresh document read as `NONE` in `assignments`.
    pub async fn upsert_set(
        &self,
        id: &str,
        assignments: &str,
        bindings: Map<String, Value>,
    ) -> DbResult<()> {
        let mut bindings = bindings;
        bindings.extend(keyed(id));

        self.write(
            &format!("UPSERT type::thing($table, $id) SET {assignments}"),
            bindings,
        )
        .await?;
        Ok(())
    }

    /// Run a `SET` clause against every document matching `condition`.
    pub async fn update_where(
        &self,
        assignments: &str,
        condition: &str,
        bindings: Map<String, Value>,
    ) -> DbResult<()> {
        self.write(
            &format!("UPDATE type::table($table) SET {assignments} WHERE {condition}"),
            bindings,
        )
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.write("DELETE type::thing($table, $id)", keyed(id)).await?;
        Ok(())
    }

    /// Execute one write statement, retrying when the transaction lost a
    /// read/write race. A conflicted transaction is never committed, so
    /// running the statement again cannot apply it twice.
    async fn write(&self, statement: &str, bindings: Map<String, Value>) -> DbResult<Response> {
        let mut attempt = 1;
        loop {
            let outcome = self
                .db
                .client()
                .query(statement.to_owned())
                .bind(("table", self.table))
                .bind(Value::Object(bindings.clone()))
                .await
                .and_then(Response::check)
                .map_err(DbError::from);

            match outcome {
                Err(DbError::WriteConflict(reason)) if attempt < MAX_WRITE_ATTEMPTS => {
                    let backoff =
                        Duration::from_millis((BASE_BACKOFF_MS << (attempt - 1)).min(MAX_BACKOFF_MS));
                    tracing::debug!(
                        target: "atrium-db",
                        table = self.table,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        reason = %reason,
                        "write conflict, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(DbError::WriteConflict(reason)) => {
                    tracing::warn!(
                        target: "atrium-db",
                        table = self.table,
                        attempts = attempt,
                        "write conflict persisted"
                    );
                    return Err(DbError::WriteConflict(reason));
                }
                other => return other,
            }
        }
    }
}

/// Documents that expose their record key.
pub trait Keyed {
    fn key(&self) -> &str;
}

fn keyed(id: &str) -> Map<String, Value> {
    let mut bindings = Map::new();
    bindings.insert("id".to_string(), Value::from(id));
    bindings
}

fn content_of<T: Serialize>(document: &T, exclude: &[&str]) -> DbResult<Map<String, Value>> {
    match serde_json::to_value(document)? {
        Value::Object(mut map) => {
            map.remove("id");
            for field in exclude {
                map.remove(*field);
            }
            Ok(map)
        }
        _ => Err(DbError::NotADocument),
    }
}
