//! Book catalogue with per-book comments.

pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_kernel::{InitCtx, Migration, Module};
use axum::{extract::FromRef, Router};
use once_cell::sync::OnceCell;
use serde_json::json;

use crate::modules::comments::{self, CommentThread, CommentsState};
use crate::modules::users::UserRepository;
use crate::utils::extend_object;

pub use models::Book;
pub use repository::BookRepository;

#[derive(Clone, FromRef)]
pub struct BooksState {
    pub books: BookRepository,
    pub tokens: TokenService,
}

/// Books module: catalogue CRUD plus the comment routes
pub struct BooksModule {
    state: OnceCell<(BooksState, CommentsState)>,
}

impl BooksModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = BooksState {
            books: BookRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        let comments = CommentsState {
            thread: CommentThread::new(ctx.db, repository::TABLE, "book"),
            users: UserRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set((books, comments))
            .map_err(|_| anyhow::anyhow!("books module initialized twice"))?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.state.get().is_some()
    }

    fn routes(&self) -> Router {
        match self.state.get() {
            Some((books, comments)) => routes::router()
                .with_state(books.clone())
                .merge(comments::router(comments.clone())),
            None => {
                tracing::error!(module = self.name(), "routes requested before init");
                Router::new()
            }
        }
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut paths = json!({
        "": {
            "get": {
                "summary": "List books",
                "tags": ["Books"],
                "parameters": [
                    { "name": "maxPrice", "in": "query", "required": false, "schema": { "type": "number" } },
                    { "name": "genre", "in": "query", "required": false, "schema": { "type": "string" } }
                ],
                "responses": {
                    "200": {
                        "description": "Books matching the filter",
                        "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } } } }
                    },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "post": {
                "summary": "Create a book",
                "tags": ["Books"],
                "security": [{ "bearerAuth": [] }],
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewBook" } } }
                },
                "responses": {
                    "201": {
                        "description": "Created book",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Book" } } }
                    },
                    "400": { "$ref": "#/components/responses/BadRequest" },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "409": { "$ref": "#/components/responses/Conflict" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            }
        },
        "/{id}": {
            "get": {
                "summary": "Get a book",
                "tags": ["Books"],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "responses": {
                    "200": {
                        "description": "Book",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Book" } } }
                    },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "put": {
                "summary": "Update a book",
                "tags": ["Books"],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookPatch" } } }
                },
                "responses": {
                    "200": {
                        "description": "Updated book",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Book" } } }
                    },
                    "400": { "$ref": "#/components/responses/BadRequest" },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "delete": {
                "summary": "Delete a book",
                "tags": ["Books"],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "responses": {
                    "200": {
                        "description": "Book deleted",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Message" } } }
                    },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            }
        }
        });
        extend_object(&mut paths, comments::openapi_paths("Books"));

        let book_fields = json!({
            "isbn": { "type": "string" },
            "title": { "type": "string" },
            "subTitle": { "type": ["string", "null"] },
            "publish_date": { "type": "string", "format": "date" },
            "publisher": { "type": ["string", "null"] },
            "pages": { "type": ["integer", "null"], "minimum": 0 },
            "price": { "type": ["number", "null"], "minimum": 0 },
            "description": { "type": ["string", "null"] },
            "website": { "type": ["string", "null"] },
            "genre": { "type": ["string", "null"], "description": "Genre id" }
        });

        let mut book = book_fields.clone();
        book["id"] = json!({ "type": "string" });
        book["comments"] = json!({ "type": "array", "items": { "$ref": "#/components/schemas/Comment" } });
        let mut patch = book_fields.clone();
        if let Some(fields) = patch.as_object_mut() {
            fields.remove("isbn");
        }

        let mut schemas = json!({
            "Book": {
                "type": "object",
                "properties": book,
                "required": ["id", "isbn", "title", "publish_date", "comments"]
            },
            "NewBook": {
                "type": "object",
                "properties": book_fields,
                "required": ["isbn", "title", "publish_date"]
            },
            "BookPatch": {
                "type": "object",
                "properties": patch
            }
        });
        extend_object(&mut schemas, comments::openapi_schemas());

        Some(json!({
            "paths": paths,
            "components": { "schemas": schemas }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                DEFINE TABLE book SCHEMALESS;
                DEFINE INDEX book_isbn_unique ON book FIELDS isbn UNIQUE;
                DEFINE INDEX book_genre ON book FIELDS genre;
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
