//! Book genres. Deleting one detaches it from its books.

pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_kernel::{InitCtx, Migration, Module};
use axum::{extract::FromRef, Router};
use once_cell::sync::OnceCell;
use serde_json::json;


pub use models::Genre;
pub use repository::GenreRepository;

#[derive(Clone, FromRef)]
pub struct GenresState {
    pub genres: GenreRepository,
    pub tokens: TokenService,
}

pub struct GenresModule {
    state: OnceCell<GenresState>,
}

impl GenresModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for GenresModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let state = GenresState {
            genres: GenreRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set(state)
            .map_err(|_| anyhow::anyhow!("genres module initialized twice"))?;

        tracing::info!(module = self.name(), "genres module initialized");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.state.get().is_some()
    }

    fn routes(&self) -> Router {
        match self.state.get() {
            Some(state) => routes::router().with_state(state.clone()),
            None => {
                tracing::error!(module = self.name(), "routes requested before init");
                Router::new()
            }
        }
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List genres",
                        "tags": ["Genres"],
                        "responses": {
                            "200": {
                                "description": "All genres",
                                "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Genre" } } } }
                            },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "post": {
                        "summary": "Create a genre",
                        "tags": ["Genres"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewGenre" } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created genre",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Genre" } } }
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
                        "summary": "Get a genre",
                        "tags": ["Genres"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Genre",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Genre" } } }
                            },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "put": {
                        "summary": "Rename a genre",
                        "tags": ["Genres"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewGenre" } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated genre",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Genre" } } }
                            },
                            "400": { "$ref": "#/components/responses/BadRequest" },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "409": { "$ref": "#/components/responses/Conflict" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a genre and detach it from books",
                        "tags": ["Genres"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Genre deleted",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Message" } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Genre": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" }
                        },
                        "required": ["id", "name"]
                    },
                    "NewGenre": {
                        "type": "object",
                        "properties": { "name": { "type": "string", "minLength": 1 } },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                DEFINE TABLE genre SCHEMALESS;
                DEFINE INDEX genre_name_unique ON genre FIELDS name UNIQUE;
                "#,
        }]
    }
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(GenresModule::new())
}
