//! Per-user favorite dishes.

pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_kernel::{InitCtx, Migration, Module};
use axum::{extract::FromRef, Router};
use once_cell::sync::OnceCell;
use serde_json::json;


pub use models::{DishRef, Favorite, FavoriteView};
pub use repository::FavoriteRepository;

#[derive(Clone, FromRef)]
pub struct FavoritesState {
    pub favorites: FavoriteRepository,
    pub tokens: TokenService,
}

pub struct FavoritesModule {
    state: OnceCell<FavoritesState>,
}

impl FavoritesModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for FavoritesModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for FavoritesModule {
    fn name(&self) -> &'static str {
        "favorites"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let state = FavoritesState {
            favorites: FavoriteRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set(state)
            .map_err(|_| anyhow::anyhow!("favorites module initialized twice"))?;

        tracing::info!(module = self.name(), "favorites module initialized");
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
                        "summary": "Get the caller's favorites",
                        "tags": ["Favorites"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Favorites with dishes resolved",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Favorites" } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "post": {
                        "summary": "Add dishes to the caller's favorites",
                        "tags": ["Favorites"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/DishRef" } } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated favorites",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Favorites" } } }
                            },
                            "400": { "$ref": "#/components/responses/BadRequest" },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "delete": {
                        "summary": "Delete the caller's favorites",
                        "tags": ["Favorites"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Favorites deleted",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Message" } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    }
                },
                "/{dish_id}": {
                    "post": {
                        "summary": "Add one dish",
                        "tags": ["Favorites"],
                        "parameters": [
                            { "name": "dish_id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Updated favorites",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Favorites" } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "409": { "$ref": "#/components/responses/Conflict" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "delete": {
                        "summary": "Remove one dish",
                        "tags": ["Favorites"],
                        "parameters": [
                            { "name": "dish_id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Updated favorites",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Favorites" } } }
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
                    "Favorites": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "user": { "type": "string" },
                            "dishes": { "type": "array", "items": { "$ref": "#/components/schemas/Dish" } }
                        },
                        "required": ["id", "user", "dishes"]
                    },
                    "DishRef": {
                        "oneOf": [
                            { "type": "string", "description": "Dish id" },
                            {
                                "type": "object",
                                "properties": { "_id": { "type": "string" } },
                                "required": ["_id"]
                            }
                        ]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                DEFINE TABLE favorite SCHEMALESS;
                DEFINE INDEX favorite_user_unique ON favorite FIELDS user UNIQUE;
                "#,
        }]
    }
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(FavoritesModule::new())
}
