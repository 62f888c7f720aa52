//! Restaurant dishes with per-dish comments.

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

pub use models::Dish;
pub use repository::DishRepository;

#[derive(Clone, FromRef)]
pub struct DishesState {
    pub dishes: DishRepository,
    pub tokens: TokenService,
}

pub struct DishesModule {
    state: OnceCell<(DishesState, CommentsState)>,
}

impl DishesModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for DishesModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for DishesModule {
    fn name(&self) -> &'static str {
        "dishes"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let dishes = DishesState {
            dishes: DishRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        let comments = CommentsState {
            thread: CommentThread::new(ctx.db, repository::TABLE, "dish"),
            users: UserRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set((dishes, comments))
            .map_err(|_| anyhow::anyhow!("dishes module initialized twice"))?;

        tracing::info!(module = self.name(), "dishes module initialized");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.state.get().is_some()
    }

    fn routes(&self) -> Router {
        match self.state.get() {
            Some((dishes, comments)) => routes::router()
                .with_state(dishes.clone())
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
                "summary": "List dishes",
                "tags": ["Dishes"],
                "responses": {
                    "200": {
                        "description": "All dishes",
                        "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Dish" } } } }
                    },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "post": {
                "summary": "Create a dish",
                "tags": ["Dishes"],
                "security": [{ "bearerAuth": [] }],
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewDish" } } }
                },
                "responses": {
                    "201": {
                        "description": "Created dish",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Dish" } } }
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
                "summary": "Get a dish",
                "tags": ["Dishes"],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "responses": {
                    "200": {
                        "description": "Dish",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Dish" } } }
                    },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "put": {
                "summary": "Update a dish",
                "tags": ["Dishes"],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/DishPatch" } } }
                },
                "responses": {
                    "200": {
                        "description": "Updated dish",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Dish" } } }
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
                "summary": "Delete a dish",
                "tags": ["Dishes"],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "responses": {
                    "200": {
                        "description": "Dish deleted",
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
        extend_object(&mut paths, comments::openapi_paths("Dishes"));

        let fields = json!({
            "name": { "type": "string" },
            "image": { "type": "string" },
            "category": { "type": "string" },
            "label": { "type": "string", "default": "" },
            "price": { "type": "number", "minimum": 0 },
            "featured": { "type": "boolean", "default": false },
            "description": { "type": "string" }
        });
        let mut dish = fields.clone();
        dish["id"] = json!({ "type": "string" });
        dish["comments"] = json!({ "type": "array", "items": { "$ref": "#/components/schemas/Comment" } });

        let mut schemas = json!({
            "Dish": {
                "type": "object",
                "properties": dish,
                "required": ["id", "name", "image", "category", "label", "price", "featured", "description", "comments"]
            },
            "NewDish": {
                "type": "object",
                "properties": fields.clone(),
                "required": ["name", "image", "category", "price", "description"]
            },
            "DishPatch": {
                "type": "object",
                "properties": fields
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
                DEFINE TABLE dish SCHEMALESS;
                DEFINE INDEX dish_name_unique ON dish FIELDS name UNIQUE;
                "#,
        }]
    }
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(DishesModule::new())
}
