//! Restaurant promotions. Names are unique; the label is `New`, `Popular` or absent.

pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_kernel::{InitCtx, Migration, Module};
use axum::{extract::FromRef, Router};
use once_cell::sync::OnceCell;
use serde_json::json;


pub use models::Promotion;
pub use repository::PromotionRepository;

#[derive(Clone, FromRef)]
pub struct PromotionsState {
    pub promotions: PromotionRepository,
    pub tokens: TokenService,
}

pub struct PromotionsModule {
    state: OnceCell<PromotionsState>,
}

impl PromotionsModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for PromotionsModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for PromotionsModule {
    fn name(&self) -> &'static str {
        "promotions"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let state = PromotionsState {
            promotions: PromotionRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set(state)
            .map_err(|_| anyhow::anyhow!("promotions module initialized twice"))?;

        tracing::info!(module = self.name(), "promotions module initialized");
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
        let fields = json!({
            "name": { "type": "string" },
            "image": { "type": "string" },
            "label": { "type": ["string", "null"], "enum": ["New", "Popular", null] },
            "price": { "type": "number", "minimum": 0 },
            "featured": { "type": "boolean", "default": false },
            "description": { "type": "string" }
        });
        let mut promotion = fields.clone();
        promotion["id"] = json!({ "type": "string" });

        Some(json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List promotions",
                        "tags": ["Promotions"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "All promotions",
                                "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Promotion" } } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "post": {
                        "summary": "Create a promotion",
                        "tags": ["Promotions"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPromotion" } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created promotion",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Promotion" } } }
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
                        "summary": "Get a promotion",
                        "tags": ["Promotions"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Promotion",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Promotion" } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "put": {
                        "summary": "Update a promotion",
                        "tags": ["Promotions"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/PromotionPatch" } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated promotion",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Promotion" } } }
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
                        "summary": "Delete a promotion",
                        "tags": ["Promotions"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Promotion deleted",
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
                    "Promotion": {
                        "type": "object",
                        "properties": promotion,
                        "required": ["id", "name", "image", "price", "featured", "description"]
                    },
                    "NewPromotion": {
                        "type": "object",
                        "properties": fields.clone(),
                        "required": ["name", "image", "price", "description"]
                    },
                    "PromotionPatch": {
                        "type": "object",
                        "properties": fields
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                DEFINE TABLE promotion SCHEMALESS;
                DEFINE INDEX promotion_name_unique ON promotion FIELDS name UNIQUE;
                "#,
        }]
    }
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PromotionsModule::new())
}
