//! Restaurant leadership profiles.

pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_kernel::{InitCtx, Migration, Module};
use axum::{extract::FromRef, Router};
use once_cell::sync::OnceCell;
use serde_json::json;


pub use models::Leader;
pub use repository::LeaderRepository;

#[derive(Clone, FromRef)]
pub struct LeadersState {
    pub leaders: LeaderRepository,
    pub tokens: TokenService,
}

pub struct LeadersModule {
    state: OnceCell<LeadersState>,
}

impl LeadersModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for LeadersModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for LeadersModule {
    fn name(&self) -> &'static str {
        "leaders"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let state = LeadersState {
            leaders: LeaderRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set(state)
            .map_err(|_| anyhow::anyhow!("leaders module initialized twice"))?;

        tracing::info!(module = self.name(), "leaders module initialized");
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
            "designation": { "type": "string" },
            "abbr": { "type": ["string", "null"] },
            "featured": { "type": "boolean", "default": false },
            "description": { "type": "string" }
        });
        let mut leader = fields.clone();
        leader["id"] = json!({ "type": "string" });

        Some(json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List leaders",
                        "tags": ["Leaders"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "All leaders",
                                "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Leader" } } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "post": {
                        "summary": "Create a leader",
                        "tags": ["Leaders"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewLeader" } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created leader",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Leader" } } }
                            },
                            "400": { "$ref": "#/components/responses/BadRequest" },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a leader",
                        "tags": ["Leaders"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Leader",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Leader" } } }
                            },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "put": {
                        "summary": "Update a leader",
                        "tags": ["Leaders"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LeaderPatch" } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated leader",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Leader" } } }
                            },
                            "400": { "$ref": "#/components/responses/BadRequest" },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "403": { "$ref": "#/components/responses/Forbidden" },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a leader",
                        "tags": ["Leaders"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Leader deleted",
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
                    "Leader": {
                        "type": "object",
                        "properties": leader,
                        "required": ["id", "name", "image", "designation", "featured", "description"]
                    },
                    "NewLeader": {
                        "type": "object",
                        "properties": fields.clone(),
                        "required": ["name", "image", "designation", "description"]
                    },
                    "LeaderPatch": {
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
            up: "DEFINE TABLE leader SCHEMALESS;",
        }]
    }
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(LeadersModule::new())
}
