//! Registration and login.

mod routes;

use async_trait::async_trait;
use atrium_authz::TokenService;
use atrium_kernel::{InitCtx, Module};
use axum::{extract::FromRef, Router};
use once_cell::sync::OnceCell;
use serde_json::json;

use crate::modules::users::UserRepository;

pub use routes::BAD_CREDENTIALS;

#[derive(Clone, FromRef)]
pub struct AuthState {
    pub users: UserRepository,
    pub tokens: TokenService,
}

pub struct AuthModule {
    state: OnceCell<AuthState>,
}

impl AuthModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for AuthModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let state = AuthState {
            users: UserRepository::new(ctx.db),
            tokens: ctx.tokens.clone(),
        };
        self.state
            .set(state)
            .map_err(|_| anyhow::anyhow!("auth module initialized twice"))?;

        tracing::info!(
            module = self.name(),
            token_ttl_secs = ctx.tokens.ttl().num_seconds(),
            "auth module initialized"
        );
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
                "/register": {
                    "post": {
                        "summary": "Register an identity",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Register" } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Registered user",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
                            },
                            "400": { "$ref": "#/components/responses/BadRequest" },
                            "409": { "$ref": "#/components/responses/Conflict" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for a token",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Login" } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Bearer token",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Token" } } }
                            },
                            "400": { "$ref": "#/components/responses/BadRequest" },
                            "401": { "$ref": "#/components/responses/Unauthorized" },
                            "500": { "$ref": "#/components/responses/InternalError" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Register": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string", "format": "password" },
                            "role": { "type": "string", "enum": ["user", "admin"] }
                        },
                        "required": ["username", "password"]
                    },
                    "Login": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["username", "password"]
                    },
                    "Token": {
                        "type": "object",
                        "properties": {
                            "token": { "type": "string" },
                            "expires_in": { "type": "integer" }
                        },
                        "required": ["token", "expires_in"]
                    }
                }
            }
        }))
    }
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthModule::new())
}
