//! Rated comments embedded in books and dishes.
//!
//! Not a module of its own: the books and dishes modules each mount these
//! routes next to their own.

mod models;
mod routes;
mod thread;

use atrium_authz::TokenService;
use axum::extract::FromRef;
use serde_json::{json, Value};

use crate::modules::users::UserRepository;

pub use models::{Comment, CommentPatch, NewComment};
pub use routes::router;
pub use thread::CommentThread;

#[derive(Clone, FromRef)]
pub struct CommentsState {
    pub thread: CommentThread,
    pub users: UserRepository,
    pub tokens: TokenService,
}

/// OpenAPI paths for the comment routes of one parent collection
pub fn openapi_paths(tag: &'static str) -> Value {
    json!({
        "/{id}/comments": {
            "get": {
                "summary": "List comments",
                "tags": [tag],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "responses": {
                    "200": {
                        "description": "Comments in insertion order",
                        "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Comment" } } } }
                    },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "post": {
                "summary": "Add a comment as the caller",
                "tags": [tag],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewComment" } } }
                },
                "responses": {
                    "201": {
                        "description": "Stored comment",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Comment" } } }
                    },
                    "400": { "$ref": "#/components/responses/BadRequest" },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "delete": {
                "summary": "Delete all comments",
                "tags": [tag],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "responses": {
                    "200": {
                        "description": "Comments cleared",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Message" } } }
                    },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            }
        },
        "/{id}/comments/{comment_id}": {
            "put": {
                "summary": "Update own comment",
                "tags": [tag],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
                    { "name": "comment_id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/CommentPatch" } } }
                },
                "responses": {
                    "200": {
                        "description": "Updated comment",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Comment" } } }
                    },
                    "400": { "$ref": "#/components/responses/BadRequest" },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            },
            "delete": {
                "summary": "Delete own comment",
                "tags": [tag],
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
                    { "name": "comment_id", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "security": [{ "bearerAuth": [] }],
                "responses": {
                    "200": {
                        "description": "Comment deleted",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Message" } } }
                    },
                    "401": { "$ref": "#/components/responses/Unauthorized" },
                    "403": { "$ref": "#/components/responses/Forbidden" },
                    "404": { "$ref": "#/components/responses/NotFound" },
                    "500": { "$ref": "#/components/responses/InternalError" }
                }
            }
        }
    })
}

pub fn openapi_schemas() -> Value {
    json!({
        "Comment": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                "comment": { "type": "string" },
                "author": { "type": "string" },
                "date": { "type": "string", "format": "date-time" }
            },
            "required": ["id", "rating", "comment", "author", "date"]
        },
        "NewComment": {
            "type": "object",
            "properties": {
                "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                "comment": { "type": "string", "minLength": 1 }
            },
            "required": ["rating", "comment"]
        },
        "CommentPatch": {
            "type": "object",
            "properties": {
                "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                "comment": { "type": "string", "minLength": 1 }
            }
        }
    })
}
