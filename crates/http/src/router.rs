//! Router builder for the Atrium HTTP server

use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use atrium_kernel::ModuleRegistry;
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};
use utoipa_swagger_ui::SwaggerUi;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Tag each request with an `x-request-id` and echo it on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Serve the merged OpenAPI document of all modules.
    ///
    /// The document is checked by parsing it into utoipa's model; Swagger UI
    /// is mounted at `/swagger-ui` with that model at `/api-docs/openapi.json`,
    /// and the raw JSON is also served at `/docs/openapi.json`.
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = openapi_document(registry);

        let openapi_obj = match serde_json::from_value::<OpenApi>(openapi_spec.clone()) {
            Ok(openapi) => openapi,
            Err(err) => {
                tracing::warn!(error = %err, "merged OpenAPI document is invalid, serving a bare one");
                OpenApiBuilder::new()
                    .info(
                        InfoBuilder::new()
                            .title("Atrium API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            }
        };

        self.router = self
            .router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_obj));

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

/// Merge module fragments into one document.
///
/// Module paths are prefixed with `/api/{module_name}`; schemas are merged by name.
/// Fragments may reference the shared error responses
/// (`#/components/responses/NotFound`, ...), the `Message` schema and the
/// `bearerAuth` security scheme.
pub fn openapi_document(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Atrium API",
            "version": "1.0.0",
            "description": "Bookstore and restaurant menu REST API"
        },
        "paths": {},
        "components": {
            "schemas": {},
            "responses": {},
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT"
                }
            }
        }
    });

    // Add common error response schema
    openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string"
                    },
                    "message": {
                        "type": "string"
                    },
                    "details": {
                        "type": "array",
                        "items": {
                            "type": "object"
                        }
                    },
                    "trace_id": {
                        "type": "string"
                    },
                    "timestamp": {
                        "type": "string"
                    }
                },
                "required": ["code", "message", "details", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["components"]["schemas"]["Message"] = serde_json::json!({
        "type": "object",
        "properties": {
            "message": {
                "type": "string"
            }
        },
        "required": ["message"]
    });

    for (name, description) in [
        ("BadRequest", "Validation error"),
        ("Unauthorized", "Missing or invalid token"),
        ("Forbidden", "Insufficient permissions"),
        ("NotFound", "Not found"),
        ("Conflict", "Conflict"),
        ("InternalError", "Internal server error"),
    ] {
        openapi_spec["components"]["responses"][name] = serde_json::json!({
            "description": description,
            "content": {
                "application/json": {
                    "schema": {
                        "$ref": "#/components/schemas/ErrorResponse"
                    }
                }
            }
        });
    }

    // Add server health endpoint
    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    // Collect OpenAPI specs from all modules
    for module in registry.modules() {
        if let Some(module_spec) = module.openapi() {
            // Merge paths from module
            if let Some(paths) = module_spec.get("paths") {
                if let Some(paths_obj) = paths.as_object() {
                    for (path, path_item) in paths_obj {
                        // Prefix module paths with /api/{module_name}
                        let prefixed_path = format!("/api/{}{}", module.name(), path);
                        openapi_spec["paths"][prefixed_path] = path_item.clone();
                    }
                }
            }

            // Merge schemas from module
            if let Some(components) = module_spec.get("components") {
                if let Some(schemas) = components.get("schemas") {
                    if let Some(schemas_obj) = schemas.as_object() {
                        for (schema_name, schema_def) in schemas_obj {
                            openapi_spec["components"]["schemas"][schema_name] =
                                schema_def.clone();
                        }
                    }
                }
            }
        }
    }

    openapi_spec
}

/// Request ID generator (time-ordered UUIDs)
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = uuid::Uuid::now_v7()
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    struct Shelf;

    #[async_trait::async_trait]
    impl atrium_kernel::Module for Shelf {
        fn name(&self) -> &'static str {
            "shelves"
        }

        fn openapi(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({
                "paths": {
                    "/{id}": {
                        "get": {
                            "summary": "Get shelf",
                            "responses": {
                                "200": { "description": "Shelf" },
                                "404": { "$ref": "#/components/responses/NotFound" }
                            }
                        }
                    }
                },
                "components": { "schemas": { "Shelf": { "type": "object" } } }
            }))
        }
    }

    async fn get(router: Router, path: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_module_mounting() {
        let module_router = Router::new()
            .route("/", axum::routing::get(|| async { "list" }))
            .route("/{id}", axum::routing::get(|| async { "one" }));

        let router = RouterBuilder::new()
            .mount_module("shelves", module_router)
            .build();

        assert_eq!(get(router.clone(), "/api/shelves").await.1, b"list");
        assert_eq!(get(router.clone(), "/api/shelves/42").await.1, b"one");
        assert_eq!(get(router, "/shelves").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let router = RouterBuilder::new()
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .route("/health", axum::routing::get(|| async { "ok" }))
            .build();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_openapi_merges_module_fragments() {
        let mut registry = ModuleRegistry::new();
        registry.register(std::sync::Arc::new(Shelf)).unwrap();

        let document = openapi_document(&registry);
        assert!(document["paths"]["/api/shelves/{id}"]["get"].is_object());
        assert!(document["paths"]["/healthz"].is_object());
        assert!(document["components"]["schemas"]["Shelf"].is_object());
        assert!(document["components"]["schemas"]["ErrorResponse"].is_object());

        let router = RouterBuilder::new().with_openapi(&registry).build();
        let (status, body) = get(router.clone(), "/docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let served: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(served, document);

        let (status, body) = get(router, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let swagger: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(swagger["paths"]["/api/shelves/{id}"]["get"].is_object());
    }

    #[test]
    fn test_openapi_document_parses_as_utoipa_model() {
        let mut registry = ModuleRegistry::new();
        registry.register(std::sync::Arc::new(Shelf)).unwrap();

        let openapi: OpenApi = serde_json::from_value(openapi_document(&registry)).unwrap();
        assert!(openapi.paths.paths.contains_key("/api/shelves/{id}"));
        let components = openapi.components.unwrap();
        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.responses.contains_key("NotFound"));
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }
}
