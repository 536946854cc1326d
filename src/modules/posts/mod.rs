pub mod filter;
pub mod models;
pub mod routes;
pub mod schema;
pub mod views;


use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use quill_db::PostStore;
use quill_kernel::{InitCtx, Module};
use serde_json::json;

use routes::PostsState;
use views::{EditFormRenderer, TemplateRenderer};

/// Blog post resource: list, fetch, create, edit, and delete.
pub struct PostsModule {
    state: PostsState,
}

impl PostsModule {
    /// Module backed by `store`, rendering the bundled edit template.
    pub fn new(store: Arc<dyn PostStore>) -> anyhow::Result<Self> {
        Ok(Self::with_renderer(store, Arc::new(TemplateRenderer::new()?)))
    }

    pub fn with_renderer(store: Arc<dyn PostStore>, views: Arc<dyn EditFormRenderer>) -> Self {
        Self {
            state: PostsState { store, views },
        }
    }
}

#[async_trait]
impl Module for PostsModule {
    fn name(&self) -> &'static str {
        "posts"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %ctx.settings.database.url,
            "posts module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer" }
        });
        let redirect = json!({
            "description": "Redirect to the post list",
            "headers": { "Location": { "schema": { "type": "string" } } }
        });

        Some(json!({
            "paths": {
                "/posts": {
                    "get": {
                        "summary": "List posts",
                        "tags": ["Posts"],
                        "parameters": [
                            { "name": "title_like", "in": "query", "required": false, "schema": { "type": "string" } },
                            { "name": "body_like", "in": "query", "required": false, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Posts ordered by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Post" }
                                        }
                                    }
                                }
                            },
                            "406": error("Client does not accept JSON")
                        }
                    },
                    "post": {
                        "summary": "Create a post",
                        "tags": ["Posts"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreatePost" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created post",
                                "headers": { "Location": { "schema": { "type": "string" } } },
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Post" }
                                    }
                                }
                            },
                            "400": error("Body is not JSON"),
                            "406": error("Client does not accept JSON"),
                            "415": error("Body not declared as JSON"),
                            "422": error("Payload fails validation")
                        }
                    }
                },
                "/posts/{id}": {
                    "get": {
                        "summary": "Fetch a post",
                        "tags": ["Posts"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "The post",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Post" }
                                    }
                                }
                            },
                            "404": error("No such post")
                        }
                    }
                },
                "/posts/{id}/delete": {
                    "get": {
                        "summary": "Delete a post",
                        "tags": ["Posts"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "302": redirect.clone(),
                            "404": error("No such post")
                        }
                    }
                },
                "/post/{id}/edit": {
                    "get": {
                        "summary": "Edit form for a post",
                        "tags": ["Posts"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "HTML edit form",
                                "content": { "text/html": { "schema": { "type": "string" } } }
                            },
                            "404": error("No such post")
                        }
                    },
                    "put": {
                        "summary": "Apply an edit from form fields",
                        "tags": ["Posts"],
                        "parameters": [id_param],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/CreatePost" }
                                }
                            }
                        },
                        "responses": {
                            "302": redirect,
                            "400": error("Missing form field"),
                            "404": error("No such post"),
                            "406": error("Client does not accept JSON"),
                            "415": error("Body not declared as JSON")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Post": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "description": "Identifier assigned on creation" },
                            "title": { "type": "string" },
                            "body": { "type": "string" }
                        },
                        "required": ["id", "title", "body"]
                    },
                    "CreatePost": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "body": { "type": "string" }
                        },
                        "required": ["title", "body"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "posts module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "posts module stopped");
        Ok(())
    }
}

/// Create a posts module over `store`
pub fn create_module(store: Arc<dyn PostStore>) -> anyhow::Result<Arc<dyn Module>> {
    Ok(Arc::new(PostsModule::new(store)?))
}
