pub mod clock;
pub mod error;
pub mod ids;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{settings::BooksSettings, InitCtx, Module};
use serde_json::json;

use clock::SystemClock;
use ids::NanoIdGenerator;
use service::BookService;

/// Books module: an in-memory book collection behind five CRUD routes
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }

    /// Module wired with random ids and the system clock
    pub fn from_settings(settings: &BooksSettings) -> Self {
        Self::new(Arc::new(BookService::new(
            Arc::new(NanoIdGenerator::new(settings.id_length)),
            Arc::new(SystemClock),
        )))
    }

    pub fn service(&self) -> &Arc<BookService> {
        &self.service
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            id_length = ctx.settings.books.id_length,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.service))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let remaining = self.service.len().unwrap_or_default();
        tracing::info!(
            module = self.name(),
            discarded_books = remaining,
            "books module stopped"
        );
        Ok(())
    }
}

fn fail_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/FailResponse" }
            }
        }
    })
}

fn success_response(description: &str, data: serde_json::Value) -> serde_json::Value {
    let mut properties = json!({
        "status": { "type": "string", "enum": ["success"] },
        "message": { "type": "string" }
    });
    if !data.is_null() {
        properties["data"] = data;
    }

    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": ["status"]
                }
            }
        }
    })
}

fn book_payload_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    })
}

fn book_id_parameter() -> serde_json::Value {
    json!({
        "name": "bookId",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": success_response("Books in insertion order", json!({
                            "type": "object",
                            "properties": {
                                "books": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/BookSummary" }
                                }
                            }
                        }))
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": book_payload_body(),
                    "responses": {
                        "201": success_response("Book added", json!({
                            "type": "object",
                            "properties": { "bookId": { "type": "string" } }
                        })),
                        "400": fail_response("Missing name, readPage above pageCount, or malformed body")
                    }
                }
            },
            "/{bookId}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [book_id_parameter()],
                    "responses": {
                        "200": success_response("Full book record", json!({
                            "type": "object",
                            "properties": {
                                "book": { "$ref": "#/components/schemas/Book" }
                            }
                        })),
                        "404": fail_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "parameters": [book_id_parameter()],
                    "requestBody": book_payload_body(),
                    "responses": {
                        "200": success_response("Book updated", serde_json::Value::Null),
                        "400": fail_response("Missing name, readPage above pageCount, or malformed body"),
                        "404": fail_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [book_id_parameter()],
                    "responses": {
                        "200": success_response("Book deleted", serde_json::Value::Null),
                        "404": fail_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "year": { "type": ["integer", "null"] },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "reading": { "type": "boolean" },
                        "finished": { "type": "boolean", "description": "readPage == pageCount" },
                        "insertedAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "id", "name", "year", "author", "summary", "publisher", "pageCount",
                        "readPage", "reading", "finished", "insertedAt", "updatedAt"
                    ]
                },
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Required, non-empty" },
                        "year": { "type": "integer" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0, "description": "Must not exceed pageCount" },
                        "reading": { "type": "boolean" }
                    },
                    "required": ["name"]
                },
                "BookSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "publisher": { "type": "string" }
                    },
                    "required": ["id", "name", "publisher"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(settings: &BooksSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::from_settings(settings))
}
