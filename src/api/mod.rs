//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /api/cache` - List all live entries
//! - `POST /api/cache` - Store a key-value pair
//! - `GET /api/cache/:key` - Retrieve a value by key
//! - `DELETE /api/cache/:key` - Delete a key
//! - `GET /api/stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
