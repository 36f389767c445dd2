//! API Module
//!
//! HTTP handlers and routing for the demo cache server.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `GET /contains/:key` - Containment and expiry check
//! - `POST /flush` - Remove every entry
//! - `GET /stats` - Get backend statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
