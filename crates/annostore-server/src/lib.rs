//! annostore-server: HTTP REST API for annotation storage and retrieval
//!
//! This crate provides:
//! - CRUD endpoints for annotations, plus search and a discovery document
//! - A JSON-LD read variant with a fixed profile content type
//! - Payload parsing and schema validation ahead of any storage call
//! - Post-commit event publication feeding an SSE stream
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling (token and client-id headers, no cookies)
//! - Request ID generation
//! - A single JSON failure envelope for every error kind
//!
//! Authorization is explicit: handlers receive either a validated
//! [`extract::Principal`] or an [`extract::AnnotationContext`] whose
//! permission check has already run. No handler re-checks authentication
//! in its body.
//!
//! # Usage
//!
//! ```rust,ignore
//! use annostore_server::{config::ServerConfig, state::AppState};
//!
//! let config = ServerConfig::from_env()?;
//! let store = annostore_store::Store::connect(store_config).await?;
//! let app = annostore_server::routes::build_router(AppState::new(store, config));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod middleware;
pub mod payload;
pub mod presenters;
pub mod resources;
pub mod routes;
pub mod schemas;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use events::{AnnotationEvent, EventBroadcaster, PostCommit};
pub use state::AppState;

// Re-export dependent crates
pub use annostore_core;
pub use annostore_store;
