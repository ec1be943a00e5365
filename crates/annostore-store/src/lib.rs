//! annostore-store: Storage and search gateways for the annotation store
//!
//! This crate provides:
//! - PostgreSQL storage for annotations and documents
//! - Migration management with embedded SQL
//! - Type-safe database operations via sqlx
//! - A transaction handle so callers can defer side effects until commit
//! - SQL-backed annotation search returning ordered id lists and totals
//!
//! # Usage
//!
//! ```rust,ignore
//! use annostore_store::{Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! // Create an annotation inside an explicit transaction
//! let mut txn = store.begin().await?;
//! let annotation = txn.create_annotation(&new).await?;
//! txn.commit().await?;
//! ```

pub mod error;
pub mod models;
pub mod schema;
pub mod search;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{AnnotationChanges, AnnotationRow, NewAnnotation};
pub use search::{SearchQuery, SearchResult, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
pub use store::{Store, StoreConfig, StoreTxn};

// Re-export annostore-core for downstream crates
pub use annostore_core;
