//! annostore-core: Core domain types for the annotation storage service
//!
//! This crate defines the types shared between the storage layer and the
//! HTTP API server:
//!
//! - [`AnnotationId`]: opaque annotation identifier
//! - [`Annotation`]: the core persisted entity (a note attached to a URI)
//! - [`DocumentInfo`]: resolved document metadata for presentation
//! - [`AnnotationAction`]: the mutation kind carried by events
//! - [`Permission`]: the operations gated by the authorization boundary
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize` for
//! inspection, copying, and JSON serialization.

pub mod types;
pub mod userid;

pub use types::{Annotation, AnnotationAction, AnnotationId, DocumentInfo, Permission};
pub use userid::{authority, is_valid_userid, WORLD_GROUP};
