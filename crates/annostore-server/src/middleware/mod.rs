//! HTTP middleware components.

pub mod request_id;

pub use request_id::{propagate_request_id, request_id_layer, REQUEST_ID_HEADER};
