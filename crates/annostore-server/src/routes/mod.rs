//! Route definitions for the HTTP API.

pub mod annotations;
pub mod health;
pub mod index;
pub mod search;
pub mod stream;

use axum::Router;
use serde_json::Value;

use annostore_core::Annotation;

use crate::config::ServerConfig;
use crate::presenters::AnnotationJsonPresenter;
use crate::resources::AnnotationResource;
use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(index::routes())
        .merge(search::routes())
        .merge(annotations::routes())
        .merge(stream::routes())
        .with_state(state)
}

/// Render an annotation into its public JSON shape.
pub(crate) fn present_annotation(annotation: Annotation, config: &ServerConfig) -> Value {
    let resource = AnnotationResource::resolve(annotation, config);
    AnnotationJsonPresenter::new(&resource).asdict()
}
