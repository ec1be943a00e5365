//! Annotation CRUD endpoints.
//!
//! - `POST /annotations` creates an annotation (authenticated).
//! - `GET /annotations/{id}` reads one.
//! - `GET /annotations/{id}/jsonld` reads one as a Web Annotation document.
//! - `PUT /annotations/{id}` applies a partial update (owner only).
//! - `DELETE /annotations/{id}` removes one (owner only).
//!
//! Mutations run inside a store transaction. Event notifications are
//! staged alongside the writes and published only after the transaction
//! commits, so subscribers never see a mutation that was rolled back.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::events::{AnnotationEvent, PostCommit};
use crate::extract::{AnnotationContext, Principal};
use crate::payload::json_payload;
use crate::presenters::{AnnotationJsonLdPresenter, CONTEXT_URL};
use crate::resources::AnnotationResource;
use crate::routes::present_annotation;
use crate::schemas::{CreateAnnotationSchema, UpdateAnnotationSchema};
use crate::state::AppState;

// ============================================================================
// Handlers
// ============================================================================

/// POST /annotations - Create an annotation.
///
/// # Response
///
/// - 200 OK: the created annotation in its public JSON shape
/// - 400 Bad Request: missing/invalid JSON body or failed validation
/// - 401 Unauthorized: no authenticated principal
async fn create_annotation(
    State(state): State<AppState>,
    principal: Principal,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = json_payload(&body)?;

    let schema = CreateAnnotationSchema::new(&principal, &state.config().default_group);
    let new = schema.validate(payload)?;

    let mut txn = state.store().begin().await?;
    let annotation = txn.create_annotation(&new).await?;

    let mut queue = PostCommit::new(state.broadcaster().clone());
    queue.stage(AnnotationEvent::create(annotation.id));
    queue.commit(txn).await?;

    tracing::info!(id = %annotation.id, user = %annotation.userid, "Annotation created");

    Ok(Json(present_annotation(annotation, state.config())))
}

/// GET /annotations/{id} - Read an annotation.
///
/// Access control happens in the [`AnnotationContext`] extractor: private
/// annotations are visible to their owner only, shared annotations in the
/// world group to anyone, and shared annotations in other groups to any
/// authenticated principal.
async fn read_annotation(
    State(state): State<AppState>,
    ctx: AnnotationContext,
) -> Json<Value> {
    Json(present_annotation(ctx.annotation, state.config()))
}

/// GET /annotations/{id}/jsonld - Read an annotation as JSON-LD.
///
/// Served with the Web Annotation media type, carrying the context URL
/// in the `profile` parameter.
async fn read_annotation_jsonld(
    State(state): State<AppState>,
    ctx: AnnotationContext,
) -> impl IntoResponse {
    let resource = AnnotationResource::resolve(ctx.annotation, state.config());
    let body = AnnotationJsonLdPresenter::new(&resource).asdict();

    (
        [(
            header::CONTENT_TYPE,
            format!(r#"application/ld+json; profile="{CONTEXT_URL}""#),
        )],
        Json(body),
    )
}

/// PUT /annotations/{id} - Update an annotation.
///
/// Only the fields present in the payload change; the group may never
/// change after creation.
async fn update_annotation(
    State(state): State<AppState>,
    ctx: AnnotationContext,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = json_payload(&body)?;

    let schema = UpdateAnnotationSchema::new(&ctx.annotation.target_uri, &ctx.annotation.groupid);
    let changes = schema.validate(payload)?;

    let mut txn = state.store().begin().await?;
    let updated = txn
        .update_annotation(*ctx.annotation.id.as_uuid(), &changes)
        .await?;

    let mut queue = PostCommit::new(state.broadcaster().clone());
    queue.stage(AnnotationEvent::update(updated.id));
    queue.commit(txn).await?;

    tracing::info!(id = %updated.id, "Annotation updated");

    Ok(Json(present_annotation(updated, state.config())))
}

/// DELETE /annotations/{id} - Delete an annotation.
///
/// The delete event carries a snapshot of the annotation as it was
/// before deletion, since the record cannot be fetched afterwards.
async fn delete_annotation(
    State(state): State<AppState>,
    ctx: AnnotationContext,
) -> ApiResult<Json<Value>> {
    let id = ctx.annotation.id;

    let mut txn = state.store().begin().await?;
    txn.delete_annotation(*id.as_uuid()).await?;

    let mut queue = PostCommit::new(state.broadcaster().clone());
    queue.stage(AnnotationEvent::delete(ctx.annotation));
    queue.commit(txn).await?;

    tracing::info!(id = %id, "Annotation deleted");

    Ok(Json(json!({
        "id": id.to_string(),
        "deleted": true,
    })))
}

/// Build annotation CRUD routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/annotations", post(create_annotation))
        .route(
            "/annotations/{id}",
            get(read_annotation)
                .put(update_annotation)
                .delete(delete_annotation),
        )
        .route("/annotations/{id}/jsonld", get(read_annotation_jsonld))
}
