//! Search endpoint.
//!
//! `GET /search` filters annotations by target URI, user, group, tag and
//! a free-text `any` term, returning fully presented rows ordered by
//! recency. With `_separate_replies` set, top-level annotations and
//! their replies come back in separate lists.
//!
//! Results are visibility-filtered for the caller: the endpoint never
//! returns an annotation the same caller could not fetch directly.

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use annostore_store::search::{self, SearchQuery};

use crate::error::ApiResult;
use crate::extract::{ApiQuery, MaybePrincipal};
use crate::routes::present_annotation;
use crate::state::AppState;

// ============================================================================
// Query Parameters
// ============================================================================

/// Raw query-string parameters for the search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub tag: Option<String>,
    pub any: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Flag parameter. Any value other than "false" and "0" enables
    /// separate-reply mode, including the bare `?_separate_replies`.
    #[serde(rename = "_separate_replies")]
    pub separate_replies: Option<String>,
}

impl SearchParams {
    fn into_query(self, viewer: Option<String>) -> SearchQuery {
        SearchQuery {
            uri: self.uri,
            user: self.user,
            group: self.group,
            tag: self.tag,
            any: self.any,
            limit: self.limit,
            offset: self.offset,
            separate_replies: self
                .separate_replies
                .is_some_and(|v| !matches!(v.as_str(), "false" | "0")),
            viewer,
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// GET /search - Search annotations.
///
/// # Response
///
/// ```text
/// {"total": 2, "rows": [ {...}, {...} ]}
/// ```
///
/// In separate-reply mode the response additionally carries a `replies`
/// list holding the replies to the returned rows:
///
/// ```text
/// {"total": 1, "rows": [ {...} ], "replies": [ {...} ]}
/// ```
async fn search_annotations(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Value>> {
    let query = params.into_query(principal.map(|p| p.userid));
    let separate_replies = query.separate_replies;

    let result = search::run(state.store(), &query).await?;

    let rows = present_batch(&state, &result.annotation_ids).await?;

    let mut body = json!({
        "total": result.total,
        "rows": rows,
    });
    if separate_replies {
        let replies = present_batch(&state, &result.reply_ids).await?;
        body["replies"] = Value::Array(replies);
    }

    Ok(Json(body))
}

/// Fetch and present a batch of annotations, preserving the id order the
/// search produced.
async fn present_batch(state: &AppState, ids: &[Uuid]) -> ApiResult<Vec<Value>> {
    let annotations = state.store().fetch_ordered_annotations(ids).await?;
    Ok(annotations
        .into_iter()
        .map(|a| present_annotation(a, state.config()))
        .collect())
}

/// Build search routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/search", get(search_annotations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(separate: Option<&str>) -> SearchParams {
        SearchParams {
            separate_replies: separate.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn separate_replies_flag_parsing() {
        assert!(!params(None).into_query(None).separate_replies);
        assert!(params(Some("true")).into_query(None).separate_replies);
        assert!(params(Some("1")).into_query(None).separate_replies);
        assert!(params(Some("")).into_query(None).separate_replies);
        assert!(!params(Some("false")).into_query(None).separate_replies);
        assert!(!params(Some("0")).into_query(None).separate_replies);
    }

    #[test]
    fn filters_carry_through() {
        let p = SearchParams {
            uri: Some("http://example.com".into()),
            tag: Some("news".into()),
            limit: Some(5),
            ..Default::default()
        };
        let q = p.into_query(None);
        assert_eq!(q.uri.as_deref(), Some("http://example.com"));
        assert_eq!(q.tag.as_deref(), Some("news"));
        assert_eq!(q.effective_limit(), 5);
    }

    #[test]
    fn caller_identity_becomes_the_query_viewer() {
        let q = params(None).into_query(Some("acct:alice@example.com".into()));
        assert_eq!(q.viewer.as_deref(), Some("acct:alice@example.com"));

        let q = params(None).into_query(None);
        assert_eq!(q.viewer, None);
    }
}
