//! SQL-backed annotation search.
//!
//! Search returns ordered id lists plus a total; resolving ids to full
//! records is the caller's batch-presentation problem. Ordering is
//! newest-updated-first with the id as a stable tiebreak, and the id
//! order returned here is authoritative: callers must not re-sort.
//!
//! Every query carries a visibility predicate matching the read rules
//! of single-annotation fetches, so search never returns an id the
//! caller could not fetch directly.

use uuid::Uuid;

use annostore_core::WORLD_GROUP;

use crate::error::StoreResult;
use crate::store::Store;

/// Default number of rows returned when no limit is given.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Hard cap on the number of rows a single search may return.
pub const MAX_SEARCH_LIMIT: i64 = 200;

/// A validated search query.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Exact match on the annotated target URI.
    pub uri: Option<String>,
    /// Exact match on the owning userid.
    pub user: Option<String>,
    /// Exact match on the group.
    pub group: Option<String>,
    /// Annotations carrying this tag.
    pub tag: Option<String>,
    /// Case-insensitive substring over text, target URI and tags.
    pub any: Option<String>,
    /// Maximum rows to return (clamped to [`MAX_SEARCH_LIMIT`]).
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: Option<i64>,
    /// When set, replies are excluded from the main result and returned
    /// as a separate ordered id list.
    pub separate_replies: bool,
    /// Userid of the caller, for visibility filtering. `None` means an
    /// anonymous caller.
    pub viewer: Option<String>,
}

impl SearchQuery {
    /// Effective row limit after defaulting and clamping.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(0, MAX_SEARCH_LIMIT)
    }

    /// Effective row offset (never negative).
    #[must_use]
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Result of a search: a total plus ordered id lists.
///
/// `reply_ids` is populated only in separate-reply mode and is disjoint
/// from `annotation_ids` by construction (replies are excluded from the
/// main query there).
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Number of annotations matching the filters (top-level matches
    /// only in separate-reply mode).
    pub total: i64,
    /// Matching annotation ids, best match first.
    pub annotation_ids: Vec<Uuid>,
    /// Replies to the returned annotations, in the same ordering.
    pub reply_ids: Vec<Uuid>,
}

/// Build the WHERE clause for a query, starting parameter numbering at
/// `first_idx`. Returns the clause text and the next free index.
///
/// The visibility predicate is always present: results follow the same
/// read rules as single-annotation fetches. Anonymous callers see shared
/// world-group annotations only; authenticated callers see every shared
/// annotation plus their own.
///
/// Binding order must match: uri, user, group, tag, any, then the
/// visibility parameter (viewer userid, or the world group).
fn build_where(query: &SearchQuery, first_idx: usize) -> (String, usize) {
    let mut sql = String::from("WHERE TRUE");
    let mut idx = first_idx;

    if query.uri.is_some() {
        sql.push_str(&format!(" AND target_uri = ${idx}"));
        idx += 1;
    }
    if query.user.is_some() {
        sql.push_str(&format!(" AND userid = ${idx}"));
        idx += 1;
    }
    if query.group.is_some() {
        sql.push_str(&format!(" AND groupid = ${idx}"));
        idx += 1;
    }
    if query.tag.is_some() {
        sql.push_str(&format!(" AND ${idx} = ANY(tags)"));
        idx += 1;
    }
    if query.any.is_some() {
        sql.push_str(&format!(
            " AND (text ILIKE ${idx} OR target_uri ILIKE ${idx} \
             OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE t ILIKE ${idx}))"
        ));
        idx += 1;
    }
    if query.separate_replies {
        sql.push_str(" AND \"references\" = '{}'");
    }

    let (visibility, next) = visibility_clause(query.viewer.as_deref(), idx);
    sql.push_str(&visibility);

    (sql, next)
}

/// Visibility predicate for a caller, binding one parameter at `idx`.
fn visibility_clause(viewer: Option<&str>, idx: usize) -> (String, usize) {
    let clause = match viewer {
        Some(_) => format!(" AND (shared OR userid = ${idx})"),
        None => format!(" AND shared AND groupid = ${idx}"),
    };
    (clause, idx + 1)
}

/// Escape LIKE metacharacters in a user-supplied substring.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn bind_filters<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    query: &'q SearchQuery,
    any_pattern: &'q Option<String>,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    if let Some(ref uri) = query.uri {
        q = q.bind(uri);
    }
    if let Some(ref user) = query.user {
        q = q.bind(user);
    }
    if let Some(ref group) = query.group {
        q = q.bind(group);
    }
    if let Some(ref tag) = query.tag {
        q = q.bind(tag);
    }
    if let Some(pattern) = any_pattern {
        q = q.bind(pattern);
    }
    match query.viewer {
        Some(ref viewer) => q.bind(viewer),
        None => q.bind(WORLD_GROUP),
    }
}

/// Run a search against the store.
pub async fn run(store: &Store, query: &SearchQuery) -> StoreResult<SearchResult> {
    let (where_sql, next_idx) = build_where(query, 1);
    let any_pattern = query.any.as_deref().map(like_pattern);

    // Total over the filters, without pagination.
    let count_sql = format!("SELECT COUNT(*) FROM annotations {where_sql}");
    let total: (i64,) = bind_filters(
        sqlx::query_as(&count_sql),
        query,
        &any_pattern,
    )
    .fetch_one(store.pool())
    .await?;

    let rows_sql = format!(
        "SELECT id FROM annotations {where_sql} \
         ORDER BY updated DESC, id LIMIT ${next_idx} OFFSET ${}",
        next_idx + 1
    );
    let rows: Vec<(Uuid,)> = bind_filters(sqlx::query_as(&rows_sql), query, &any_pattern)
        .bind(query.effective_limit())
        .bind(query.effective_offset())
        .fetch_all(store.pool())
        .await?;

    let annotation_ids: Vec<Uuid> = rows.into_iter().map(|(id,)| id).collect();

    let reply_ids = if query.separate_replies && !annotation_ids.is_empty() {
        fetch_reply_ids(store, &annotation_ids, query.viewer.as_deref()).await?
    } else {
        Vec::new()
    };

    tracing::debug!(
        total = total.0,
        rows = annotation_ids.len(),
        replies = reply_ids.len(),
        "Search completed"
    );

    Ok(SearchResult {
        total: total.0,
        annotation_ids,
        reply_ids,
    })
}

/// Replies whose thread root is among `root_ids`, newest first. The
/// caller's visibility rules apply to replies too: a private reply is
/// returned only to its owner.
async fn fetch_reply_ids(
    store: &Store,
    root_ids: &[Uuid],
    viewer: Option<&str>,
) -> StoreResult<Vec<Uuid>> {
    let (visibility, _) = visibility_clause(viewer, 2);
    let sql = format!(
        r#"SELECT id FROM annotations
           WHERE "references" <> '{{}}' AND "references"[1] = ANY($1){visibility}
           ORDER BY updated DESC, id"#
    );

    let mut q = sqlx::query_as::<_, (Uuid,)>(&sql).bind(root_ids);
    q = match viewer {
        Some(viewer) => q.bind(viewer),
        None => q.bind(WORLD_GROUP),
    };
    let rows = q.fetch_all(store.pool()).await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
