//! Service descriptor endpoint.
//!
//! `GET /` returns a machine-readable index of the API: every annotation
//! operation with its method and URL template, plus the search endpoint.
//! Clients use it to discover the service without hard-coding routes.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Describe the API surface.
async fn service_index(State(state): State<AppState>) -> Json<Value> {
    Json(describe(&state.config().public_url))
}

/// Build the descriptor document for a given API base URL.
///
/// URL templates use `:id` as the annotation id placeholder.
fn describe(base: &str) -> Value {
    let annotation_url = format!("{base}/annotations/:id");
    json!({
        "message": "Annotator Store API",
        "links": {
            "annotation": {
                "create": {
                    "method": "POST",
                    "url": format!("{base}/annotations"),
                    "desc": "Create a new annotation",
                },
                "read": {
                    "method": "GET",
                    "url": annotation_url,
                    "desc": "Get an existing annotation",
                },
                "update": {
                    "method": "PUT",
                    "url": annotation_url,
                    "desc": "Update an existing annotation",
                },
                "delete": {
                    "method": "DELETE",
                    "url": annotation_url,
                    "desc": "Delete an annotation",
                },
            },
            "search": {
                "method": "GET",
                "url": format!("{base}/search"),
                "desc": "Basic search API",
            },
        },
    })
}

/// Build the service index routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(service_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_lists_every_operation() {
        let doc = describe("http://api.example.com");
        assert_eq!(doc["message"], "Annotator Store API");

        let ann = &doc["links"]["annotation"];
        assert_eq!(ann["create"]["method"], "POST");
        assert_eq!(
            ann["create"]["url"],
            "http://api.example.com/annotations"
        );
        assert_eq!(ann["read"]["method"], "GET");
        assert_eq!(
            ann["read"]["url"],
            "http://api.example.com/annotations/:id"
        );
        assert_eq!(ann["update"]["method"], "PUT");
        assert_eq!(ann["delete"]["method"], "DELETE");

        assert_eq!(doc["links"]["search"]["method"], "GET");
        assert_eq!(
            doc["links"]["search"]["url"],
            "http://api.example.com/search"
        );
    }
}
