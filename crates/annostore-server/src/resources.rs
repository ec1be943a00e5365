//! Per-request presentation resources.
//!
//! An [`AnnotationResource`] composes an annotation with its resolved
//! group and link context. It exists only for the duration of
//! presentation and is never persisted.

use serde::Serialize;

use annostore_core::{Annotation, WORLD_GROUP};

use crate::config::ServerConfig;

/// Resolved group context for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct GroupInfo {
    /// Group identifier.
    pub id: String,
    /// Whether the group's shared annotations are world-readable.
    pub world_readable: bool,
}

impl GroupInfo {
    /// Resolve a group id into its context.
    pub fn resolve(groupid: &str) -> Self {
        Self {
            id: groupid.to_string(),
            world_readable: groupid == WORLD_GROUP,
        }
    }
}

/// Links to the annotation's representations.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationLinks {
    /// Canonical JSON API URL.
    pub json: String,
    /// HTML page showing the annotation.
    pub html: String,
    /// In-context link resolving to the annotation on its target page,
    /// when an in-context service is deployed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incontext: Option<String>,
}

impl AnnotationLinks {
    /// Build links for an annotation from the configured base URLs.
    pub fn resolve(annotation: &Annotation, config: &ServerConfig) -> Self {
        let id = &annotation.id;
        Self {
            json: format!("{}/annotations/{id}", config.public_url),
            html: format!("{}/a/{id}", config.html_url),
            incontext: config
                .incontext_url
                .as_ref()
                .map(|base| format!("{base}/{id}")),
        }
    }
}

/// A read-only composition of an annotation with resolved group and link
/// context, constructed once per request.
#[derive(Debug, Clone)]
pub struct AnnotationResource {
    pub annotation: Annotation,
    pub group: GroupInfo,
    pub links: AnnotationLinks,
}

impl AnnotationResource {
    /// Resolve presentation context for an annotation.
    pub fn resolve(annotation: Annotation, config: &ServerConfig) -> Self {
        let group = GroupInfo::resolve(&annotation.groupid);
        let links = AnnotationLinks::resolve(&annotation, config);
        Self {
            annotation,
            group,
            links,
        }
    }
}
