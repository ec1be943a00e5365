//! Presenters: domain annotations to public JSON representations.
//!
//! Two presenters exist: the flat JSON shape served by the CRUD and
//! search endpoints, and the JSON-LD document served by the `jsonld`
//! read variant. Both are pure functions of an [`AnnotationResource`].

use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

use crate::resources::AnnotationResource;

/// JSON-LD context URL; also the `profile` parameter of the content type
/// the jsonld variant is served with.
pub const CONTEXT_URL: &str = "http://www.w3.org/ns/anno.jsonld";

/// Presenter for the public JSON representation.
pub struct AnnotationJsonPresenter<'a> {
    resource: &'a AnnotationResource,
}

impl<'a> AnnotationJsonPresenter<'a> {
    pub fn new(resource: &'a AnnotationResource) -> Self {
        Self { resource }
    }

    /// Render the annotation as a JSON object.
    ///
    /// Client-supplied `extra` fields are carried at the top level but
    /// never override the fields this service owns.
    pub fn asdict(&self) -> Value {
        let ann = &self.resource.annotation;

        let mut out = match &ann.extra {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        let read_principal = if ann.shared {
            format!("group:{}", ann.groupid)
        } else {
            ann.userid.clone()
        };

        out.insert("id".into(), json!(ann.id.to_string()));
        out.insert("created".into(), json!(rfc3339(ann.created)));
        out.insert("updated".into(), json!(rfc3339(ann.updated)));
        out.insert("user".into(), json!(ann.userid));
        out.insert("uri".into(), json!(ann.target_uri));
        out.insert("text".into(), json!(ann.text));
        out.insert("tags".into(), json!(ann.tags));
        out.insert("group".into(), json!(ann.groupid));
        out.insert(
            "permissions".into(),
            json!({
                "read": [read_principal],
                "admin": [ann.userid],
                "update": [ann.userid],
                "delete": [ann.userid],
            }),
        );
        out.insert(
            "target".into(),
            json!([{
                "source": ann.target_uri,
                "selector": ann.target_selectors,
            }]),
        );
        out.insert(
            "links".into(),
            serde_json::to_value(&self.resource.links).unwrap_or(Value::Null),
        );

        if !ann.references.is_empty() {
            out.insert("references".into(), json!(ann.references));
        }

        if let Some(doc) = &ann.document {
            out.insert(
                "document".into(),
                json!({
                    "title": doc.title,
                    "web_uri": doc.web_uri,
                }),
            );
        }

        Value::Object(out)
    }
}

/// Presenter for the JSON-LD (Web Annotation) representation.
pub struct AnnotationJsonLdPresenter<'a> {
    resource: &'a AnnotationResource,
}

impl<'a> AnnotationJsonLdPresenter<'a> {
    pub fn new(resource: &'a AnnotationResource) -> Self {
        Self { resource }
    }

    /// Render the annotation as a linked-data document.
    pub fn asdict(&self) -> Value {
        let ann = &self.resource.annotation;

        let mut bodies = vec![json!({
            "type": "TextualBody",
            "value": ann.text,
            "format": "text/markdown",
        })];
        for tag in &ann.tags {
            bodies.push(json!({
                "type": "TextualBody",
                "value": tag,
                "purpose": "tagging",
            }));
        }

        json!({
            "@context": CONTEXT_URL,
            "type": "Annotation",
            "id": self.resource.links.json,
            "created": rfc3339(ann.created),
            "modified": rfc3339(ann.updated),
            "creator": ann.userid,
            "body": bodies,
            "target": [{
                "source": ann.target_uri,
                "selector": ann.target_selectors,
            }],
        })
    }
}

fn rfc3339(t: chrono::DateTime<chrono::Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use annostore_core::{Annotation, AnnotationId, DocumentInfo};
    use chrono::Utc;
    use uuid::Uuid;

    fn resource(shared: bool) -> AnnotationResource {
        let annotation = Annotation {
            id: AnnotationId::from_uuid(Uuid::nil()),
            created: Utc::now(),
            updated: Utc::now(),
            userid: "acct:alice@example.com".into(),
            groupid: "__world__".into(),
            text: "hello".into(),
            tags: vec!["greeting".into()],
            shared,
            target_uri: "http://example.com/page".into(),
            target_selectors: serde_json::json!([{"type": "TextQuoteSelector", "exact": "hi"}]),
            references: vec![],
            extra: serde_json::json!({"custom": 7}),
            document: Some(DocumentInfo {
                title: Some("Example".into()),
                web_uri: Some("http://example.com/page".into()),
            }),
        };
        AnnotationResource::resolve(annotation, &test_config())
    }

    #[test]
    fn json_presents_core_fields() {
        let r = resource(true);
        let out = AnnotationJsonPresenter::new(&r).asdict();

        assert_eq!(out["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(out["user"], "acct:alice@example.com");
        assert_eq!(out["uri"], "http://example.com/page");
        assert_eq!(out["text"], "hello");
        assert_eq!(out["group"], "__world__");
        assert_eq!(out["target"][0]["source"], "http://example.com/page");
        assert_eq!(out["document"]["title"], "Example");
        assert!(out["links"]["json"]
            .as_str()
            .unwrap()
            .ends_with("/annotations/00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn shared_annotation_grants_group_read() {
        let r = resource(true);
        let out = AnnotationJsonPresenter::new(&r).asdict();
        assert_eq!(out["permissions"]["read"], json!(["group:__world__"]));
        assert_eq!(out["permissions"]["delete"], json!(["acct:alice@example.com"]));
    }

    #[test]
    fn private_annotation_grants_owner_read() {
        let r = resource(false);
        let out = AnnotationJsonPresenter::new(&r).asdict();
        assert_eq!(out["permissions"]["read"], json!(["acct:alice@example.com"]));
    }

    #[test]
    fn extra_fields_survive_but_never_override() {
        let mut r = resource(true);
        r.annotation.extra = serde_json::json!({"custom": 7, "id": "spoofed"});
        let out = AnnotationJsonPresenter::new(&r).asdict();
        assert_eq!(out["custom"], 7);
        assert_eq!(out["id"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn references_appear_only_for_replies() {
        let r = resource(true);
        let out = AnnotationJsonPresenter::new(&r).asdict();
        assert!(out.get("references").is_none());

        let mut r = resource(true);
        let root = AnnotationId::new();
        r.annotation.references = vec![root];
        let out = AnnotationJsonPresenter::new(&r).asdict();
        assert_eq!(out["references"][0], root.to_string());
    }

    #[test]
    fn jsonld_document_shape() {
        let r = resource(true);
        let out = AnnotationJsonLdPresenter::new(&r).asdict();

        assert_eq!(out["@context"], CONTEXT_URL);
        assert_eq!(out["type"], "Annotation");
        assert_eq!(out["id"], r.links.json.as_str());
        assert_eq!(out["creator"], "acct:alice@example.com");
        assert_eq!(out["body"][0]["value"], "hello");
        assert_eq!(out["body"][1]["purpose"], "tagging");
        assert_eq!(out["target"][0]["selector"][0]["type"], "TextQuoteSelector");
    }
}
