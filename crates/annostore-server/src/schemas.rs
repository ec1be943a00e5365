//! Payload schema validation for create and update requests.
//!
//! Validation always runs before any storage call: a payload that fails
//! here leaves storage untouched and publishes no events. The update
//! schema is parameterized by the annotation's prior state, because some
//! rules (group reassignment) depend on what the annotation already is.

use serde_json::{Map, Value};
use uuid::Uuid;

use annostore_store::{AnnotationChanges, NewAnnotation};

use crate::extract::Principal;

/// A structural or semantic payload violation, rendered at 400 with this
/// message as the reason.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Top-level keys the schemas interpret; everything else is carried
/// opaquely in `extra`.
const KNOWN_KEYS: &[&str] = &[
    "uri", "text", "tags", "group", "shared", "references", "target", "document",
];

/// Validator for `POST /annotations` payloads.
pub struct CreateAnnotationSchema<'a> {
    principal: &'a Principal,
    default_group: &'a str,
}

impl<'a> CreateAnnotationSchema<'a> {
    pub fn new(principal: &'a Principal, default_group: &'a str) -> Self {
        Self {
            principal,
            default_group,
        }
    }

    /// Validate a parsed payload into a storage input.
    pub fn validate(&self, payload: Value) -> Result<NewAnnotation, ValidationError> {
        let obj = as_object(&payload)?;

        let uri = require_uri(obj)?;
        let text = optional_string(obj, "text")?.unwrap_or_default();
        let tags = optional_string_list(obj, "tags")?.unwrap_or_default();
        let shared = optional_bool(obj, "shared")?.unwrap_or(false);
        let group = optional_string(obj, "group")?
            .unwrap_or_else(|| self.default_group.to_string());
        let references = optional_references(obj)?.unwrap_or_default();
        let target_selectors = target_selectors(obj).unwrap_or_else(|| Value::Array(vec![]));
        let (document_title, document_web_uri) = optional_document(obj)?;

        Ok(NewAnnotation {
            userid: self.principal.userid.clone(),
            groupid: group,
            text,
            tags,
            shared,
            target_uri: uri,
            target_selectors,
            references,
            extra: extra_fields(obj),
            document_title,
            document_web_uri,
        })
    }
}

/// Validator for `PUT /annotations/{id}` payloads.
///
/// Constructed from the annotation's unmodified prior state; the group
/// rule compares against it.
pub struct UpdateAnnotationSchema<'a> {
    existing_target_uri: &'a str,
    existing_groupid: &'a str,
}

impl<'a> UpdateAnnotationSchema<'a> {
    pub fn new(existing_target_uri: &'a str, existing_groupid: &'a str) -> Self {
        Self {
            existing_target_uri,
            existing_groupid,
        }
    }

    /// Validate a parsed payload into a partial update.
    pub fn validate(&self, payload: Value) -> Result<AnnotationChanges, ValidationError> {
        let obj = as_object(&payload)?;

        if let Some(group) = optional_string(obj, "group")? {
            if group != self.existing_groupid {
                return Err(ValidationError::new("group may not be changed"));
            }
        }

        let target_uri = match obj.get("uri") {
            None => None,
            Some(_) => Some(require_uri(obj)?),
        };

        let extra = {
            let fields = extra_fields(obj);
            match &fields {
                Value::Object(map) if map.is_empty() => None,
                _ => Some(fields),
            }
        };

        let (document_title, mut document_web_uri) = optional_document(obj)?;
        // Document metadata without an explicit web URI re-attaches to
        // whichever target URI the update leaves in place.
        if document_title.is_some() && document_web_uri.is_none() {
            document_web_uri = Some(
                target_uri
                    .clone()
                    .unwrap_or_else(|| self.existing_target_uri.to_string()),
            );
        }

        Ok(AnnotationChanges {
            text: optional_string(obj, "text")?,
            tags: optional_string_list(obj, "tags")?,
            shared: optional_bool(obj, "shared")?,
            target_uri,
            target_selectors: target_selectors(obj),
            extra,
            document_title,
            document_web_uri,
        })
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload
        .as_object()
        .ok_or_else(|| ValidationError::new("payload must be a JSON object"))
}

fn require_uri(obj: &Map<String, Value>) -> Result<String, ValidationError> {
    let uri = match obj.get("uri") {
        Some(Value::String(s)) => s.trim(),
        Some(_) => return Err(ValidationError::new("uri: must be a string")),
        None => return Err(ValidationError::new("uri: 'uri' is a required property")),
    };
    if uri.is_empty() {
        return Err(ValidationError::new("uri: 'uri' must not be empty"));
    }
    Ok(uri.to_string())
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::new(format!("{key}: must be a string"))),
    }
}

fn optional_bool(obj: &Map<String, Value>, key: &str) -> Result<Option<bool>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::new(format!("{key}: must be a boolean"))),
    }
}

fn optional_string_list(
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(String::from)
                    .ok_or_else(|| ValidationError::new(format!("{key}: must be a list of strings")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(ValidationError::new(format!(
            "{key}: must be a list of strings"
        ))),
    }
}

fn optional_references(obj: &Map<String, Value>) -> Result<Option<Vec<Uuid>>, ValidationError> {
    let Some(ids) = optional_string_list(obj, "references")? else {
        return Ok(None);
    };
    ids.iter()
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| {
                ValidationError::new(format!("references: '{s}' is not a valid annotation id"))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Selectors from the first target entry, carried verbatim.
fn target_selectors(obj: &Map<String, Value>) -> Option<Value> {
    obj.get("target")?
        .as_array()?
        .first()?
        .get("selector")
        .cloned()
}

fn optional_document(
    obj: &Map<String, Value>,
) -> Result<(Option<String>, Option<String>), ValidationError> {
    match obj.get("document") {
        None | Some(Value::Null) => Ok((None, None)),
        Some(Value::Object(doc)) => {
            let title = match doc.get("title") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                // Some clients send title as a one-element list.
                Some(Value::Array(items)) => items.first().and_then(|v| v.as_str()).map(String::from),
                Some(_) => {
                    return Err(ValidationError::new("document.title: must be a string"));
                }
            };
            let web_uri = match doc.get("web_uri") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => {
                    return Err(ValidationError::new("document.web_uri: must be a string"));
                }
            };
            Ok((title, web_uri))
        }
        Some(_) => Err(ValidationError::new("document: must be an object")),
    }
}

/// Collect top-level keys the schema does not interpret.
fn extra_fields(obj: &Map<String, Value>) -> Value {
    let extra: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(extra)
}

// ============================================================================
// Tests
// ============================================================================
