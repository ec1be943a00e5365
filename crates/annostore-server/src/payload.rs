//! Request payload parsing.
//!
//! Parsing is separated from validation: a body that is not well-formed
//! JSON is a payload error with a fixed message, while a well-formed body
//! that violates the schema is a validation error with field detail.

use bytes::Bytes;

use crate::error::ApiError;

/// Parse a request body as a JSON value.
///
/// Returns [`ApiError::Payload`] for an empty or malformed body.
pub fn json_payload(body: &Bytes) -> Result<serde_json::Value, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Payload);
    }
    serde_json::from_slice(body).map_err(|_| ApiError::Payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_json() {
        let body = Bytes::from_static(br#"{"uri": "http://example.com"}"#);
        let value = json_payload(&body).unwrap();
        assert_eq!(value["uri"], "http://example.com");
    }

    #[test]
    fn empty_body_is_payload_error() {
        let err = json_payload(&Bytes::new()).unwrap_err();
        assert!(matches!(err, ApiError::Payload));
    }

    #[test]
    fn malformed_body_is_payload_error() {
        let err = json_payload(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(matches!(err, ApiError::Payload));
    }

    #[test]
    fn non_object_json_still_parses() {
        // Structural rules (object required, fields typed) belong to the
        // schema validator, not the payload parser.
        let value = json_payload(&Bytes::from_static(b"[1, 2]")).unwrap();
        assert!(value.is_array());
    }
}
