use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::debug;

use super::services::is_truthy;
use crate::error::ApiError;

/// Buffers the whole request body and decodes it as a JSON object.
///
/// Unlike `axum::Json` this does not insist on a `Content-Type` header, and
/// every failure surfaces as `ApiError::MalformedBody`.
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::MalformedBody(e.body_text()))?;
        debug!(len = bytes.len(), "request body received");
        parse_body(&bytes).map(JsonObject)
    }
}

/// The raw `:id` path segment, still unvalidated.
///
/// A segment axum cannot decode (e.g. `%FF`) is reported as
/// `ApiError::InvalidIdentifier` rather than axum's plain-text rejection.
pub struct RawUserId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RawUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                debug!(error = %e, "id segment rejected");
                ApiError::InvalidIdentifier
            })?;
        Ok(RawUserId(raw))
    }
}

pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    if !is_truthy(&value) {
        return Err(ApiError::MalformedBody(String::new()));
    }

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::MalformedBody("Expected a JSON object.".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn decodes_an_object() {
        let map = parse_body(br#"{"username":"a","age":1}"#).unwrap();
        assert_eq!(map.get("username"), Some(&Value::from("a")));
    }

    #[test]
    fn empty_body_is_malformed_and_carries_decoder_text() {
        match parse_body(b"") {
            Err(ApiError::MalformedBody(detail)) => {
                assert!(detail.contains("EOF"), "{detail}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn falsy_values_are_malformed() {
        for raw in ["null", "false", "0", "\"\""] {
            assert!(
                matches!(parse_body(raw.as_bytes()), Err(ApiError::MalformedBody(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn non_objects_are_malformed() {
        assert!(matches!(parse_body(b"[1,2]"), Err(ApiError::MalformedBody(_))));
        assert!(matches!(parse_body(b"42"), Err(ApiError::MalformedBody(_))));
    }

    #[test]
    fn empty_object_is_accepted() {
        assert!(parse_body(b"{}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn extractor_does_not_need_content_type() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"username":"plain"}"#))
            .unwrap();
        let JsonObject(map) = JsonObject::from_request(req, &()).await.unwrap();
        assert_eq!(map.get("username"), Some(&Value::from("plain")));
    }

    #[tokio::test]
    async fn extractor_rejects_garbage() {
        let req = axum::http::Request::builder()
            .method("PUT")
            .uri("/")
            .body(Body::from("{not json"))
            .unwrap();
        let err = JsonObject::from_request(req, &()).await.err().unwrap();
        assert!(err.to_string().starts_with("Error while parsing request body. "));
    }
}
