//! Parsed IFTTT requests
//!
//! A [`Request`] is built once per inbound call from the raw HTTP request and
//! handed, read-only, to every handler invoked for that call.

use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{HeaderMap, Method};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::Error;
use crate::protocol::{REQUEST_ID_HEADER, RequestKind, SERVICE_KEY_HEADER};
use crate::server::router::{Route, classify};

const BEARER_PREFIX: &str = "Bearer ";

/// A parsed request from IFTTT
///
/// Besides the parsed fields, the request keeps the method, path and headers
/// it was built from so handlers can read anything not parsed here (such as
/// `IFTTT-Test-Mode`).
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    authenticated: bool,
    access_token: String,
    correlation_id: String,
    slug: String,
    field_slug: String,
    trigger_identity: String,
    decoded_body: Option<Value>,
    kind: RequestKind,
}

impl Request {
    /// Parse a raw HTTP request
    pub fn from_http(request: &http::Request<Bytes>) -> Result<Self, Error> {
        Self::parse(
            request.method(),
            request.uri().path(),
            request.headers(),
            request.body(),
        )
    }

    /// Parse a request from its parts
    ///
    /// A non-empty body must be valid JSON. Trigger polls must carry a
    /// `trigger_identity` string in the body.
    pub fn parse(
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Self, Error> {
        let correlation_id = header_str(headers, REQUEST_ID_HEADER).to_string();

        // A present but unreadable Authorization header must not fall back to
        // service key auth.
        let authorization = match headers.get(AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|_| {
                Error::MalformedRequest("Authorization header is not valid text".to_string())
            })?,
            None => "",
        };
        let (authenticated, access_token) = if authorization.is_empty() {
            (false, header_str(headers, SERVICE_KEY_HEADER).to_string())
        } else {
            let token = authorization
                .strip_prefix(BEARER_PREFIX)
                .unwrap_or(authorization);
            (true, token.to_string())
        };

        let decoded_body = if body.is_empty() {
            None
        } else {
            let value = serde_json::from_slice::<Value>(body).map_err(|e| {
                Error::MalformedRequest(format!("request body is not valid JSON: {}", e))
            })?;
            Some(value)
        };

        let Route {
            kind,
            slug,
            field_slug,
            trigger_identity,
        } = classify(method, path);

        let mut request = Self {
            method: method.clone(),
            path: path.to_string(),
            headers: headers.clone(),
            authenticated,
            access_token,
            correlation_id,
            slug,
            field_slug,
            trigger_identity,
            decoded_body,
            kind,
        };

        if kind == RequestKind::TriggerFetch {
            request.trigger_identity = request.body_str("trigger_identity")?.to_string();
        }

        Ok(request)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// All headers of the inbound request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as text; `None` when absent or not valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Whether the request carried a user bearer token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The bearer token, or the claimed service key when not authenticated
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Unique id of the request, for tracing
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn field_slug(&self) -> &str {
        &self.field_slug
    }

    pub fn trigger_identity(&self) -> &str {
        &self.trigger_identity
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The decoded JSON body, if the request had one
    pub fn decoded_body(&self) -> Option<&Value> {
        self.decoded_body.as_ref()
    }

    /// Look up a top-level body field
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.decoded_body.as_ref().and_then(|body| body.get(key))
    }

    /// A required string field of the body
    pub fn body_str(&self, key: &str) -> Result<&str, Error> {
        self.body_field(key)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedRequest(format!("missing string field `{}`", key)))
    }

    /// A required object of string values in the body
    pub fn body_string_map(&self, key: &str) -> Result<HashMap<String, String>, Error> {
        let object = self
            .body_field(key)
            .and_then(Value::as_object)
            .ok_or_else(|| Error::MalformedRequest(format!("missing object field `{}`", key)))?;

        object
            .iter()
            .map(|(name, value)| {
                value
                    .as_str()
                    .map(|s| (name.clone(), s.to_string()))
                    .ok_or_else(|| {
                        Error::MalformedRequest(format!("field `{}.{}` is not a string", key, name))
                    })
            })
            .collect()
    }

    /// An optional non-negative count in the body
    ///
    /// Any JSON number is accepted; fractional values are truncated.
    pub fn body_count(&self, key: &str) -> Result<Option<usize>, Error> {
        let value = match self.body_field(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };

        if let Some(count) = value.as_u64() {
            return Ok(Some(usize::try_from(count).unwrap_or(usize::MAX)));
        }
        match value.as_f64() {
            // `as` saturates at usize::MAX.
            Some(count) if count.is_finite() && count >= 0.0 => Ok(Some(count as usize)),
            _ => Err(Error::MalformedRequest(format!(
                "field `{}` is not a non-negative number",
                key
            ))),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn test_service_key_request() {
        let request = Request::parse(
            &Method::GET,
            "/ifttt/v1/status",
            &headers(&[("IFTTT-Service-Key", "abcdef"), ("X-Request-ID", "req-1")]),
            b"",
        )
        .unwrap();

        assert!(!request.is_authenticated());
        assert_eq!(request.access_token(), "abcdef");
        assert_eq!(request.correlation_id(), "req-1");
        assert_eq!(request.kind(), RequestKind::ServiceStatus);
        assert!(request.decoded_body().is_none());
    }

    #[test]
    fn test_bearer_request() {
        let request = Request::parse(
            &Method::GET,
            "/ifttt/v1/user/info",
            &headers(&[
                ("Authorization", "Bearer realsecrettoken"),
                ("IFTTT-Service-Key", "abcdef"),
            ]),
            b"",
        )
        .unwrap();

        assert!(request.is_authenticated());
        assert_eq!(request.access_token(), "realsecrettoken");
        assert_eq!(request.kind(), RequestKind::UserInfo);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = Request::parse(
            &Method::POST,
            "/ifttt/v1/actions/send",
            &HeaderMap::new(),
            b"{not json",
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn test_trigger_fetch_requires_identity() {
        let err = Request::parse(
            &Method::POST,
            "/ifttt/v1/triggers/new_photo",
            &HeaderMap::new(),
            br#"{"triggerFields":{}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));

        let request = Request::parse(
            &Method::POST,
            "/ifttt/v1/triggers/new_photo",
            &HeaderMap::new(),
            br#"{"trigger_identity":"ti-1","triggerFields":{}}"#,
        )
        .unwrap();
        assert_eq!(request.trigger_identity(), "ti-1");
        assert_eq!(request.slug(), "new_photo");
    }

    #[test]
    fn test_body_accessors() {
        let request = Request::parse(
            &Method::POST,
            "/ifttt/v1/actions/send",
            &HeaderMap::new(),
            br#"{"actionFields":{"to":"me"},"user":{"timezone":3},"limit":5}"#,
        )
        .unwrap();

        let fields = request.body_string_map("actionFields").unwrap();
        assert_eq!(fields.get("to").map(String::as_str), Some("me"));
        assert!(request.body_string_map("user").is_err());
        assert!(request.body_string_map("missing").is_err());
        assert_eq!(request.body_count("limit").unwrap(), Some(5));
        assert_eq!(request.body_count("absent").unwrap(), None);
    }

    #[test]
    fn test_body_count_accepts_any_number() {
        let request = Request::parse(
            &Method::POST,
            "/ifttt/v1/triggers/new_photo",
            &HeaderMap::new(),
            br#"{"trigger_identity":"ti","whole":2.0,"fraction":3.7,"negative":-1,"text":"2"}"#,
        )
        .unwrap();

        assert_eq!(request.body_count("whole").unwrap(), Some(2));
        assert_eq!(request.body_count("fraction").unwrap(), Some(3));
        assert!(matches!(
            request.body_count("negative"),
            Err(Error::MalformedRequest(_))
        ));
        assert!(matches!(
            request.body_count("text"),
            Err(Error::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_raw_parts_are_kept() {
        let request = Request::parse(
            &Method::POST,
            "/ifttt/v1/actions/send",
            &headers(&[("IFTTT-Test-Mode", "1"), ("IFTTT-Service-Key", "abcdef")]),
            b"",
        )
        .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/ifttt/v1/actions/send");
        assert_eq!(request.header("ifttt-test-mode"), Some("1"));
        assert_eq!(request.header("IFTTT-Test-Mode"), Some("1"));
        assert!(request.headers().contains_key("ifttt-service-key"));
        assert_eq!(request.header("x-missing"), None);
    }

    #[test]
    fn test_unreadable_authorization_is_malformed() {
        let mut map = headers(&[("IFTTT-Service-Key", "abcdef")]);
        map.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());
        let err = Request::parse(&Method::GET, "/ifttt/v1/status", &map, b"").unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }
}
