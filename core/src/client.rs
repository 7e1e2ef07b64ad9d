//! Stateless HTTP request builder and response parser for the portal API.
//!
//! # Design
//! `RequestClient` holds only a `base_url` and carries no mutable state
//! between calls. `build_request` turns an endpoint plus a `RequestConfig`
//! into an `HttpRequest`; `parse_response` turns an `HttpResponse` into the
//! parsed JSON data or an `ApiError`. Executing the round-trip in between is
//! someone else's job, which keeps this module deterministic.

use serde_json::Value;

use crate::body::RequestBody;
use crate::error::ApiError;
use crate::http::{merge_headers, remove_header, HttpMethod, HttpRequest, HttpResponse, Payload};

const CONTENT_TYPE: &str = "content-type";
const DEFAULT_HEADERS: &[(&str, &str)] = &[(CONTENT_TYPE, "application/json")];

/// Method, caller headers and body for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestConfig {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: RequestBody::None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }
}

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct RequestClient {
    base_url: String,
}

impl RequestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `endpoint` onto the base address with exactly one slash.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }

    pub fn build_request(&self, endpoint: &str, config: RequestConfig) -> Result<HttpRequest, ApiError> {
        let RequestConfig { method, headers, body } = config;
        let mut headers = merge_headers(DEFAULT_HEADERS, headers);

        let body = match body {
            RequestBody::Multipart(form) => {
                remove_header(&mut headers, CONTENT_TYPE);
                Some(Payload::Multipart(form))
            }
            RequestBody::Binary(bytes) => {
                remove_header(&mut headers, CONTENT_TYPE);
                Some(Payload::Binary(bytes))
            }
            RequestBody::Json(value) => {
                let text = serde_json::to_string(&value).map_err(|e| ApiError::Serialization(e.to_string()))?;
                Some(Payload::Text(text))
            }
            RequestBody::Text(text) => Some(Payload::Text(text)),
            RequestBody::None => None,
        };

        Ok(HttpRequest {
            method,
            url: self.resolve_url(endpoint),
            headers,
            body,
        })
    }

    pub fn build_get(&self, endpoint: &str, headers: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        self.build_request(endpoint, RequestConfig::new(HttpMethod::Get).headers(headers.iter().copied()))
    }

    pub fn build_post(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(HttpMethod::Post, endpoint, body, headers)
    }

    pub fn build_put(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(HttpMethod::Put, endpoint, body, headers)
    }

    pub fn build_patch(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(HttpMethod::Patch, endpoint, body, headers)
    }

    pub fn build_delete(&self, endpoint: &str, headers: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        self.build_request(endpoint, RequestConfig::new(HttpMethod::Delete).headers(headers.iter().copied()))
    }

    fn build_with_body(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(endpoint, RequestConfig::new(method).headers(headers.iter().copied()).body(body))
    }

    /// Parse the body as JSON (`null` when it is not JSON) and map any
    /// status outside 200–299 to `ApiError::Http`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        let data = serde_json::from_str::<Value>(&response.body).ok();
        if response.is_success() {
            return Ok(data.unwrap_or(Value::Null));
        }
        Err(ApiError::Http {
            status: response.status,
            message: failure_message(response.status, data.as_ref()),
            payload: data,
        })
    }
}

/// `message` from the payload when it carries a truthy scalar, otherwise a
/// generic line naming the status. Numbers and `true` are rendered as text;
/// `null`, `false`, `0`, `""` and nested values fall back.
fn failure_message(status: u16, data: Option<&Value>) -> String {
    let message = match data.and_then(|d| d.get("message")) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("true".to_string()),
        _ => None,
    };
    message.unwrap_or_else(|| format!("Request failed with status {status}"))
}
