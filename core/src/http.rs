//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! `RequestClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network; a `Transport` (or any host) executes
//! the actual I/O in between.
//!
//! Header names are stored lower-cased. HTTP treats them case-insensitively,
//! so lookups and merges compare with `eq_ignore_ascii_case` regardless.

use std::fmt;

use crate::body::MultipartForm;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire-ready request body, after the body policy has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Text sent verbatim. Serialized JSON bodies land here.
    Text(String),
    /// Opaque bytes. No content type is attached.
    Binary(Vec<u8>),
    /// Multipart form. The transport encodes it and sets the boundary.
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
///
/// Built by `RequestClient::build_request`. The caller is responsible for
/// executing it and handing the matching `HttpResponse` back to
/// `RequestClient::parse_response`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Payload>,
}

impl HttpRequest {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Merge `overrides` on top of `defaults`. A name present in both keeps the
/// override's value; the order of first appearance is preserved.
pub fn merge_headers<K, V>(
    defaults: &[(&str, &str)],
    overrides: impl IntoIterator<Item = (K, V)>,
) -> Vec<(String, String)>
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), (*v).to_string()))
        .collect();
    for (name, value) in overrides {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match merged.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => merged.push((name, value)),
        }
    }
    merged
}

/// Drop every header named `name`.
pub fn remove_header(headers: &mut Vec<(String, String)>, name: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
}
