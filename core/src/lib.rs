//! Request client core for the portal backend.
//!
//! # Overview
//! `RequestClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). `ApiClient`
//! pairs it with a `Transport` to offer the async `get/post/put/patch/del`
//! surface that callers use.
//!
//! # Design
//! - `RequestClient` is stateless; it holds only the base address, which is
//!   injected from `ClientConfig` rather than read from a global.
//! - Bodies are an explicit `RequestBody` enum: JSON is serialized, text is
//!   sent as given, binary and multipart payloads drop the default
//!   `content-type` so the transport can set its own.
//! - A response that is not JSON parses to `null`; success is decided by
//!   the status alone.
//! - Failures are `ApiError::Http` (with status and payload) or
//!   `ApiError::Transport` (no status), logged once by `ApiClient`.

pub mod accounts;
pub mod api;
pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use accounts::{AccountError, FormError, LoginForm, RegistrationForm};
pub use api::ApiClient;
pub use body::{MultipartForm, Part, PartValue, RequestBody};
pub use client::{RequestClient, RequestConfig};
pub use config::{ClientConfig, ConfigError, ConfigLoader};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Payload};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{LoginRequest, RegisterRequest, RegisterResponse};
