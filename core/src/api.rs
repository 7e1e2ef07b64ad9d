//! Asynchronous caller-facing client.
//!
//! `ApiClient` glues a `RequestClient` to a `Transport`: build, send, parse.
//! Each call is a single attempt. Every failure is logged once here, where
//! it is detected, and then handed back unchanged.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::body::RequestBody;
use crate::client::{RequestClient, RequestConfig};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    requests: RequestClient,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client for `config.base_url` backed by `reqwest`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::with_timeout(config.timeout()).map_err(|e| ApiError::Transport {
            message: e.message,
        })?;
        Ok(Self::with_transport(&config.base_url, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            requests: RequestClient::new(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.requests.base_url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn request(&self, endpoint: &str, config: RequestConfig) -> Result<Value, ApiError> {
        let method = config.method;
        let url = self.requests.resolve_url(endpoint);
        let result = match self.requests.build_request(endpoint, config) {
            Ok(request) => self.execute(request).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            error!(
                method = %method,
                url = %url,
                status = err.status(),
                error = %err,
                "API call error"
            );
        }
        result
    }

    /// Like `request`, then deserializes the data into `R`.
    pub async fn request_as<R: DeserializeOwned>(&self, endpoint: &str, config: RequestConfig) -> Result<R, ApiError> {
        let data = self.request(endpoint, config).await?;
        serde_json::from_value(data).map_err(|e| {
            let err = ApiError::Deserialization(e.to_string());
            error!(endpoint, error = %err, "API response did not match the expected shape");
            err
        })
    }

    pub async fn get(&self, endpoint: &str, headers: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.request(endpoint, config(HttpMethod::Get, headers, RequestBody::None)).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        self.request(endpoint, config(HttpMethod::Post, headers, body.into())).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        self.request(endpoint, config(HttpMethod::Put, headers, body.into())).await
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        self.request(endpoint, config(HttpMethod::Patch, headers, body.into())).await
    }

    /// DELETE. Named `del` to match the other short verbs.
    pub async fn del(&self, endpoint: &str, headers: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.request(endpoint, config(HttpMethod::Delete, headers, RequestBody::None)).await
    }

    async fn execute(&self, request: HttpRequest) -> Result<Value, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transport { message: e.message })?;
        debug!(status = response.status, "received response");
        self.requests.parse_response(response)
    }
}

fn config(method: HttpMethod, headers: &[(&str, &str)], body: RequestBody) -> RequestConfig {
    RequestConfig::new(method).headers(headers.iter().copied()).body(body)
}
