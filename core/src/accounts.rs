//! Login and registration flows.
//!
//! Forms are checked locally first; a form that fails validation never
//! reaches the network. What the server says on failure comes back as the
//! usual `ApiError`, whose message is meant to be shown to the user as is.

use serde_json::Value;
use thiserror::Error;

use crate::api::ApiClient;
use crate::body::RequestBody;
use crate::client::RequestConfig;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::transport::Transport;
use crate::types::{LoginRequest, RegisterRequest, RegisterResponse};

pub const LOGIN_ENDPOINT: &str = "/login";
pub const REGISTER_ENDPOINT: &str = "/register";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("all fields are required")]
    MissingFields,

    #[error("passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(())
    }

    fn to_request(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), FormError> {
        let fields = [&self.name, &self.email, &self.password, &self.confirm_password];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(FormError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(())
    }

    /// The confirmation field stays on the client.
    fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Validate and submit the login form. The backend's answer is returned
/// untouched; nothing is stored.
pub async fn login<T: Transport>(client: &ApiClient<T>, form: &LoginForm) -> Result<Value, AccountError> {
    form.validate()?;
    let body = RequestBody::json(&form.to_request())?;
    Ok(client.post(LOGIN_ENDPOINT, body, &[]).await?)
}

pub async fn register<T: Transport>(
    client: &ApiClient<T>,
    form: &RegistrationForm,
) -> Result<RegisterResponse, AccountError> {
    form.validate()?;
    let config = RequestConfig::new(HttpMethod::Post).body(RequestBody::json(&form.to_request())?);
    Ok(client.request_as(REGISTER_ENDPOINT, config).await?)
}
