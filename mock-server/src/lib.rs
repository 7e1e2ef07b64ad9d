use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginUser {
    pub username: String,
    pub password: String,
}

/// Users keyed by email.
pub type Db = Arc<RwLock<HashMap<String, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", get(index))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome" }))
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterUser>) -> Response {
    if input.name.chars().count() < 2 {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Name must be at least 2 characters");
    }
    if input.password.chars().count() < 6 {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Password must be at least 6 characters");
    }

    let mut users = db.write().await;
    if users.contains_key(&input.email) {
        return message(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
        password: input.password,
    };
    info!(user_id = %user.id, "user registered");
    let body = json!({ "message": "User registered successfully", "user_id": user.id });
    users.insert(user.email.clone(), user);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn login(State(db): State<Db>, Json(input): Json<LoginUser>) -> Response {
    let users = db.read().await;
    let found = users
        .values()
        .find(|u| (u.name == input.username || u.email == input.username) && u.password == input.password);
    match found {
        Some(user) => Json(json!({ "message": "Login successful", "user_id": user.id })).into_response(),
        None => message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

/// Reflects what arrived so clients can inspect their own requests.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    Json(json!({
        "method": method.as_str(),
        "content_type": content_type,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Answers with the requested status and a plain-text body.
async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}
