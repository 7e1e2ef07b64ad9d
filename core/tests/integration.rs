//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives it two ways: the
//! build/parse core with ureq doing the I/O (host-does-IO), and the async
//! `ApiClient` over `ReqwestTransport`.

use portal_core::{
    accounts, ApiClient, ApiError, ClientConfig, HttpMethod, HttpRequest, HttpResponse, LoginForm, MultipartForm,
    Payload, RegistrationForm, RequestClient,
};
use serde_json::{json, Value};

/// Bind the mock server on an ephemeral port and serve it from a background
/// thread with its own runtime.
fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data and the core decides what they mean.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let body = match req.body {
        Some(Payload::Text(text)) => Some(text.into_bytes()),
        Some(Payload::Binary(bytes)) => Some(bytes),
        Some(Payload::Multipart(_)) => panic!("multipart is exercised through reqwest"),
        None => None,
    };

    let mut response = match (req.method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.url), &req.headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.url), &req.headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&req.url), &req.headers).send(&body[..]),
        (HttpMethod::Post, None) => with_headers(agent.post(&req.url), &req.headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&req.url), &req.headers).send(&body[..]),
        (HttpMethod::Put, None) => with_headers(agent.put(&req.url), &req.headers).send_empty(),
        (HttpMethod::Patch, Some(body)) => with_headers(agent.patch(&req.url), &req.headers).send(&body[..]),
        (HttpMethod::Patch, None) => with_headers(agent.patch(&req.url), &req.headers).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn api(addr: std::net::SocketAddr) -> ApiClient {
    let config = ClientConfig {
        base_url: format!("http://{addr}"),
        timeout_secs: Some(10),
    };
    ApiClient::from_config(&config).unwrap()
}

#[test]
fn host_executed_account_lifecycle() {
    let addr = start_server();
    let client = RequestClient::new(&format!("http://{addr}"));

    // Register.
    let body = json!({"name": "Amy", "email": "amy@example.com", "password": "hunter22"});
    let req = client.build_post("register", body.clone(), &[]).unwrap();
    let created = client.parse_response(execute(req)).unwrap();
    assert_eq!(created["message"], "User registered successfully");

    // Same email again.
    let req = client.build_post("/register", body, &[]).unwrap();
    let err = client.parse_response(execute(req)).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Email already registered");

    // Log in.
    let req = client
        .build_post("/login", json!({"username": "Amy", "password": "hunter22"}), &[])
        .unwrap();
    let data = client.parse_response(execute(req)).unwrap();
    assert_eq!(data["user_id"], created["user_id"]);

    // Plain-text failure.
    let req = client.build_get("/status/500", &[]).unwrap();
    let err = client.parse_response(execute(req)).unwrap_err();
    assert_eq!(err.message(), "Request failed with status 500");
}

#[tokio::test]
async fn get_resolves_to_json() {
    let addr = start_server();
    let data = api(addr).get("/", &[]).await.unwrap();
    assert_eq!(data, json!({"message": "Welcome"}));
}

#[tokio::test]
async fn json_body_arrives_with_json_content_type() {
    let addr = start_server();
    let echo = api(addr).put("echo", json!({"title": "hello"}), &[]).await.unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["content_type"], "application/json");
    let sent: Value = serde_json::from_str(echo["body"].as_str().unwrap()).unwrap();
    assert_eq!(sent, json!({"title": "hello"}));
}

#[tokio::test]
async fn caller_content_type_wins() {
    let addr = start_server();
    let echo = api(addr)
        .post("/echo", "a=1&b=2", &[("Content-Type", "application/x-www-form-urlencoded")])
        .await
        .unwrap();
    assert_eq!(echo["content_type"], "application/x-www-form-urlencoded");
    assert_eq!(echo["body"], "a=1&b=2");
}

#[tokio::test]
async fn multipart_gets_boundary_from_transport() {
    let addr = start_server();
    let form = MultipartForm::new()
        .text("title", "avatar")
        .file("upload", "me.txt", Some("text/plain"), b"hello".to_vec());
    let echo = api(addr).patch("/echo", form, &[]).await.unwrap();
    let content_type = echo["content_type"].as_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="), "{content_type}");
    let body = echo["body"].as_str().unwrap();
    assert!(body.contains(r#"name="title""#));
    assert!(body.contains(r#"filename="me.txt""#));
    assert!(body.contains("hello"));
}

#[tokio::test]
async fn binary_body_carries_no_content_type() {
    let addr = start_server();
    let echo = api(addr).post("/echo", b"raw bytes".to_vec(), &[]).await.unwrap();
    assert!(echo["content_type"].is_null());
    assert_eq!(echo["body"], "raw bytes");
}

#[tokio::test]
async fn plain_text_server_error_gets_generic_message() {
    let addr = start_server();
    let err = api(addr).del("/status/500", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 500, payload: None, .. }));
    assert_eq!(err.to_string(), "Request failed with status 500");
}

#[tokio::test]
async fn non_json_success_is_null() {
    let addr = start_server();
    let data = api(addr).get("/status/200", &[]).await.unwrap();
    assert_eq!(data, Value::Null);
}

#[tokio::test]
async fn unknown_route_is_http_404() {
    let addr = start_server();
    let err = api(addr).get("/nowhere", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "Request failed with status 404");
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = api(addr).get("/me", &[]).await.unwrap_err();
    assert!(err.is_transport(), "{err:?}");
    assert_eq!(err.status(), None);
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn register_then_login_through_accounts() {
    let addr = start_server();
    let api = api(addr);

    let form = RegistrationForm {
        name: "Bo".to_string(),
        email: "bo@example.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    };
    let created = accounts::register(&api, &form).await.unwrap();
    assert_eq!(created.message, "User registered successfully");

    let data = accounts::login(&api, &LoginForm::new("bo@example.com", "secret1")).await.unwrap();
    assert_eq!(data["user_id"], created.user_id.as_str());

    let err = accounts::login(&api, &LoginForm::new("Bo", "wrong-pass")).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
}
