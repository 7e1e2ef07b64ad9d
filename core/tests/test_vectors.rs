//! Verify `build_request`/`parse_response` against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Request vectors describe a call and the request it must produce; response
//! vectors describe a simulated response and the data or error it must parse
//! to. Bodies are compared as parsed JSON where they are JSON, so field order
//! does not matter.

use portal_core::{ApiError, HttpMethod, HttpResponse, Payload, RequestBody, RequestClient, RequestConfig};
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_body(spec: &Value) -> RequestBody {
    match spec["kind"].as_str().unwrap() {
        "none" => RequestBody::None,
        "json" => RequestBody::Json(spec["value"].clone()),
        "text" => RequestBody::Text(spec["value"].as_str().unwrap().to_string()),
        "binary" => RequestBody::Binary(spec["value"].as_str().unwrap().as_bytes().to_vec()),
        other => panic!("unknown body kind: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let client = RequestClient::new(vectors["base_url"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());
        let config = RequestConfig::new(method)
            .headers(pairs(&case["headers"]))
            .body(parse_body(&case["body"]));
        let expected = &case["expected_request"];

        let req = client.build_request(case["endpoint"].as_str().unwrap(), config).unwrap();
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");

        match (&req.body, &expected["body"]) {
            (None, Value::Null) => {}
            (Some(Payload::Text(text)), Value::String(want)) => assert_eq!(text, want, "{name}: body"),
            (Some(Payload::Text(text)), want) => {
                let sent: Value = serde_json::from_str(text).unwrap();
                assert_eq!(&sent, want, "{name}: body");
            }
            (Some(Payload::Binary(bytes)), Value::String(want)) => {
                assert_eq!(bytes.as_slice(), want.as_bytes(), "{name}: body")
            }
            (got, want) => panic!("{name}: body mismatch, got {got:?}, want {want}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let client = RequestClient::new("http://localhost:8000");

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let expected = &case["expected"];

        match client.parse_response(response) {
            Ok(data) => {
                let want = expected.get("ok").unwrap_or_else(|| panic!("{name}: unexpected success"));
                assert_eq!(&data, want, "{name}: data");
            }
            Err(ApiError::Http {
                status,
                message,
                payload,
            }) => {
                let want = expected.get("error").unwrap_or_else(|| panic!("{name}: unexpected failure"));
                assert_eq!(u64::from(status), want["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(message, want["message"].as_str().unwrap(), "{name}: message");
                // No `payload` key means the body was not JSON; `null` means it was JSON null.
                assert_eq!(payload, want.get("payload").cloned(), "{name}: payload");
            }
            Err(other) => panic!("{name}: unexpected error {other:?}"),
        }
    }
}
