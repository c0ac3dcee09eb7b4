//! Integration tests for the Shift client against a mock HTTP server.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{body_json, body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shift_sdk::{BodyEncoding, ErrorKind, Namespace, NoParams, ShiftClient};

fn client_for(server: &MockServer) -> ShiftClient {
    ShiftClient::new(&format!("{}/", server.uri()), " key ", "secret ").unwrap()
}

#[derive(Serialize)]
struct ShiftQuery {
    month: &'static str,
    page: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Token creation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_token_then_authenticated_get() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/create-token"))
        .and(body_string("key=ext-key&password=ext-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ex-app/shifts"))
        .and(header("authorization", "Bearer abc123"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .external_app()
        .create_token(" ext-key", "ext-secret ")
        .await
        .unwrap();
    assert_eq!(client.external_app().token().as_deref(), Some("abc123"));

    let shifts = client.external_app().get("/shifts/ ", &NoParams::default()).await.unwrap();
    assert_eq!(shifts, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_legacy_create_token_uses_constructor_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/create-token"))
        .and(body_string("key=key&password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "legacy"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.create_token().await.unwrap();
    assert_eq!(client.token(&Namespace::ExternalApp).as_deref(), Some("legacy"));
}

#[tokio::test]
async fn test_create_token_sends_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/customer-api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "cu"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.set_token(&Namespace::CustomerApi, "stale");
    client.customer_api().create_token("alice", "pw").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(
        String::from_utf8_lossy(&requests[0].body),
        "username=alice&password=pw"
    );
    assert_eq!(client.customer_api().token().as_deref(), Some("cu"));
}

#[tokio::test]
async fn test_create_token_missing_token_field_keeps_slot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/create-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.external_app().set_token("previous");

    let err = client.external_app().create_token("k", "s").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.message(), "create token error");
    assert_eq!(client.external_app().token().as_deref(), Some("previous"));
}

#[tokio::test]
async fn test_create_token_empty_body_is_generic_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/customer-api/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.customer_api().create_token("u", "p").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(client.customer_api().token(), None);
}

#[tokio::test]
async fn test_create_token_failure_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/create-token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "bad credentials"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customer-api/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/partner/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.external_app().create_token("k", "s").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.code(), 401);
    assert_eq!(err.message(), "bad credentials");

    let err = client.customer_api().create_token("u", "p").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalServer);
    assert_eq!(err.message(), "HTTP 500 Internal Server Error");

    let err = client.other_api("partner").create_token("u", "p").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.code(), 403);

    // Unmatched path: the mock server answers 404.
    let err = client
        .other_api("nowhere")
        .create_token("u", "p")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_other_api_tokens_share_one_slot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/alpha/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "alpha-token"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/beta/auth/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "beta-token"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alpha/items"))
        .and(header("authorization", "Bearer beta-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.other_api("alpha").create_token("u", "p").await.unwrap();
    client
        .other_api("beta")
        .create_token_at("/auth/session/", "u", "p")
        .await
        .unwrap();

    assert_eq!(client.other_api("alpha").token().as_deref(), Some("beta-token"));
    assert_eq!(client.external_app().token(), None);

    let items = client.other_api("alpha").get("items", &NoParams::default()).await.unwrap();
    assert_eq!(items, json!({"items": []}));
}

// ─────────────────────────────────────────────────────────────────────────────
// Request dispatch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_endpoint_never_reaches_network() {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for endpoint in ["", "   ", " / "] {
        let err = client
            .external_app()
            .get(endpoint, &NoParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.code(), 9001);
        assert_eq!(err.message(), "end point empty");

        let err = client
            .customer_api()
            .post(endpoint, &json!({"a": "b"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 9001);
    }
}

#[tokio::test]
async fn test_get_encodes_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer-api/shifts"))
        .and(query_param("month", "2024-05"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.customer_api().set_token("cu");
    let out = client
        .customer_api()
        .get(
            "shifts",
            &ShiftQuery {
                month: "2024-05",
                page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(out["total"], 3);
}

#[tokio::test]
async fn test_post_form_encodes_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/members"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("name=Sato&role=staff"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let out = client
        .external_app()
        .post("members", &[("name", "Sato"), ("role", "staff")])
        .await
        .unwrap();
    assert_eq!(out, json!({"id": 7}));
}

#[tokio::test]
async fn test_post_json_encoding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/members"))
        .and(body_json(json!({"name": "Sato", "tags": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ShiftClient::builder()
        .base_url(server.uri())
        .body_encoding(BodyEncoding::Json)
        .build()
        .unwrap();
    let out = client
        .external_app()
        .post("members", &json!({"name": "Sato", "tags": ["a", "b"]}))
        .await
        .unwrap();
    assert_eq!(out["ok"], true);
}

#[tokio::test]
async fn test_unset_token_still_sends_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer-api/me"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.customer_api().token(), None);
    client.customer_api().get("me", &NoParams::default()).await.unwrap();
}

#[tokio::test]
async fn test_non_json_success_returns_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ex-app/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let out = client.external_app().get("ping", &NoParams::default()).await.unwrap();
    assert_eq!(out, Value::Null);
}

#[tokio::test]
async fn test_request_with_explicit_token_and_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports/v2/export"))
        .and(header("authorization", "Bearer manual"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("queued")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let out = client
        .request_with_token(
            shift_sdk::Method::Post,
            "reports",
            Some("manual"),
            "v2/export/",
            &NoParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(out, json!("queued"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Error classification
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_422_captures_validation_errors() {
    let server = MockServer::start().await;
    let body = json!({"errors": {"field": ["required"]}});

    Mock::given(method("POST"))
        .and(path("/customer-api/reservations"))
        .respond_with(ResponseTemplate::new(422).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.validation_errors(), None);

    let err = client
        .customer_api()
        .post("reservations", &[("date", "")])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
    assert_eq!(err.code(), 422);
    assert_eq!(err.message(), "HTTP 422 Unprocessable Entity");
    assert_eq!(client.validation_errors(), Some(body));

    client.clear_validation_errors();
    assert_eq!(client.validation_errors(), None);
}

#[tokio::test]
async fn test_403_prefers_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ex-app/admin"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden by role"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .external_app()
        .get("admin", &NoParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Role);
    assert_eq!(err.code(), 403);
    assert_eq!(err.message(), "forbidden by role");
}

#[tokio::test]
async fn test_status_mapping() {
    let server = MockServer::start().await;

    for status in [401u16, 500, 418] {
        Mock::given(method("GET"))
            .and(path(format!("/ex-app/status/{}", status)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let api = client.external_app();

    let err = api.get("status/401", &NoParams::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(err.is_auth_error());

    let err = api.get("status/500", &NoParams::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalServer);

    let err = api.get("status/418", &NoParams::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.code(), 418);

    let err = api.get("missing", &NoParams::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), "HTTP 404 Not Found");
}

#[tokio::test]
async fn test_connection_failure_is_generic_transport_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ShiftClient::builder()
        .base_url(format!("http://{}", addr))
        .build()
        .unwrap();
    let err = client
        .external_app()
        .get("shifts", &NoParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.code(), 7);
}

#[tokio::test]
async fn test_timeout_is_generic_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ex-app/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = ShiftClient::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = client
        .external_app()
        .get("slow", &NoParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.code(), 28);
}

#[tokio::test]
async fn test_truncated_body_is_generic_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Promise 100 bytes, send 5, then hang up.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\nshort",
            )
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    let client = ShiftClient::builder()
        .base_url(format!("http://{}", addr))
        .build()
        .unwrap();
    let err = client
        .external_app()
        .get("shifts", &NoParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.code(), 56);
}

// ─────────────────────────────────────────────────────────────────────────────
// Structured parameters
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_with_list_parameter_uses_indexed_brackets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ex-app/staffs"))
        .and(query_param("ids[0]", "1"))
        .and(query_param("ids[1]", "2"))
        .and(query_param("store", "shibuya"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let staffs = client
        .external_app()
        .get("staffs", &json!({"ids": [1, 2], "store": "shibuya", "flag": null}))
        .await
        .unwrap();
    assert_eq!(staffs, json!([{"id": 1}, {"id": 2}]));

    let received = server.received_requests().await.unwrap();
    let keys: Vec<String> = received[0]
        .url
        .query_pairs()
        .map(|(k, _)| k.into_owned())
        .collect();
    assert_eq!(keys, vec!["ids[0]", "ids[1]", "store"]);
}

#[tokio::test]
async fn test_post_nested_form_body_uses_brackets() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/customer-api/reservations"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .customer_api()
        .post(
            "reservations",
            &json!({"staff": {"id": 1, "name": "Sato"}, "slots": [10, 11], "paid": true}),
        )
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&received[0].body)
        .into_owned()
        .collect();
    let expected: Vec<(String, String)> = [
        ("staff[id]", "1"),
        ("staff[name]", "Sato"),
        ("slots[0]", "10"),
        ("slots[1]", "11"),
        ("paid", "1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(pairs, expected);
}

#[tokio::test]
async fn test_scalar_payload_is_client_error_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .external_app()
        .get("staffs", &"ids=1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
    assert_eq!(err.code(), shift_sdk::CLIENT_ERROR_CODE);
}

#[tokio::test]
async fn test_numeric_token_is_stored_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ex-app/create-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": 12345})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ex-app/shifts"))
        .and(header("authorization", "Bearer 12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .external_app()
        .create_token("ext-key", "ext-secret")
        .await
        .unwrap();
    assert_eq!(client.external_app().token().as_deref(), Some("12345"));

    client
        .external_app()
        .get("shifts", &NoParams::default())
        .await
        .unwrap();
}
