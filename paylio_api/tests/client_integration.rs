use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use paylio_api::{CancelOptions, Client, Error, ErrorKind, HttpClient, ListOptions, VERSION};
use reqwest::Method;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn transport(base_url: &str, timeout: Duration) -> HttpClient {
    HttpClient::new("sk_test", base_url, timeout, reqwest::Client::new())
}

fn client(base_url: &str) -> Client {
    Client::builder("sk_test").base_url(base_url).build().unwrap()
}

#[tokio::test]
async fn sends_fixed_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .and(header("X-API-Key", "sk_test_key"))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .and(header("User-Agent", format!("paylio-rust/{}", VERSION).as_str()))
        .and(header("X-SDK-Source", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let hc = HttpClient::new(
        "sk_test_key",
        &server.uri(),
        Duration::from_secs(10),
        reqwest::Client::new(),
    );
    let data = hc.get("/test", None).await.unwrap();
    assert_eq!(data["ok"], true);
}

#[tokio::test]
async fn get_sends_params_and_no_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "10"))
        .and(|req: &Request| req.body.is_empty())
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let hc = transport(&server.uri(), Duration::from_secs(10));
    let params = BTreeMap::from([
        ("page".to_string(), "2".to_string()),
        ("page_size".to_string(), "10".to_string()),
    ]);
    hc.get("/list", Some(&params)).await.unwrap();
}

#[tokio::test]
async fn post_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cancel"))
        .and(body_json(json!({"cancel_at_period_end": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let hc = transport(&server.uri(), Duration::from_secs(10));
    let data = hc
        .post("/cancel", &json!({"cancel_at_period_end": true}))
        .await
        .unwrap();
    assert_eq!(data["success"], true);
}

#[tokio::test]
async fn custom_base_url_with_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/custom/path"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let hc = transport(&format!("{}/custom/", server.uri()), Duration::from_secs(10));
    hc.request::<()>(Method::GET, "/path", None, None).await.unwrap();
}

#[tokio::test]
async fn error_response_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("X-Request-Id", "req_abc")
                .set_body_string(r#"{"error": {"code": "invalid_param", "message": "bad field"}}"#),
        )
        .mount(&server)
        .await;

    let hc = transport(&server.uri(), Duration::from_secs(10));
    let err = hc.get("/v1", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(err.message(), "bad field");
    assert_eq!(err.code(), Some("invalid_param"));
    assert_eq!(err.http_status(), 400);
    assert_eq!(err.details().headers["X-Request-Id"], "req_abc");
    assert!(err.details().json_body.is_some());
}

#[tokio::test]
async fn status_mapping_over_the_wire() {
    let cases = [
        (401, ErrorKind::Authentication),
        (400, ErrorKind::InvalidRequest),
        (404, ErrorKind::NotFound),
        (429, ErrorKind::RateLimit),
        (500, ErrorKind::Api),
    ];

    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(r#"{"error": "test"}"#))
            .mount(&server)
            .await;

        let hc = transport(&server.uri(), Duration::from_secs(10));
        let err = hc.get("/err", None).await.unwrap_err();
        assert_eq!(err.kind(), kind, "status {status}");
        assert_eq!(err.message(), "test");
    }
}

#[tokio::test]
async fn timeout_is_connection_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ok": true}"#)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let hc = transport(&server.uri(), Duration::from_millis(50));
    let err = hc.get("/slow", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(err.message(), "Request timed out");
    assert_eq!(err.http_status(), 0);
}

#[tokio::test]
async fn refused_connection_is_connection_error() {
    let hc = transport("http://127.0.0.1:1", Duration::from_secs(5));
    let err = hc.get("/fail", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_ne!(err.message(), "Request timed out");
    assert!(err.message().starts_with("Connection error"));
}

#[tokio::test]
async fn truncated_body_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"ok\"")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let hc = transport(&format!("http://{}", addr), Duration::from_secs(5));
    let err = hc.get("/partial", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.message().starts_with("failed to read response body"));
}

#[tokio::test]
async fn concurrent_requests_share_one_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .expect(8)
        .mount(&server)
        .await;

    let hc = Arc::new(transport(&server.uri(), Duration::from_secs(10)));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let hc = Arc::clone(&hc);
            tokio::spawn(async move { hc.get(&format!("/item/{}", i), None).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

#[tokio::test]
async fn retrieve_returns_subscription() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscription/user_456"))
        .and(header("X-API-Key", "sk_test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("subscription.json")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let sub = client.subscription().retrieve("user_456").await.unwrap();
    assert_eq!(sub.id, "sub_123");
    assert_eq!(sub.plan.slug, "pro");
    assert_eq!(sub.provider, "stripe");
}

#[tokio::test]
async fn close_leaves_injected_client_usable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let shared = reqwest::Client::new();
    let client = Client::builder("sk_test")
        .base_url(&server.uri())
        .http_client(shared.clone())
        .build()
        .unwrap();
    client.close();

    let err = client.http().get("/ping", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(err.message(), "Client has been closed");

    let resp = shared
        .get(format!("{}/ping", server.uri()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn null_fields_decode_as_zero_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscription/user_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id": "sub_1", "status": "active", "provider": null, "plan": null}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/user_1/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"items": null, "total": 0, "page": 1, "page_size": 20, "total_pages": 0}"#,
        ))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let sub = client.subscription().retrieve("user_1").await.unwrap();
    assert_eq!(sub.id, "sub_1");
    assert_eq!(sub.provider, "");
    assert_eq!(sub.plan.slug, "");

    let list = client.subscription().list("user_1", None).await.unwrap();
    assert!(list.items.is_empty());
}

#[tokio::test]
async fn retrieve_blank_user_id_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    for user_id in ["", "   "] {
        let err = client.subscription().retrieve(user_id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument("user_id")));
    }
}

#[tokio::test]
async fn retrieve_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscription/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"error": {"code": "not_found", "message": "No subscription"}}"#),
        )
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let err = client.subscription().retrieve("missing").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    let api = err.as_api().unwrap();
    assert_eq!(api.message(), "No subscription");
    assert_eq!(api.code(), Some("not_found"));
}

#[tokio::test]
async fn retrieve_type_mismatch_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscription/user_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"plan": "not-a-plan-object"}"#))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let err = client.subscription().retrieve("user_1").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn list_returns_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/user_456/subscriptions"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "20"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("subscription_history.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let list = client
        .subscription()
        .list("user_456", Some(ListOptions { page: 2, page_size: 20 }))
        .await
        .unwrap();
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.total, 45);
    assert!(list.has_more());
}

#[tokio::test]
async fn list_default_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/user_1/subscriptions"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"items": [], "total": 0, "page": 1, "page_size": 20, "total_pages": 0}"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let list = client.subscription().list("user_1", None).await.unwrap();
    assert!(list.items.is_empty());
    assert!(!list.has_more());

    let opts = ListOptions { page: 0, page_size: -5 };
    client.subscription().list("user_1", Some(opts)).await.unwrap();
}

#[tokio::test]
async fn cancel_at_period_end_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subscription/sub_123/cancel"))
        .and(body_json(json!({"cancel_at_period_end": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("subscription_cancel.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let result = client.subscription().cancel("sub_123", None).await.unwrap();
    assert!(result.success);
    assert!(result.cancel_at_period_end);
}

#[tokio::test]
async fn cancel_now_sends_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subscription/sub_123/cancel"))
        .and(body_json(json!({"cancel_at_period_end": false})))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id": "sub_123", "object": "subscription", "success": true, "cancel_at_period_end": false}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let result = client
        .subscription()
        .cancel("sub_123", Some(CancelOptions { cancel_now: true }))
        .await
        .unwrap();
    assert!(!result.cancel_at_period_end);
}

#[tokio::test]
async fn cancel_blank_id_is_rejected() {
    let client = client("http://127.0.0.1:1");
    let err = client.subscription().cancel(" ", None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument("subscription_id")));
}

#[tokio::test]
async fn service_errors_propagate() {
    let client = client("http://127.0.0.1:1");
    let err = client.subscription().retrieve("user_1").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Connection));
    let err = client.subscription().list("user_1", None).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Connection));
    let err = client.subscription().cancel("sub_1", None).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Connection));
}
