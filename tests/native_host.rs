#![cfg(feature = "no-wasm")]

use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use weapp_api::app::session::{ACCESS_TOKEN_KEY, EXPIRED_AT_KEY};
use weapp_api::client::native::{native_host, FileStorage, LogUi, NativeHost, ReqwestNetwork};
use weapp_api::client::{FixedCodeLogin, Platform};
use weapp_api::interface::HostStorage;
use weapp_api::{ApiClient, ApiConfig, Method, RequestOptions};

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Accepts one connection, answers it, and yields the raw request text.
async fn one_shot_server(
    status: u16,
    reason: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(head_end) = find(&buf, b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    });

    (format!("http://{addr}/api"), handle)
}

fn native_client(
    host: String,
    storage: &std::path::Path,
) -> ApiClient<NativeHost<FixedCodeLogin>> {
    let config = ApiConfig::new(host);
    let platform = native_host(&config, FixedCodeLogin::new("abc"), storage).unwrap();
    ApiClient::new(platform, config)
}

#[tokio::test]
async fn login_over_http_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("storage.json");
    let (host, server) = one_shot_server(
        201,
        "Created",
        r#"{"access_token":"T1","token_type":"Bearer","expires_in":7200}"#,
    )
    .await;
    let client = native_client(host, &storage_path);

    let mut params = Map::new();
    params.insert("name".to_string(), json!("summer"));
    let response = client.login(params).await.unwrap();

    assert_eq!(response.status_code, 201);
    assert_eq!(response.data["access_token"], json!("T1"));
    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/weapp/authorizations HTTP/1.1"));
    assert!(raw.contains(r#""code":"abc""#));
    assert!(raw.contains(r#""name":"summer""#));

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&storage_path).unwrap()).unwrap();
    assert_eq!(on_disk[ACCESS_TOKEN_KEY], json!("T1"));
    assert!(on_disk[EXPIRED_AT_KEY].is_string());
}

#[tokio::test]
async fn auth_get_sends_query_and_bearer() {
    let dir = tempfile::tempdir().unwrap();
    let (host, server) = one_shot_server(200, "OK", r#"{"data":[]}"#).await;
    let client = native_client(host, &dir.path().join("storage.json"));
    let far_future = chrono::Utc::now().timestamp_millis() + 3_600_000;
    client.host().storage.set(ACCESS_TOKEN_KEY, "A").unwrap();
    client
        .host()
        .storage
        .set(EXPIRED_AT_KEY, &far_future.to_string())
        .unwrap();

    let options = RequestOptions::new("topics")
        .method(Method::Get)
        .data(json!({"page": 2}));
    let response = client.auth_request(options, false).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.data, json!({"data": []}));
    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /api/topics?page=2 HTTP/1.1"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer a\r\n"));
}

#[tokio::test]
async fn server_error_is_returned_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let (host, server) =
        one_shot_server(500, "Internal Server Error", r#"{"message":"boom"}"#).await;
    let client = native_client(host, &dir.path().join("storage.json"));

    let response = client.request("topics", true).await.unwrap();

    assert_eq!(response.status_code, 500);
    assert_eq!(response.data, json!({"message": "boom"}));
    server.await.unwrap();
}

#[tokio::test]
async fn logout_204_clears_storage_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("storage.json");
    let (host, server) = one_shot_server(204, "No Content", "").await;
    let client = native_client(host, &storage_path);
    client.host().storage.set(ACCESS_TOKEN_KEY, "A").unwrap();

    let response = client.logout().await.unwrap();

    assert_eq!(response.status_code, 204);
    assert_eq!(response.data, Value::Null);
    let raw = server.await.unwrap();
    assert!(raw.starts_with("DELETE /api/authorizations/current HTTP/1.1"));

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&storage_path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({}));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("s.json");
    let platform = Platform::new(
        ReqwestNetwork::from_client(reqwest::Client::new()),
        FixedCodeLogin::new("abc"),
        FileStorage::open(&storage_path).unwrap(),
        LogUi,
    );
    assert_eq!(platform.storage.path(), storage_path.as_path());
    let client = ApiClient::new(platform, ApiConfig::new(format!("http://{addr}/api")));

    let err = client.request("topics", false).await.unwrap_err();

    assert!(matches!(err.kind(), weapp_api::ErrorKind::ReqwestError(_)));
}
