//! Integration tests for the call sources

use callstat_core::error::CallstatError;
use callstat_core::provider::CallSource;
use callstat_source::{FileCallSource, HttpCallSource};
use chrono::{TimeZone, Utc};
use std::io::Write;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const CALLS_JSON: &str = r#"[
    {
        "id": "c-1",
        "prospectName": "Acme Corp",
        "date": "2024-03-01T10:00:00Z",
        "duration": 420,
        "outcome": "qualified",
        "status": "completed",
        "sentimentScore": 0.9,
        "tags": ["enterprise"]
    },
    {
        "id": "c-2",
        "prospectName": "Globex",
        "date": "2024-03-02T15:30:00Z",
        "duration": 1200,
        "outcome": "lost",
        "sentimentScore": 0.25
    }
]"#;

/// Serve one canned HTTP response and return the base URL
async fn serve_once(status: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let _ = socket.read(&mut buf).await;

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}")
}

/// Source talking to a local test server, ignoring any proxy settings
fn local_source(base: &str) -> HttpCallSource {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpCallSource::with_client(base, client).unwrap()
}

#[tokio::test]
async fn test_http_success_envelope() {
    let base = serve_once(
        "200 OK",
        format!(r#"{{"success": true, "data": {CALLS_JSON}}}"#),
    )
    .await;

    let source = local_source(&base);
    let calls = source.fetch_calls().await.unwrap();

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].prospect_name.as_deref(), Some("Acme Corp"));
    assert_eq!(calls[1].date, Utc.with_ymd_and_hms(2024, 3, 2, 15, 30, 0).unwrap());
}

#[tokio::test]
async fn test_http_failure_envelope_message() {
    let base = serve_once(
        "200 OK",
        r#"{"success": false, "error": "Database unavailable"}"#.to_string(),
    )
    .await;

    let err = local_source(&base).fetch_calls().await.unwrap_err();
    assert_eq!(err.to_string(), "Database unavailable");
}

#[tokio::test]
async fn test_http_failure_envelope_without_message() {
    let base = serve_once("200 OK", r#"{"success": false}"#.to_string()).await;

    let err = local_source(&base).fetch_calls().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch calls");
}

#[tokio::test]
async fn test_http_error_status_with_envelope() {
    let base = serve_once(
        "500 Internal Server Error",
        r#"{"success": false, "error": "Upstream CRM timeout"}"#.to_string(),
    )
    .await;

    let err = local_source(&base).fetch_calls().await.unwrap_err();
    assert_eq!(err.to_string(), "Upstream CRM timeout");
}

#[tokio::test]
async fn test_http_error_status_without_envelope() {
    let base = serve_once("502 Bad Gateway", "<html>bad gateway</html>".to_string()).await;

    let err = local_source(&base).fetch_calls().await.unwrap_err();
    assert!(matches!(err, CallstatError::Fetch(ref msg) if msg == "Failed to fetch calls"));
}

#[tokio::test]
async fn test_http_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = local_source(&format!("http://{addr}")).fetch_calls().await.unwrap_err();
    assert!(matches!(err, CallstatError::Network(_)));
}

#[tokio::test]
async fn test_file_source_reads_bare_array() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CALLS_JSON.as_bytes()).unwrap();

    let source = FileCallSource::new(file.path());
    let calls = source.fetch_calls().await.unwrap();

    let ids: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c-1", "c-2"]);
    assert!(calls[1].status.is_none());
}

#[tokio::test]
async fn test_file_source_reads_saved_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calls.json");
    std::fs::write(&path, format!(r#"{{"success": true, "data": {CALLS_JSON}}}"#)).unwrap();

    let calls = FileCallSource::new(&path).fetch_calls().await.unwrap();
    assert_eq!(calls.len(), 2);
}
