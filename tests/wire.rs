//! Exercises the real `reqwest` transport against a one-shot local responder.

mod common;

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use serde_json::json;

use common::{credentials, no_sleep, API_KEY, CLIENT_ID};
use ozon_performance::{ErrorKind, OzonClient, RetryPolicy};

struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Accepts a single connection, captures the request and replies with `status`
/// and `body`.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let mut request_body = vec![0u8; length];
        reader.read_exact(&mut request_body).unwrap();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = stream;
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(request_body).unwrap(),
        }
    });

    (base_url, handle)
}

fn client_for(base_url: &str) -> OzonClient {
    OzonClient::builder(credentials())
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .retry_policy(RetryPolicy::no_retry().with_sleep(no_sleep))
        .build()
        .unwrap()
}

#[test]
fn test_post_over_the_wire() {
    let (base_url, server) = serve_once("200 OK", r#"{"id":42,"name":"Wire Campaign"}"#);
    let client = client_for(&base_url);

    let created = client
        .create_campaign(&json!({"name": "Wire Campaign", "type": "search"}))
        .unwrap();
    let captured = server.join().unwrap();

    assert_eq!(created["id"], 42);
    assert_eq!(captured.request_line, "POST /api/v1/campaigns HTTP/1.1");
    assert_eq!(captured.body, r#"{"name":"Wire Campaign","type":"search"}"#);
    assert_eq!(captured.header("Client-Id"), Some(CLIENT_ID));
    assert_eq!(captured.header("Api-Key"), Some(API_KEY));
    assert_eq!(captured.header("Content-Type"), Some("application/json"));
    assert_eq!(captured.header("X-Signature").map(str::len), Some(64));
    assert!(captured.header("X-Timestamp").is_some());
}

#[test]
fn test_rate_limit_status_over_the_wire() {
    let (base_url, server) = serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#);
    let client = client_for(&base_url);

    let err = client.get_campaigns().unwrap_err();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "GET /api/v1/campaigns HTTP/1.1");
    assert_eq!(err.kind(), ErrorKind::RateLimit);
    assert_eq!(err.status(), Some(429));
}

#[test]
fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(&base_url).get_campaigns().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), None);
}
