//! Drives the real HTTP transport against a one-shot local server.

use resend_mailer::{DeliveryError, ErrorDetail, OutgoingMessage, ResendBackend, ResendOptions};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn read_request(stream: &mut impl Read) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8(data).unwrap()
}

/// Answers a single request with `response` and hands back the raw request.
fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/emails", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });
    (url, handle)
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    )
}

fn backend(api_url: String, timeout_secs: f64) -> ResendBackend {
    let options = ResendOptions {
        api_key: Some("re_test".into()),
        from_email: Some("noreply@example.com".into()),
        api_url,
        timeout_secs,
        ..ResendOptions::default()
    };
    ResendBackend::from_options(options, false).unwrap()
}

#[test]
fn posts_json_with_bearer_token() {
    init_logger();
    let (url, server) = serve_once(http_response(
        "200 OK",
        "application/json",
        r#"{"id":"49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"}"#,
    ));
    let message = OutgoingMessage::new("Hello", "plain body")
        .with_to(vec!["a@example.com", "b@example.com"])
        .with_alternative("<p>html body</p>", "text/html");

    let sent = backend(url, 5.0).send_message(&message).unwrap();
    assert_eq!(
        sent.id.as_deref(),
        Some("49a3999c-0ce1-4ea6-ab68-afcd6dc2e794")
    );

    let request = server.join().unwrap();
    let (head, body) = request.split_once("\r\n\r\n").unwrap();
    let head = head.to_ascii_lowercase();
    assert!(head.starts_with("post /emails http/1.1"));
    assert!(head.contains("authorization: bearer re_test"));
    assert!(head.contains("content-type: application/json"));

    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "from": "noreply@example.com",
            "to": ["a@example.com", "b@example.com"],
            "subject": "Hello",
            "html": "<p>html body</p>",
            "text": "plain body",
        })
    );
}

#[test]
fn plain_text_error_keeps_status_and_body() {
    let (url, server) = serve_once(http_response(
        "500 Internal Server Error",
        "text/plain",
        "kaput",
    ));
    let message = OutgoingMessage::new("Hello", "x").with_to("a@example.com");

    let err = backend(url, 5.0).send_message(&message).unwrap_err();
    server.join().unwrap();
    assert_eq!(err.code(), "PROVIDER");
    assert!(err.to_string().contains("500 kaput"));
}

// Announces more body than it sends, then hangs up.
fn truncated_response(status: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial",
        status
    )
}

#[test]
fn unreadable_error_body_keeps_the_status() {
    let (url, server) = serve_once(truncated_response("502 Bad Gateway"));
    let message = OutgoingMessage::new("Hello", "x").with_to("a@example.com");

    let err = backend(url, 5.0).send_message(&message).unwrap_err();
    server.join().unwrap();
    match err {
        DeliveryError::Provider(err) => {
            assert_eq!(err.status, 502);
            assert_eq!(
                err.detail,
                ErrorDetail::Status {
                    status: 502,
                    body: String::new()
                }
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unreadable_success_body_is_a_transport_error() {
    let (url, server) = serve_once(truncated_response("200 OK"));
    let message = OutgoingMessage::new("Hello", "x").with_to("a@example.com");

    let err = backend(url, 5.0).send_message(&message).unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[test]
fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/emails", listener.local_addr().unwrap());
    drop(listener);

    let message = OutgoingMessage::new("Hello", "x").with_to("a@example.com");
    let err = backend(url, 5.0).send_message(&message).unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[test]
fn slow_provider_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/emails", listener.local_addr().unwrap());
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let message = OutgoingMessage::new("Hello", "x").with_to("a@example.com");
    let err = backend(url, 0.2).send_message(&message).unwrap_err();
    match err {
        DeliveryError::Transport(err) => assert!(err.timed_out),
        other => panic!("unexpected error: {:?}", other),
    }
    server.join().unwrap();
}
