//! HTTP boundary to the provider.

use crate::errors::TransportError;
use crate::message::Payload;
use std::time::Duration;

/// One `POST` of a JSON payload, authenticated with a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    pub api_key: &'a str,
    pub payload: &'a Payload,
    pub timeout: Duration,
}

/// Whatever came back, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and hands back the raw response. Only failures to get a
/// response at all (connect, DNS, timeout, broken body) are errors here.
pub trait Transport {
    fn post_json(&self, request: HttpRequest<'_>) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a reusable `reqwest` client.
///
/// Must not be created or dropped from within an async runtime.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, request: HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(request.url)
            .bearer_auth(request.api_key)
            .json(request.payload)
            .timeout(request.timeout)
            .send()?;
        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            // Unreadable error body: keep the status, report the body as empty.
            Err(err) if !status.is_success() => {
                log::debug!(target: "resend_mailer", "Could not read error body ({}): {}", status, err);
                String::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
