//! HTTP transport to the Unraid GraphQL endpoint.
//!
//! [`Transport`] is the seam between the engine and the network: it posts one
//! `{query, variables}` body and hands back the raw status and body text. It
//! does not interpret GraphQL errors and does not retry; that is the job of
//! [`crate::client`] and [`crate::normalize`].
//!
//! ## Authentication
//!
//! Every request carries the API key in the `x-api-key` header. The header
//! value is marked sensitive so it never appears in `Debug` output.
//!
//! ## TLS
//!
//! Certificate verification is on by default. It can be disabled for
//! self-signed LAN deployments, or pointed at a custom CA bundle.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::validate::VariableSet;

/// Request body posted to the GraphQL endpoint.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: &'a VariableSet,
}

/// Status and body exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any HTTP status was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("connection reset: {0}")]
    Reset(String),
    /// The configured deadline, when the engine applied it.
    #[error("{}", timeout_message(.0))]
    Timeout(Option<Duration>),
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportFailure {
    /// Connection refused/reset and timeouts. Anything else is not worth
    /// repeating.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Reset(_) | Self::Timeout(_))
    }
}

fn timeout_message(deadline: &Option<Duration>) -> String {
    match deadline {
        Some(d) => format!("no response within {}s", d.as_secs_f64()),
        None => "request timed out".to_string(),
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &GraphqlRequest<'_>) -> Result<RawResponse, TransportFailure>;
}

/// How server certificates are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    Verify,
    /// Accept any certificate.
    Skip,
    /// Verify against this PEM bundle in addition to the system roots.
    CustomCa(PathBuf),
}

/// [`Transport`] over `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: String, api_key: &str, tls: &TlsPolicy) -> Result<Self, String> {
        let mut key = reqwest::header::HeaderValue::from_str(api_key)
            .map_err(|_| "API key contains characters not allowed in an HTTP header".to_string())?;
        key.set_sensitive(true);

        let mut default_headers = reqwest::header::HeaderMap::new();
        default_headers.insert(reqwest::header::HeaderName::from_static("x-api-key"), key);
        default_headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "unraid-mcp/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        // Per-request deadlines come from the timeout class; only the connect
        // phase gets a client-wide bound here.
        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers)
            .connect_timeout(Duration::from_secs(10));

        builder = match tls {
            TlsPolicy::Verify => builder,
            TlsPolicy::Skip => {
                tracing::warn!("TLS certificate verification is disabled");
                builder.danger_accept_invalid_certs(true)
            }
            TlsPolicy::CustomCa(path) => {
                let pem = std::fs::read(path)
                    .map_err(|e| format!("Failed to read CA bundle {}: {}", path.display(), e))?;
                let cert = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| format!("Invalid CA bundle {}: {}", path.display(), e))?;
                builder.add_root_certificate(cert)
            }
        };

        let http = builder
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: &GraphqlRequest<'_>) -> Result<RawResponse, TransportFailure> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify)?;
        Ok(RawResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    let message = err.to_string();
    // A connect-phase timeout is a connect failure; the per-class deadline
    // is enforced by the caller and reported there.
    if err.is_connect() {
        return TransportFailure::Connect(message);
    }
    if err.is_timeout() {
        return TransportFailure::Timeout(None);
    }
    if is_reset(&err) {
        return TransportFailure::Reset(message);
    }
    TransportFailure::Other(message)
}

fn is_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, capture the full request, answer with `reply`.
    async fn one_shot_server(reply: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some((head, body)) = text.split_once("\r\n\r\n") {
                    let len = head
                        .to_ascii_lowercase()
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>()))
                        .map(|v| v.unwrap())
                        .unwrap_or(0);
                    if body.len() >= len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8(buf).unwrap()
        });
        (format!("http://{addr}/graphql"), handle)
    }

    #[test]
    fn request_body_shape() {
        let vars = VariableSet::new();
        let body = serde_json::to_value(GraphqlRequest {
            query: "query Online { online }",
            variables: &vars,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"query": "query Online { online }", "variables": {}})
        );
    }

    #[test]
    fn transient_failures() {
        assert!(TransportFailure::Connect("refused".into()).is_transient());
        assert!(TransportFailure::Reset("reset".into()).is_transient());
        assert!(TransportFailure::Timeout(Some(Duration::from_secs(5))).is_transient());
        assert!(TransportFailure::Timeout(None).is_transient());
        assert!(!TransportFailure::Other("bad url".into()).is_transient());
    }

    #[test]
    fn reset_found_in_source_chain() {
        #[derive(Debug, Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        assert!(is_reset(&err));
        let err = Outer(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(!is_reset(&err));
    }

    #[test]
    fn rejects_key_with_newline() {
        let res = HttpTransport::new(
            "https://tower.local/graphql".into(),
            "abc\ndef",
            &TlsPolicy::Verify,
        );
        assert!(res.is_err());
    }

    #[test]
    fn missing_ca_bundle_is_an_error() {
        let res = HttpTransport::new(
            "https://tower.local/graphql".into(),
            "key",
            &TlsPolicy::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
        );
        let err = res.err().unwrap();
        assert!(err.contains("/nonexistent/ca.pem"));
    }

    #[test]
    fn success_range() {
        let ok = RawResponse { status: 200, body: String::new() };
        let bad = RawResponse { status: 502, body: String::new() };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }

    #[tokio::test]
    async fn posts_key_in_header_and_json_body() {
        let (endpoint, server) = one_shot_server(r#"{"data":{"online":true}}"#).await;
        let transport = HttpTransport::new(endpoint, "sekrit", &TlsPolicy::Verify).unwrap();
        let vars = VariableSet::new();
        let raw = transport
            .post(&GraphqlRequest {
                query: "query Q { online }",
                variables: &vars,
            })
            .await
            .unwrap();
        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, r#"{"data":{"online":true}}"#);

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let mut lines = head.lines();
        assert_eq!(lines.next(), Some("POST /graphql HTTP/1.1"));
        let headers: Vec<String> = lines.map(str::to_ascii_lowercase).collect();
        assert!(headers.iter().any(|h| h == "x-api-key: sekrit"), "{headers:?}");
        assert!(
            headers.iter().any(|h| h == "content-type: application/json"),
            "{headers:?}"
        );
        assert_eq!(head.matches("sekrit").count(), 1);
        assert_eq!(
            serde_json::from_str::<Value>(body).unwrap(),
            json!({"query": "query Q { online }", "variables": {}})
        );
    }

    #[tokio::test]
    async fn refused_and_unresolvable_hosts_are_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let vars = VariableSet::new();
        let request = GraphqlRequest {
            query: "query Q { online }",
            variables: &vars,
        };
        for endpoint in [
            format!("http://{addr}/graphql"),
            "http://tower.unraid-mcp.invalid/graphql".to_string(),
        ] {
            let transport =
                HttpTransport::new(endpoint.clone(), "key", &TlsPolicy::Verify).unwrap();
            let failure = transport.post(&request).await.unwrap_err();
            assert!(
                matches!(failure, TransportFailure::Connect(_)),
                "{endpoint}: {failure:?}"
            );
            assert!(failure.is_transient());
        }
    }

    #[test]
    fn timeout_message_names_deadline_only_when_known() {
        assert_eq!(
            TransportFailure::Timeout(Some(Duration::from_secs(120))).to_string(),
            "no response within 120s"
        );
        assert_eq!(TransportFailure::Timeout(None).to_string(), "request timed out");
    }
}
