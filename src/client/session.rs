//! The request / redirect / cache state machine.
//!
//! Each send attempt opens a fresh TCP connection, writes the serialized
//! request, and reads one full response. The decision step then either
//! returns a terminal outcome or loops for a redirect, with the hop counter
//! and current path/authority carried explicitly — no recursion, so raising
//! the redirect bound can never grow the stack.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::client::cache::{CacheEntry, CacheStore, Validator};
use crate::client::response::RawResponse;
use crate::config::ClientConfig;
use crate::http::mime;
use crate::http::request::Method;

/// Maximum number of 301/302 hops followed before giving up.
pub const MAX_REDIRECTS: usize = 3;

/// Default buffer size for response reads
const BUFFER_SIZE: usize = 8192;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Failures fatal to one send attempt.
///
/// Surfaced to the caller, never swallowed, never auto-retried.
#[derive(Debug)]
pub enum TransportError {
    /// Could not connect, or the connection broke mid-exchange
    ConnectionFailed(String),
    /// The peer closed before the declared response was fully read
    UnexpectedEndOfStream,
    /// Connect or full-response deadline elapsed
    Timeout,
    /// Status line with fewer than three tokens, or an unreadable head
    MalformedResponse(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionFailed(detail) => {
                write!(f, "connection failed: {detail}")
            }
            TransportError::UnexpectedEndOfStream => {
                write!(f, "unexpected end of stream")
            }
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::MalformedResponse(detail) => {
                write!(f, "malformed response: {detail}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// What a completed send produced.
#[derive(Debug)]
pub enum FetchResult {
    /// A response was read and decided on
    Done(Outcome),
    /// The redirect bound was hit; terminal, reported rather than thrown
    RedirectLimitExceeded { hops: usize },
}

/// The final response of a send, after redirects and cache resolution.
#[derive(Debug)]
pub struct Outcome {
    pub status: u16,
    pub reason: String,
    /// Response headers, names lower-cased
    pub headers: HashMap<String, String>,
    /// Effective body: the cached body on a 304, the wire body otherwise
    pub body: Vec<u8>,
    /// Whether the body came from the cache (304 with a prior entry)
    pub from_cache: bool,
    /// Redirect hops followed before this response
    pub redirects: usize,
    /// Path an image body was persisted to, when one was
    pub artifact: Option<String>,
}

impl Outcome {
    /// Codes >= 400, flagged for display purposes only.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .map(|v| v.as_str())
            .unwrap_or("text/plain")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Closed dispatch over the status classes the decision step cares about.
enum Disposition {
    Redirect(String),
    NotModified,
    Fresh,
    Other,
}

fn disposition(response: &RawResponse) -> Disposition {
    match response.status {
        // A redirect without a Location is reported as-is
        301 | 302 => match response.header("location") {
            Some(location) => Disposition::Redirect(location.to_string()),
            None => Disposition::Other,
        },
        304 => Disposition::NotModified,
        200 => Disposition::Fresh,
        _ => Disposition::Other,
    }
}

enum LocationTarget {
    /// Absolute URL: follow against its own authority
    Absolute { authority: String, path: String },
    /// Anything else is taken as a path on the current authority
    Relative(String),
}

fn resolve_location(location: &str) -> LocationTarget {
    match url::Url::parse(location) {
        Ok(parsed) if parsed.has_host() => {
            let host = parsed.host_str().unwrap_or_default();
            let authority = match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => format!("{host}:80"),
            };
            let path = match parsed.query() {
                Some(query) => format!("{}?{query}", parsed.path()),
                None => parsed.path().to_string(),
            };
            LocationTarget::Absolute { authority, path }
        }
        _ => LocationTarget::Relative(location.to_string()),
    }
}

/// Issues requests against one authority, sharing a conditional cache
/// across calls.
pub struct ClientSession {
    authority: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    cache: CacheStore,
}

impl ClientSession {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_cache(config, CacheStore::new())
    }

    /// A session over an externally owned cache, so several sessions can
    /// share one store.
    pub fn with_cache(config: &ClientConfig, cache: CacheStore) -> Self {
        Self {
            authority: config.target_addr.clone(),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            cache,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Sends one request and drives it to a terminal result.
    ///
    /// GET appends non-empty `params` to the path as a query string; POST
    /// sends them as a form-urlencoded body. Redirects are followed with the
    /// same method and params. The cache is consulted for the path of each
    /// attempt and refreshed from 200s / read on 304s.
    pub async fn send(
        &self,
        method: &Method,
        path: &str,
        params: &str,
    ) -> Result<FetchResult, TransportError> {
        let mut authority = self.authority.clone();
        let mut path = path.to_string();
        let mut hops = 0usize;

        loop {
            if hops > MAX_REDIRECTS {
                tracing::warn!(hops, "Too many redirects, giving up");
                return Ok(FetchResult::RedirectLimitExceeded { hops });
            }

            let conditional = self.cache.conditional_header(&path).await;
            let request =
                build_request_bytes(method, &path, params, &authority, conditional.as_ref());

            tracing::debug!(
                method = %method,
                path = %path,
                authority = %authority,
                attempt = hops + 1,
                conditional = conditional.is_some(),
                "Sending request"
            );

            let response = self.exchange(&authority, &request).await?;

            match disposition(&response) {
                Disposition::Redirect(location) => {
                    tracing::info!(status = response.status, location = %location, "Redirecting");
                    match resolve_location(&location) {
                        LocationTarget::Absolute { authority: a, path: p } => {
                            authority = a;
                            path = p;
                        }
                        LocationTarget::Relative(p) => path = p,
                    }
                    hops += 1;
                }

                Disposition::NotModified => {
                    let cached = self.cache.cached_body(&path).await;
                    let from_cache = cached.is_some();
                    if from_cache {
                        tracing::info!(path = %path, "304 Not Modified, serving cached body");
                    } else {
                        tracing::warn!(path = %path, "304 but no cache entry available");
                    }

                    let body = cached.map(String::into_bytes).unwrap_or_default();
                    let outcome = self.finish(response, body, from_cache, hops).await;
                    return Ok(FetchResult::Done(outcome));
                }

                Disposition::Fresh => {
                    let no_cache = response
                        .header("cache-control")
                        .is_some_and(|v| v.contains("no-cache"));

                    if no_cache {
                        self.cache.remove(&path).await;
                    } else {
                        let entry = CacheEntry {
                            validator: Validator::from_response(&response),
                            body: response.body_text(),
                        };
                        self.cache.insert(&path, entry).await;
                    }

                    let body = response.body.clone();
                    let outcome = self.finish(response, body, false, hops).await;
                    return Ok(FetchResult::Done(outcome));
                }

                Disposition::Other => {
                    if response.status >= 400 {
                        tracing::warn!(
                            status = response.status,
                            reason = %response.reason,
                            "Error response"
                        );
                    }

                    let body = response.body.clone();
                    let outcome = self.finish(response, body, false, hops).await;
                    return Ok(FetchResult::Done(outcome));
                }
            }
        }
    }

    /// One exchange over a fresh connection: connect, write, read one full
    /// response. Both phases run under their configured deadlines.
    async fn exchange(
        &self,
        authority: &str,
        request: &[u8],
    ) -> Result<RawResponse, TransportError> {
        let stream = timeout(self.connect_timeout, TcpStream::connect(authority))
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        timeout(self.request_timeout, write_and_read(stream, request))
            .await
            .map_err(|_| TransportError::Timeout)?
    }

    /// Builds the outcome, persisting an image body to a local artifact.
    async fn finish(
        &self,
        response: RawResponse,
        body: Vec<u8>,
        from_cache: bool,
        redirects: usize,
    ) -> Outcome {
        let mut artifact = None;

        if let Some(subtype) = image_subtype(response.content_type()) {
            if !body.is_empty() {
                let name = format!("received_image.{}", mime::extension_for_subtype(&subtype));
                match tokio::fs::write(&name, &body).await {
                    Ok(()) => {
                        tracing::info!(file = %name, bytes = body.len(), "Saved image");
                        artifact = Some(name);
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to save image"),
                }
            }
        }

        Outcome {
            status: response.status,
            reason: response.reason,
            headers: response.headers,
            body,
            from_cache,
            redirects,
            artifact,
        }
    }
}

fn image_subtype(content_type: &str) -> Option<String> {
    let subtype = content_type.strip_prefix("image/")?;
    let subtype = subtype.split(';').next().unwrap_or(subtype).trim();
    Some(subtype.to_string())
}

/// Serializes one request.
///
/// Note: public so integration tests can assert on the exact bytes.
pub fn build_request_bytes(
    method: &Method,
    path: &str,
    params: &str,
    host: &str,
    conditional: Option<&(&'static str, String)>,
) -> Vec<u8> {
    let is_post = *method == Method::POST;

    let full_path = if !is_post && !params.is_empty() {
        format!("{path}?{params}")
    } else {
        path.to_string()
    };

    let mut head = String::new();
    head.push_str(&format!("{method} {full_path} HTTP/1.1\r\n"));
    head.push_str(&format!("Host: {host}\r\n"));
    head.push_str("Connection: close\r\n");
    head.push_str("User-Agent: courier/0.1\r\n");
    head.push_str("Accept: */*\r\n");

    if let Some((name, value)) = conditional {
        head.push_str(&format!("{name}: {value}\r\n"));
    }

    let body = (is_post && !params.is_empty()).then_some(params);
    if let Some(body) = body {
        head.push_str(&format!("Content-Type: {FORM_URLENCODED}\r\n"));
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("\r\n");

    let mut bytes = head.into_bytes();
    if let Some(body) = body {
        bytes.extend_from_slice(body.as_bytes());
    }
    bytes
}

async fn write_and_read(
    mut stream: TcpStream,
    request: &[u8],
) -> Result<RawResponse, TransportError> {
    stream
        .write_all(request)
        .await
        .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
    stream
        .flush()
        .await
        .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

    read_response(&mut stream).await
}

/// Reads one full response: head until the blank line, then exactly
/// Content-Length body bytes.
async fn read_response(stream: &mut TcpStream) -> Result<RawResponse, TransportError> {
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    loop {
        let n = stream
            .read_buf(&mut buffer)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        if n == 0 {
            return Err(TransportError::UnexpectedEndOfStream);
        }

        if let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = buffer.split_to(head_end + 4);
            let (status, reason, headers) = parse_response_head(&head)?;

            let content_length = headers
                .get("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);

            let body = read_body(stream, &mut buffer, content_length).await?;

            return Ok(RawResponse {
                status,
                reason,
                headers,
                body,
            });
        }

        // Prevent unbounded header growth
        if buffer.len() > 64 * 1024 {
            return Err(TransportError::MalformedResponse(
                "response headers too large".to_string(),
            ));
        }
    }
}

/// Status line plus headers. The status line must carry version, code, and
/// reason; header lines without a colon are skipped.
fn parse_response_head(
    head: &[u8],
) -> Result<(u16, String, HashMap<String, String>), TransportError> {
    let text = String::from_utf8_lossy(head);
    let mut lines = text.lines();

    let status_line = lines
        .next()
        .ok_or_else(|| TransportError::MalformedResponse("empty response".to_string()))?;

    let mut parts = status_line.splitn(3, ' ');
    let _version = parts
        .next()
        .ok_or_else(|| TransportError::MalformedResponse(status_line.to_string()))?;
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| TransportError::MalformedResponse(status_line.to_string()))?;
    let reason = parts
        .next()
        .ok_or_else(|| TransportError::MalformedResponse(status_line.to_string()))?
        .to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    Ok((status, reason, headers))
}

/// Reads exactly `content_length` body bytes, draining the read-ahead buffer
/// first. Early close is fatal.
async fn read_body(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    content_length: usize,
) -> Result<Vec<u8>, TransportError> {
    if content_length == 0 {
        return Ok(Vec::new());
    }

    let mut body = Vec::with_capacity(content_length);

    let from_buffer = buffer.len().min(content_length);
    body.extend_from_slice(&buffer[..from_buffer]);
    buffer.advance(from_buffer);

    while body.len() < content_length {
        let n = stream
            .read_buf(buffer)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        if n == 0 {
            return Err(TransportError::UnexpectedEndOfStream);
        }

        let take = buffer.len().min(content_length - body.len());
        body.extend_from_slice(&buffer[..take]);
        buffer.advance(take);
    }

    Ok(body)
}
