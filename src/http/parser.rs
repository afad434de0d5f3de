use crate::http::request::{Method, Request};
use std::collections::HashMap;
use std::fmt;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Fatal parse failures.
///
/// Only two conditions abort a parse: an empty message and a start line with
/// fewer than two tokens. Everything else (colon-less header lines, a body
/// shorter than its declared length, malformed query pairs) degrades to fewer
/// populated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The message stream held no bytes at all
    EmptyInput,
    /// The first line could not be split into method and path
    MalformedStartLine(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "empty request"),
            ParseError::MalformedStartLine(line) => {
                write!(f, "malformed start line: {line:?}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses one complete HTTP request message.
///
/// The buffer is treated as a character stream: lines end at `\n` (an
/// optional preceding `\r` is dropped), headers run until the first empty
/// line or the end of input, and the body is whatever `Content-Length`
/// declares — if fewer bytes are available the body is simply left unset.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut pos = 0;

    // Request line: method and path are mandatory, version defaults
    let start_line = read_line(buf, &mut pos).unwrap_or_default();
    let tokens: Vec<&str> = start_line.split_whitespace().collect();

    if tokens.len() < 2 {
        return Err(ParseError::MalformedStartLine(start_line.clone()));
    }

    let method = Method::from_token(&tokens[0].to_uppercase());
    let path = tokens[1].to_string();
    let version = tokens
        .get(2)
        .copied()
        .unwrap_or("HTTP/1.1")
        .to_string();

    // Headers: name before the first colon (trimmed, lower-cased), value
    // after it (trimmed). Last occurrence wins; lines without a colon are
    // skipped.
    let mut headers = HashMap::new();

    while let Some(line) = read_line(buf, &mut pos) {
        if line.is_empty() {
            break;
        }

        if let Some((name, value)) = line.split_once(':') {
            headers.insert(
                name.trim().to_lowercase(),
                value.trim().to_string(),
            );
        }
    }

    // Body: best-effort against the declared length
    let body = declared_body_length(&headers).and_then(|len| {
        let rest = &buf[pos..];
        if rest.len() >= len {
            Some(String::from_utf8_lossy(&rest[..len]).into_owned())
        } else {
            None
        }
    });

    // Parameters: query string first, then a form-encoded POST body on top
    let mut parameters = HashMap::new();
    if let Some((_, query)) = path.split_once('?') {
        parse_pairs(query, &mut parameters);
    }

    if method == Method::POST {
        let is_form = headers
            .get("content-type")
            .is_some_and(|ct| ct.contains(FORM_URLENCODED));
        if let (true, Some(body)) = (is_form, body.as_deref()) {
            parse_pairs(body, &mut parameters);
        }
    }

    Ok(Request {
        method,
        path,
        version,
        headers,
        body,
        parameters,
    })
}

/// Reports the total byte length of one full message in `buf`, or `None`
/// while more bytes are still needed.
///
/// The connection read loop uses this to keep reading without treating a
/// half-received request as malformed. Completeness requires the `\r\n\r\n`
/// header terminator plus the declared body length.
pub fn message_complete(buf: &[u8]) -> Option<usize> {
    let headers_end = find_headers_end(buf)?;
    let head = String::from_utf8_lossy(&buf[..headers_end]);

    let body_len = head
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let total = headers_end + 4 + body_len;
    (buf.len() >= total).then_some(total)
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}

/// One line off the buffer, `\n`-terminated, trailing `\r` stripped.
/// Advances `pos` past the terminator. `None` once the buffer is exhausted.
fn read_line(buf: &[u8], pos: &mut usize) -> Option<String> {
    if *pos >= buf.len() {
        return None;
    }

    let rest = &buf[*pos..];
    let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
        Some(nl) => (&rest[..nl], nl + 1),
        None => (rest, rest.len()),
    };

    *pos += consumed;

    let line = match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    };

    Some(String::from_utf8_lossy(line).into_owned())
}

fn declared_body_length(headers: &HashMap<String, String>) -> Option<usize> {
    headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&len| len > 0)
}

/// Splits `key=value&key=value` text into the parameter map. Pairs without
/// an `=` are dropped; a repeated key keeps its last value.
fn parse_pairs(text: &str, into: &mut HashMap<String, String>) {
    for pair in text.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            into.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
    }

    #[test]
    fn message_complete_waits_for_body() {
        let partial = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
        assert_eq!(message_complete(partial), None);

        let full = b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        assert_eq!(message_complete(full), Some(full.len()));
    }

    #[test]
    fn pairs_without_equals_are_dropped() {
        let mut map = HashMap::new();
        parse_pairs("a=1&broken&b=2", &mut map);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a").unwrap(), "1");
        assert_eq!(map.get("b").unwrap(), "2");
    }
}
