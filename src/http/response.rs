use std::collections::HashMap;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes the factory can produce.
///
/// A closed set: handlers pick from these, and the reason phrase is fixed per
/// code. (Client-side code keeps the raw numeric status instead, since a peer
/// may send anything — see `client::response`.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    Found,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 409 Conflict
    Conflict,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotModified.as_u16(), 304);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::Conflict => 409,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::Conflict => "Conflict",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Content-Length is derived from the body whenever the body is set and is
/// never independently settable; a 304 carries neither body nor
/// Content-Length.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers, names emitted as given
    pub headers: HashMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json; charset=utf-8")
///     .body(b"{}".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    ///
    /// A caller-supplied Content-Length is discarded at build time; the
    /// header always reflects the actual body length.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Content-Length is set to the stored body's byte length, overwriting
    /// anything placed there via `header`. A 304 gets neither a body nor a
    /// Content-Length header.
    pub fn build(mut self) -> Response {
        if self.status == StatusCode::NotModified {
            self.body.clear();
            self.headers.remove("Content-Length");
        } else {
            self.headers
                .insert("Content-Length".to_string(), self.body.len().to_string());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Serializes the response to exact wire bytes: status line, headers,
    /// blank line, raw body. No trailing newline after the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        buf.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }

        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);

        buf
    }

    /// Sets an ETag header, adding the wire-required double quotes.
    pub fn set_etag(&mut self, etag: &str) {
        self.headers
            .insert("ETag".to_string(), format!("\"{etag}\""));
    }

    /// Sets a Last-Modified header, value stored verbatim.
    pub fn set_last_modified(&mut self, last_modified: &str) {
        self.headers
            .insert("Last-Modified".to_string(), last_modified.to_string());
    }

    // ---- factory constructors ----

    /// 200 with a plain-text body.
    pub fn ok_text(text: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(text.as_bytes().to_vec())
            .build()
    }

    /// 200 with a JSON body.
    pub fn ok_json(json: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(json.as_bytes().to_vec())
            .build()
    }

    /// 200 with an HTML body.
    pub fn ok_html(html: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(html.as_bytes().to_vec())
            .build()
    }

    /// 200 with raw image bytes, e.g. `ok_image(data, "png")` for image/png.
    pub fn ok_image(data: Vec<u8>, subtype: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", format!("image/{subtype}"))
            .body(data)
            .build()
    }

    /// 200 with an attachment download.
    pub fn ok_binary(data: Vec<u8>, filename: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/octet-stream")
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            )
            .body(data)
            .build()
    }

    /// 201 Created.
    pub fn created() -> Self {
        ResponseBuilder::new(StatusCode::Created)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(b"Created".to_vec())
            .build()
    }

    /// 301 with a Location header and an HTML body linking to the target.
    pub fn moved_permanently(location: &str) -> Self {
        ResponseBuilder::new(StatusCode::MovedPermanently)
            .header("Location", location)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(redirect_page("Moved permanently to", location).into_bytes())
            .build()
    }

    /// 302 with a Location header and an HTML body linking to the target.
    pub fn found(location: &str) -> Self {
        ResponseBuilder::new(StatusCode::Found)
            .header("Location", location)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(redirect_page("Found at", location).into_bytes())
            .build()
    }

    /// 304 Not Modified. No body, no Content-Length.
    pub fn not_modified() -> Self {
        ResponseBuilder::new(StatusCode::NotModified).build()
    }

    /// 400 with a caller-supplied plain-text body.
    pub fn bad_request(message: &str) -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(message.as_bytes().to_vec())
            .build()
    }

    /// 401 Unauthorized.
    pub fn unauthorized() -> Self {
        ResponseBuilder::new(StatusCode::Unauthorized)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(b"Unauthorized".to_vec())
            .build()
    }

    /// 404 Not Found.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(b"404 Not Found".to_vec())
            .build()
    }

    /// 405 Method Not Allowed.
    pub fn method_not_allowed() -> Self {
        ResponseBuilder::new(StatusCode::MethodNotAllowed)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(b"405 Method Not Allowed".to_vec())
            .build()
    }

    /// 409 Conflict.
    pub fn conflict() -> Self {
        ResponseBuilder::new(StatusCode::Conflict)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(b"Conflict".to_vec())
            .build()
    }

    /// 500 Internal Server Error.
    pub fn internal_server_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(b"500 Internal Server Error".to_vec())
            .build()
    }
}

fn redirect_page(verb: &str, location: &str) -> String {
    format!("<html><body>{verb} <a href=\"{location}\">{location}</a></body></html>")
}
