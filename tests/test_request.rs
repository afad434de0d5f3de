use courier::http::request::{Method, Request, RequestBuilder};
use std::collections::HashMap;

fn request_with_headers(headers: HashMap<String, String>) -> Request {
    Request {
        method: Method::GET,
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: None,
        parameters: HashMap::new(),
    }
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let mut headers = HashMap::new();
    headers.insert("host".to_string(), "example.com".to_string());
    headers.insert("content-type".to_string(), "application/json".to_string());

    let req = request_with_headers(headers);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("HOST"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_content_length_parsing() {
    let mut headers = HashMap::new();
    headers.insert("content-length".to_string(), "42".to_string());

    let req = request_with_headers(headers);
    assert_eq!(req.content_length(), Some(42));
}

#[test]
fn test_content_length_missing_or_invalid() {
    let req = request_with_headers(HashMap::new());
    assert_eq!(req.content_length(), None);

    let mut headers = HashMap::new();
    headers.insert("content-length".to_string(), "not-a-number".to_string());
    let req = request_with_headers(headers);
    assert_eq!(req.content_length(), None);
}

#[test]
fn test_keep_alive_http11_default() {
    let req = request_with_headers(HashMap::new());
    assert!(req.keep_alive());
}

#[test]
fn test_keep_alive_close() {
    let mut headers = HashMap::new();
    headers.insert("connection".to_string(), "close".to_string());

    let req = request_with_headers(headers);
    assert!(!req.keep_alive());
}

#[test]
fn test_keep_alive_case_insensitive_value() {
    let mut headers = HashMap::new();
    headers.insert("connection".to_string(), "Keep-Alive".to_string());

    let req = request_with_headers(headers);
    assert!(req.keep_alive());
}

#[test]
fn test_builder_defaults_version() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.body, None);
}

#[test]
fn test_builder_lower_cases_header_names() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("If-None-Match", "\"abc\"")
        .build()
        .unwrap();

    assert!(req.headers.contains_key("if-none-match"));
    assert_eq!(req.header("If-None-Match"), Some("\"abc\""));
}

#[test]
fn test_builder_body() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .body("payload")
        .build()
        .unwrap();

    assert_eq!(req.body.as_deref(), Some("payload"));
}

#[test]
fn test_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}

#[test]
fn test_builder_parameters() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/login")
        .parameter("username", "alice")
        .parameter("password", "secret")
        .build()
        .unwrap();

    assert_eq!(req.parameter("username"), Some("alice"));
    assert_eq!(req.parameter("password"), Some("secret"));
    assert_eq!(req.parameter("missing"), None);
}

#[test]
fn test_method_token_classification() {
    assert_eq!(Method::from_token("GET"), Method::GET);
    assert_eq!(Method::from_token("POST"), Method::POST);
    assert_eq!(Method::from_token("DELETE"), Method::DELETE);
    assert_eq!(
        Method::from_token("PROPFIND"),
        Method::Other("PROPFIND".to_string())
    );
}

#[test]
fn test_method_display_matches_wire_form() {
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::Other("BREW".to_string()).to_string(), "BREW");
}
