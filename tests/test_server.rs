//! End-to-end tests: the real listener and router behind a real client
//! session, over loopback TCP.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use courier::client::{ClientSession, FetchResult, Outcome};
use courier::config::ClientConfig;
use courier::http::Handler;
use courier::http::request::Method;
use courier::server::listener;
use courier::service::AppRouter;

async fn start_server() -> String {
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap().to_string();
    drop(probe);

    let handler: Arc<dyn Handler> = Arc::new(AppRouter::new());
    let listen_addr = addr.clone();
    tokio::spawn(async move {
        let _ = listener::run(&listen_addr, handler).await;
    });

    // Wait until the listener accepts
    for _ in 0..50 {
        if TcpStream::connect(&addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    addr
}

fn session_for(addr: &str) -> ClientSession {
    ClientSession::new(&ClientConfig {
        target_addr: addr.to_string(),
        connect_timeout_ms: 1_000,
        request_timeout_ms: 2_000,
    })
}

fn done(result: FetchResult) -> Outcome {
    match result {
        FetchResult::Done(outcome) => outcome,
        other => panic!("expected completed outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cached_page_served_from_cache_on_revisit() {
    let addr = start_server().await;
    let session = session_for(&addr);

    let first = done(session.send(&Method::GET, "/cached", "").await.unwrap());
    assert_eq!(first.status, 200);
    assert_eq!(first.body_text(), "cached content");
    assert!(!first.from_cache);

    let second = done(session.send(&Method::GET, "/cached", "").await.unwrap());
    assert_eq!(second.status, 304);
    assert!(second.from_cache);
    assert_eq!(second.body_text(), "cached content");
}

#[tokio::test]
async fn test_redirect_route_lands_on_index() {
    let addr = start_server().await;
    let session = session_for(&addr);

    let outcome = done(session.send(&Method::GET, "/redirect", "").await.unwrap());

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.redirects, 1);
    assert!(outcome.body_text().contains("Courier demo server"));
}

#[tokio::test]
async fn test_register_then_login_flow() {
    let addr = start_server().await;
    let session = session_for(&addr);

    let registered = done(
        session
            .send(&Method::POST, "/register", "username=alice&password=secret")
            .await
            .unwrap(),
    );
    assert_eq!(registered.status, 200);
    assert_eq!(registered.body_text(), "Welcome, alice");

    let duplicate = done(
        session
            .send(&Method::POST, "/register", "username=alice&password=other")
            .await
            .unwrap(),
    );
    assert_eq!(duplicate.status, 409);
    assert!(duplicate.is_error());

    let logged_in = done(
        session
            .send(&Method::POST, "/login", "username=alice&password=secret")
            .await
            .unwrap(),
    );
    assert_eq!(logged_in.status, 200);
    assert_eq!(logged_in.body_text(), "Welcome back, alice");

    let rejected = done(
        session
            .send(&Method::POST, "/login", "username=alice&password=wrong")
            .await
            .unwrap(),
    );
    assert_eq!(rejected.status, 401);
}

#[tokio::test]
async fn test_unknown_path_is_error_outcome() {
    let addr = start_server().await;
    let session = session_for(&addr);

    let outcome = done(session.send(&Method::GET, "/nope", "").await.unwrap());

    assert_eq!(outcome.status, 404);
    assert!(outcome.is_error());
}

#[tokio::test]
async fn test_unparsable_request_gets_400() {
    let addr = start_server().await;

    let mut stream = TcpStream::connect(&addr).await.unwrap();
    stream.write_all(b"GARBAGE\r\n\r\n").await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}
