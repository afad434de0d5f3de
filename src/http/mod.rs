//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 message layer: parsing requests off
//! the wire, building and serializing responses, and running the
//! per-connection state machine.
//!
//! # Architecture
//!
//! - **`parser`**: turns raw bytes into a [`request::Request`]
//! - **`request`**: request model and builder
//! - **`response`**: response model, builder, and factory constructors
//! - **`writer`**: serializes and writes responses to the client
//! - **`connection`**: the connection handler driving read → handle → write
//! - **`mime`**: content-type tables
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Handler produces a response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

/// The seam between the protocol layer and the application.
///
/// Invoked at most once per accepted request; the returned response is
/// serialized exactly as given.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &request::Request) -> response::Response;
}
