//! Courier - Minimal HTTP/1.1 Message Stack
//!
//! Core library: the wire-format request parser, the response
//! builder/factory, and a client that follows redirects and keeps a
//! per-path conditional cache (ETag / Last-Modified).

pub mod client;
pub mod config;
pub mod http;
pub mod server;
pub mod service;
