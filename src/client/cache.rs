//! Per-path conditional cache.
//!
//! One entry per request path, holding at most one validator plus the cached
//! body text. The store is shared state behind a single lock so sessions on
//! parallel tasks can use it; a per-key read-modify-write is all the
//! coordination required.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::response::RawResponse;

/// The freshness token a server handed out with a 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// Value of the ETag header, as sent (quotes included)
    ETag(String),
    /// Value of the Last-Modified header
    LastModified(String),
}

impl Validator {
    /// Picks the validator carried by a response. ETag takes priority over
    /// Last-Modified when both are present; `None` when neither is.
    pub fn from_response(response: &RawResponse) -> Option<Self> {
        if let Some(etag) = response.header("etag") {
            return Some(Validator::ETag(etag.to_string()));
        }
        response
            .header("last-modified")
            .map(|lm| Validator::LastModified(lm.to_string()))
    }

    /// The conditional request header this validator turns into.
    pub fn conditional_header(&self) -> (&'static str, &str) {
        match self {
            Validator::ETag(value) => ("If-None-Match", value),
            Validator::LastModified(value) => ("If-Modified-Since", value),
        }
    }
}

/// A cached representation of one path.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub validator: Option<Validator>,
    pub body: String,
}

/// Path-keyed cache store, cheap to clone and share across sessions.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conditional header to attach to a request for `path`, if the
    /// cache holds a validator for it. Never produces both headers.
    pub async fn conditional_header(&self, path: &str) -> Option<(&'static str, String)> {
        let entries = self.entries.read().await;
        let validator = entries.get(path)?.validator.as_ref()?;
        let (name, value) = validator.conditional_header();
        Some((name, value.to_string()))
    }

    /// The cached body for `path`, read (not refreshed) on a 304.
    pub async fn cached_body(&self, path: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(path)
            .map(|entry| entry.body.clone())
    }

    /// Creates or overwrites the entry for `path`.
    pub async fn insert(&self, path: &str, entry: CacheEntry) {
        self.entries
            .write()
            .await
            .insert(path.to_string(), entry);
    }

    /// Drops any entry for `path` (Cache-Control: no-cache on a 200).
    pub async fn remove(&self, path: &str) {
        self.entries.write().await.remove(path);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.entries.read().await.contains_key(path)
    }
}
