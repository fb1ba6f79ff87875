//! Response cache keyed by request descriptor.
//!
//! Entries live in one map per endpoint family. The cache honours the
//! `max-age` of the response that produced an entry and never extends it on
//! its own. Expired entries are dropped lazily before every access, except
//! those carrying an ETag: they stay around so the next request can
//! revalidate them with `If-None-Match`.
//!
//! When a capacity limit is configured and exceeded, every populated endpoint
//! gives up `ceil(excess / populated_endpoints)` entries, nearest expiry first.
//! Eviction is by expiry, not LRU.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::http::{HttpMethod, HttpRequest, expires_after};

/// Structural identity of a request, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body,
        }
    }
}

impl From<&HttpRequest> for RequestDescriptor {
    fn from(request: &HttpRequest) -> Self {
        Self {
            url: request.url.clone(),
            method: request.method,
            body: request.body.as_ref().map(|b| b.encode()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub data: String,
    pub etag: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: impl Into<String>, etag: Option<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            data: data.into(),
            etag,
            expires_at,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// The subset of a `Cache-Control` header the cache acts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age: Option<i64>,
    pub no_store: bool,
}

impl CacheControl {
    pub fn parse(header: &str) -> Self {
        let mut control = CacheControl::default();
        for directive in header.split(',').map(str::trim) {
            let lower = directive.to_ascii_lowercase();
            if lower == "no-store" {
                control.no_store = true;
            } else if let Some(value) = lower.strip_prefix("max-age=") {
                control.max_age = parse_delta_seconds(value.trim_matches('"'));
            }
        }
        control
    }

    /// Expiry of an entry produced at `now` under this directive.
    /// Oversized `max-age` values are clamped, never trusted verbatim.
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        expires_after(now, self.max_age.unwrap_or(0))
    }
}

/// Digits only. A value too large for `i64` saturates instead of failing.
fn parse_delta_seconds(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(value.parse::<i64>().unwrap_or(i64::MAX))
}

pub struct ResponseCache {
    endpoints: DashMap<&'static str, HashMap<RequestDescriptor, CacheEntry>>,
    enabled: AtomicBool,
    limit: Option<usize>,
}

impl ResponseCache {
    pub fn new(enabled: bool, limit: Option<usize>) -> Self {
        Self {
            endpoints: DashMap::new(),
            enabled: AtomicBool::new(enabled),
            limit,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turning the cache off flushes it immediately.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.clear();
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get(&self, endpoint: &'static str, descriptor: &RequestDescriptor) -> Option<CacheEntry> {
        self.get_at(endpoint, descriptor, Utc::now())
    }

    pub fn get_at(
        &self,
        endpoint: &'static str,
        descriptor: &RequestDescriptor,
        now: DateTime<Utc>,
    ) -> Option<CacheEntry> {
        self.purge(now);
        self.endpoints
            .get(endpoint)
            .and_then(|entries| entries.get(descriptor).cloned())
    }

    pub fn set(&self, endpoint: &'static str, descriptor: RequestDescriptor, entry: CacheEntry) {
        self.set_at(endpoint, descriptor, entry, Utc::now())
    }

    pub fn set_at(
        &self,
        endpoint: &'static str,
        descriptor: RequestDescriptor,
        entry: CacheEntry,
        now: DateTime<Utc>,
    ) {
        self.purge(now);
        if !self.is_enabled() {
            return;
        }

        self.endpoints
            .entry(endpoint)
            .or_default()
            .insert(descriptor, entry);
        self.enforce_limit();
    }

    pub fn invalidate(&self, endpoint: &'static str, descriptor: &RequestDescriptor) {
        self.invalidate_at(endpoint, descriptor, Utc::now())
    }

    pub fn invalidate_at(
        &self,
        endpoint: &'static str,
        descriptor: &RequestDescriptor,
        now: DateTime<Utc>,
    ) {
        self.purge(now);
        if let Some(mut entries) = self.endpoints.get_mut(endpoint) {
            entries.remove(descriptor);
        }
    }

    pub fn clear(&self) {
        self.endpoints.clear();
    }

    /// Number of cached entries across all endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.iter().map(|entries| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries cached for one endpoint family.
    pub fn endpoint_len(&self, endpoint: &'static str) -> usize {
        self.endpoints.get(endpoint).map_or(0, |entries| entries.len())
    }

    fn purge(&self, now: DateTime<Utc>) {
        if !self.is_enabled() {
            self.clear();
            return;
        }

        for mut entries in self.endpoints.iter_mut() {
            entries.retain(|_, entry| entry.is_fresh(now) || entry.etag.is_some());
        }
    }

    fn enforce_limit(&self) {
        let Some(limit) = self.limit else {
            return;
        };

        loop {
            let total = self.len();
            if total <= limit {
                return;
            }

            let excess = total - limit;
            let populated = self
                .endpoints
                .iter()
                .filter(|entries| !entries.is_empty())
                .count();
            let per_endpoint = excess.div_ceil(populated);
            debug!(total, limit, per_endpoint, "cache over capacity, evicting");

            for mut entries in self.endpoints.iter_mut() {
                let mut by_expiry: Vec<(DateTime<Utc>, RequestDescriptor)> = entries
                    .iter()
                    .map(|(descriptor, entry)| (entry.expires_at, descriptor.clone()))
                    .collect();
                by_expiry.sort_by_key(|(expires_at, _)| *expires_at);

                for (_, descriptor) in by_expiry.into_iter().take(per_endpoint) {
                    entries.remove(&descriptor);
                }
            }
        }
    }
}
