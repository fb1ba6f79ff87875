//! Request orchestration shared by every endpoint family.
//!
//! [`Endpoint::execute`] runs one logical call:
//!
//! ```text
//! token freshness -> cache lookup -> HttpConnection -> cache update
//!                 -> error translation -> (one 202 retry) -> body
//! ```
//!
//! A configured `request_timeout` bounds the whole chain.

use std::fmt::Display;

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    Error, Result,
    api::SpotifyApi,
    cache::{CacheControl, CacheEntry, RequestDescriptor},
    http::{HttpConnection, HttpMethod, HttpRequest, HttpResponse, RequestBody},
};

/// One endpoint family bound to an api.
///
/// `name` identifies the family in logs and is the cache partition its
/// responses are stored under.
#[derive(Clone)]
pub struct Endpoint {
    api: SpotifyApi,
    name: &'static str,
}

impl Endpoint {
    pub fn new(api: SpotifyApi, name: &'static str) -> Self {
        Self { api, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn api(&self) -> &SpotifyApi {
        &self.api
    }

    /// Starts a URL below the configured Web API base.
    pub fn url(&self, path: &str) -> UrlBuilder {
        UrlBuilder::new(format!(
            "{}{}",
            self.api.options().api_base_url.trim_end_matches('/'),
            path
        ))
    }

    /// GET `url` and return the raw response body.
    pub async fn get(&self, url: &str) -> Result<String> {
        self.execute(HttpRequest::get(url)).await
    }

    /// GET `url` and decode the body as `T`.
    ///
    /// A body that does not match `T` becomes [`Error::Parse`] carrying the raw
    /// body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        decode(&body)
    }

    /// POST with an optional body.
    pub async fn post(&self, url: &str, body: Option<RequestBody>) -> Result<String> {
        self.execute(request_with(HttpMethod::Post, url, body)).await
    }

    pub async fn put(&self, url: &str, body: Option<RequestBody>) -> Result<String> {
        self.execute(request_with(HttpMethod::Put, url, body)).await
    }

    /// DELETE with an optional body. The body is sent when present.
    pub async fn delete(&self, url: &str, body: Option<RequestBody>) -> Result<String> {
        self.execute(request_with(HttpMethod::Delete, url, body)).await
    }

    /// Runs one logical call through the whole request pipeline.
    ///
    /// # Pipeline
    ///
    /// 1. **Token**: a token within the refresh margin is refreshed first, if the
    ///    api allows automatic refresh
    /// 2. **Cache**: a fresh entry is returned without touching the network; a
    ///    stale entry with an ETag is revalidated with `If-None-Match`
    /// 3. **Connection**: [`HttpConnection`] sends the request and retries 5xx,
    ///    429 and rejected-token 401 answers once each
    /// 4. **Cache update**: cacheable 2xx answers are stored under their
    ///    `max-age`; a 304 renews the cached entry
    /// 5. **Errors**: non-2xx answers are translated from their error body
    /// 6. **202**: an `Accepted` answer is retried once when
    ///    `retry_on_processing` is set
    ///
    /// # Arguments
    ///
    /// * `request` - Method, URL and optional body of the call
    ///
    /// # Returns
    ///
    /// The response body, or the cached body on a cache hit or a 304.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] when `request_timeout` elapses first
    /// - [`Error::ReAuthenticationNeeded`] when the token is stale and cannot be
    ///   refreshed
    /// - [`Error::BadRequest`] for error statuses, with the server's message
    /// - [`Error::RateLimited`] when a 429 cannot be waited out
    /// - [`Error::Protocol`] for a 304 without a cached ETag to match
    pub async fn execute(&self, request: HttpRequest) -> Result<String> {
        let retry_processing = self.api.options().retry_on_processing;
        match self.api.options().request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(&request, retry_processing))
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => self.run(&request, retry_processing).await,
        }
    }

    async fn run(&self, request: &HttpRequest, mut retry_processing: bool) -> Result<String> {
        let cache = self.api.cache();
        let descriptor = RequestDescriptor::from(request);

        loop {
            let token = self.api.fresh_token().await?;

            let revalidate = match cache.get(self.name, &descriptor) {
                Some(entry) if entry.is_fresh(Utc::now()) => {
                    debug!(endpoint = self.name, url = %request.url, "cache hit");
                    return Ok(entry.data);
                }
                Some(entry) if entry.etag.is_some() => Some(entry),
                _ => None,
            };

            let mut headers = Vec::new();
            if let Some(etag) = revalidate.as_ref().and_then(|e| e.etag.as_deref()) {
                headers.push(("If-None-Match", etag));
            }

            let mut connection = HttpConnection::new(self.api.http(), request)
                .authorization(token.authorization_header())
                .policy(self.api.retry_policy());
            if self.api.can_refresh() {
                connection = connection.refresher(&self.api);
            }
            let response = connection.execute(&headers).await?;

            if response.status == 304 {
                let entry = revalidate.ok_or_else(|| {
                    Error::Protocol("304 Not Modified without a cached ETag".to_string())
                })?;
                debug!(endpoint = self.name, url = %request.url, "cache revalidated");
                self.store_revalidated(&descriptor, &entry, &response);
                return Ok(entry.data);
            }

            self.store_response(&descriptor, &response);

            if !response.is_success() {
                return Err(Error::from_error_body(response.status, &response.body));
            }

            if response.status == 202 && retry_processing {
                debug!(endpoint = self.name, url = %request.url, "202 accepted, retrying once");
                retry_processing = false;
                continue;
            }

            return Ok(response.body);
        }
    }

    /// Caches a successful response when it carries `Cache-Control`.
    fn store_response(&self, descriptor: &RequestDescriptor, response: &HttpResponse) {
        let cache = self.api.cache();
        if !cache.is_enabled() || !matches!(response.status, 200 | 201 | 203) {
            return;
        }
        let Some(control) = response.header("cache-control").map(CacheControl::parse) else {
            return;
        };
        if control.no_store {
            return;
        }

        let now = Utc::now();
        let etag = response.header("etag").map(str::to_string);
        let expires_at = control.expires_at(now);
        if etag.is_none() && expires_at <= now {
            return;
        }

        cache.set(
            self.name,
            descriptor.clone(),
            CacheEntry::new(response.body.clone(), etag, expires_at),
        );
    }

    fn store_revalidated(
        &self,
        descriptor: &RequestDescriptor,
        previous: &CacheEntry,
        response: &HttpResponse,
    ) {
        let Some(control) = response.header("cache-control").map(CacheControl::parse) else {
            return;
        };
        let etag = response
            .header("etag")
            .map(str::to_string)
            .or_else(|| previous.etag.clone());
        self.api.cache().set(
            self.name,
            descriptor.clone(),
            CacheEntry::new(previous.data.clone(), etag, control.expires_at(Utc::now())),
        );
    }
}

fn request_with(method: HttpMethod, url: &str, body: Option<RequestBody>) -> HttpRequest {
    let request = HttpRequest::new(method, url);
    match body {
        Some(body) => request.with_body(body),
        None => request,
    }
}

/// JSON body for a write call.
pub fn json_body<T: Serialize>(value: &T) -> Result<RequestBody> {
    serde_json::to_string(value)
        .map(RequestBody::Raw)
        .map_err(|e| Error::parse(e, ""))
}

/// Decodes a response body, keeping the body in the error on failure.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::parse(e, body))
}

/// Appends query parameters, skipping absent ones.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    params: Vec<(String, String)>,
}

impl UrlBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: Option<impl Display>) -> Self {
        if let Some(value) = value {
            self.params.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn build(self) -> String {
        if self.params.is_empty() {
            return self.base;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish();
        format!("{}?{}", self.base, query)
    }
}
