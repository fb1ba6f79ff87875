use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    Error, Result,
    http::{HttpRequest, HttpResponse, RequestBody},
};

/// Pad added to every `Retry-After` wait.
const RETRY_AFTER_PAD_SECS: u64 = 1;

/// Source of a fresh Authorization header after a 401.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Replaces the token behind the `rejected` Authorization value and
    /// returns the new `Authorization` value.
    async fn refresh_authorization(&self, rejected: Option<&str>) -> Result<String>;
}

/// Which conditions an [`HttpConnection`] may retry. Each one at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub server_error: bool,
    pub rate_limited: bool,
    pub unauthorized: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            server_error: true,
            rate_limited: true,
            unauthorized: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryReason {
    ServerError,
    RateLimited(Duration),
    Unauthorized,
}

/// Executes one logical request, retrying 5xx, 429 and expired-token 401
/// answers a bounded number of times.
///
/// Ordinary HTTP error statuses are returned as responses; turning them into
/// errors is left to the caller. Only a 429 that cannot be retried becomes
/// [`Error::RateLimited`].
pub struct HttpConnection<'a> {
    client: &'a Client,
    request: &'a HttpRequest,
    authorization: Option<String>,
    refresher: Option<&'a dyn TokenRefresher>,
    policy: RetryPolicy,
}

impl<'a> HttpConnection<'a> {
    pub fn new(client: &'a Client, request: &'a HttpRequest) -> Self {
        Self {
            client,
            request,
            authorization: None,
            refresher: None,
            policy: RetryPolicy::default(),
        }
    }

    /// Default `Authorization` value, overridable through explicit headers.
    pub fn authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn refresher(mut self, refresher: &'a dyn TokenRefresher) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn execute(&self, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut authorization = self.authorization.clone();
        let mut server_error_retried = false;
        let mut rate_limit_retried = false;
        let mut refreshed = false;

        loop {
            let response = self.send(headers, authorization.as_deref()).await?;

            match self.retry_reason(&response) {
                None => return Ok(response),
                Some(RetryReason::ServerError) => {
                    if !self.policy.server_error || server_error_retried {
                        return Ok(response);
                    }
                    warn!(
                        status = response.status,
                        url = %self.request.url,
                        "server error, retrying once"
                    );
                    server_error_retried = true;
                }
                Some(RetryReason::RateLimited(wait)) => {
                    if !self.policy.rate_limited || rate_limit_retried {
                        return Err(Error::RateLimited { retry_after: wait });
                    }
                    warn!(
                        wait_secs = wait.as_secs(),
                        url = %self.request.url,
                        "rate limited, waiting before retry"
                    );
                    sleep(wait).await;
                    rate_limit_retried = true;
                }
                Some(RetryReason::Unauthorized) => {
                    let refresher = match self.refresher {
                        Some(r) if self.policy.unauthorized && !refreshed => r,
                        _ => return Ok(response),
                    };
                    debug!(url = %self.request.url, "access token rejected, refreshing");
                    let fresh = refresher
                        .refresh_authorization(authorization.as_deref())
                        .await?;
                    authorization = Some(fresh);
                    refreshed = true;
                }
            }
        }
    }

    fn retry_reason(&self, response: &HttpResponse) -> Option<RetryReason> {
        match response.status {
            500..=599 => Some(RetryReason::ServerError),
            429 => {
                let secs = response
                    .header("retry-after")
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(0);
                Some(RetryReason::RateLimited(Duration::from_secs(
                    secs.saturating_add(RETRY_AFTER_PAD_SECS),
                )))
            }
            401 if response.body.to_lowercase().contains("access token") => {
                Some(RetryReason::Unauthorized)
            }
            _ => None,
        }
    }

    async fn send(
        &self,
        headers: &[(&str, &str)],
        authorization: Option<&str>,
    ) -> Result<HttpResponse> {
        let header_map = self.build_headers(headers, authorization)?;
        let mut builder = self
            .client
            .request(self.request.method.into(), &self.request.url)
            .headers(header_map);

        // DELETE requests carry their body like any other method.
        if let Some(body) = &self.request.body {
            builder = match body {
                RequestBody::Form(_) => builder.body(body.encode()),
                RequestBody::Raw(raw) => builder.body(raw.clone()),
            };
        }

        debug!(method = %self.request.method, url = %self.request.url, "sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }

    /// Defaults first, then explicit headers; `HeaderMap` names are case
    /// insensitive so an explicit header replaces a default of the same name.
    fn build_headers(
        &self,
        headers: &[(&str, &str)],
        authorization: Option<&str>,
    ) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        if let Some(auth) = authorization {
            map.insert(AUTHORIZATION, header_value(auth)?);
        }
        if self.request.body.is_some() {
            if let Some(content_type) = &self.request.content_type {
                map.insert(CONTENT_TYPE, header_value(content_type)?);
            }
        }
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {name}: {e}")))?;
            if name == AUTHORIZATION && authorization.is_some() && self.refresher.is_some() {
                // The managed bearer token stays in charge while it can be refreshed.
                continue;
            }
            map.insert(name, header_value(value)?);
        }
        Ok(map)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Config(format!("invalid header value: {e}")))
}
