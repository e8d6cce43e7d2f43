//! Transport abstraction: the one place a request turns into network I/O.
//!
//! `Transport::execute` is the only suspension point of the crate. It makes a
//! single attempt with no timeout, no retry and no cancellation. Any HTTP
//! status, including 4xx/5xx, comes back as an `HttpResponse`; only a failure
//! to obtain a response at all is an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `request` and return whatever the server answered.
    ///
    /// Errors are `ApiError::Network` (or `Unknown` if the I/O task itself
    /// was lost).
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Statuses are data here; the client decides what counts as success.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(%method, %url, "sending request");

        let response = tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Unknown(format!("transport task failed: {e}")))??;

        tracing::debug!(%method, %url, status = response.status, "response received");
        Ok(response)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let body = req.body.unwrap_or_default();
    let result = match req.method {
        HttpMethod::Get => with_headers(agent.get(req.url.as_str()), &req.headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(req.url.as_str()), &req.headers).call(),
        HttpMethod::Post => with_headers(agent.post(req.url.as_str()), &req.headers).send(body.as_bytes()),
        HttpMethod::Put => with_headers(agent.put(req.url.as_str()), &req.headers).send(body.as_bytes()),
    };
    let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    // Manufacturer lists carry every logo inline, so no size cap applies.
    // Bytes that are not UTF-8 are left for the client's status and JSON
    // checks to judge.
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| ApiError::Network(format!("reading response body: {e}")))?;

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
