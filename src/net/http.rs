//! Raw HTTP seam underneath the authorized transport.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR) and native tests: `BrowserHttpClient` refuses to send,
//! since the identity endpoints are only meaningful from the browser.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use async_trait::async_trait;
use serde::Serialize;

use super::error::TransportFailure;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outbound request as seen by the transport pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Build a JSON `POST`.
    ///
    /// # Errors
    ///
    /// Returns `TransportFailure::Request` if `body` cannot be serialized.
    pub fn post_json<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self, TransportFailure> {
        let body = serde_json::to_value(body).map_err(|e| TransportFailure::Request(e.to_string()))?;
        Ok(Self { body: Some(body), ..Self::new(Method::Post, url) })
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace any existing value for `name`.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value));
    }
}

/// A response that arrived, whatever its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Status 400 and above is a failure; anything lower is delivered as-is.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Sends one request. Implementations report any answered status as `Ok`.
#[async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// `fetch`-backed client used by the browser build.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHttpClient;

#[cfg(feature = "hydrate")]
#[async_trait(?Send)]
impl HttpClient for BrowserHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        use gloo_net::http::{Method as GlooMethod, RequestBuilder};

        let method = match request.method {
            Method::Get => GlooMethod::GET,
            Method::Post => GlooMethod::POST,
        };
        let mut builder = RequestBuilder::new(&request.url).method(method);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let built = match &request.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| TransportFailure::Request(e.to_string()))?;

        let resp = built
            .send()
            .await
            .map_err(|e| TransportFailure::NoResponse(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}

#[cfg(not(feature = "hydrate"))]
#[async_trait(?Send)]
impl HttpClient for BrowserHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let _ = request;
        Err(TransportFailure::Request("not available on server".to_owned()))
    }
}
