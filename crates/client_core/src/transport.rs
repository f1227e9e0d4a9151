//! Single-shot HTTP requests with the two parameter encodings the server understands.

use reqwest::{multipart, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::protocol::FormData;
use tracing::debug;
use url::form_urlencoded;

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One request: target, verb and the field set to encode.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub data: FormData,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            data: FormData::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_data(mut self, data: FormData) -> Self {
        self.data = data;
        self
    }

    /// Final URL: GET carries its fields in the query string, every other verb keeps the
    /// URL as given.
    pub fn target_url(&self) -> String {
        if self.method != Method::Get || self.data.is_empty() {
            return self.url.clone();
        }
        let query = self
            .data
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>(),
                    form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.url)
    }

    /// Multipart body for non-GET verbs.
    fn body(&self) -> Option<multipart::Form> {
        if self.method == Method::Get {
            return None;
        }
        let form = self
            .data
            .iter()
            .fold(multipart::Form::new(), |form, (key, value)| {
                form.text(key.to_string(), value.to_string())
            });
        Some(form)
    }
}

/// Sends requests with a shared cookie jar so the server session survives between calls.
///
/// Every call is independent: there is no retry, timeout, queue or cancellation. The
/// returned future resolves exactly once, to either an error or the decoded payload.
#[derive(Debug, Clone)]
pub struct RequestClient {
    http: Client,
}

impl RequestClient {
    pub fn new() -> Result<Self, RequestError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http })
    }

    pub async fn send(&self, request: Request) -> Result<Value, RequestError> {
        let url = request.target_url();
        debug!(method = ?request.method, url = %url, "sending request");

        let mut builder = self.http.request(request.method.as_reqwest(), &url);
        if let Some(body) = request.body() {
            builder = builder.multipart(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = %status, "request finished with failure status");
            return Err(RequestError::Status(status));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, RequestError> {
        let value = self.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
