//! `reqwest` implementation of [`HttpBackend`].

use crate::config::ClientConfig;
use async_trait::async_trait;
use concert_booking_core::{BookingError, HttpBackend, HttpRequest, HttpResponse, Method, Result};
use reqwest::Client;
use std::time::Duration;

/// Production HTTP backend
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: Client,
    base_url: String,
}

impl ReqwestBackend {
    /// Create a backend for `base_url` with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Network`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BookingError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a backend from configuration.
    ///
    /// # Errors
    ///
    /// See [`ReqwestBackend::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(method = %request.method, path = %request.path, error = %e, "Request failed");
            BookingError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BookingError::Network(format!("failed to read response body: {e}")))?;

        tracing::debug!(method = %request.method, path = %request.path, status, "Request completed");
        Ok(HttpResponse::new(status, body))
    }
}
