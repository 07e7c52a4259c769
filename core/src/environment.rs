//! Environment traits - injected dependencies.
//!
//! Every network call leaves the process through an [`HttpBackend`]. The
//! production implementation wraps `reqwest`; tests inject a scripted mock.
//! Backends are deliberately dumb: they send what they are given and report
//! what came back. Token attachment, retry and error classification live in
//! the layers above.

use crate::error::{BookingError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// HTTP method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// A request relative to the API base path.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Path below the API base (e.g. `/reservations/7`)
    pub path: String,
    /// JSON body, if any
    pub body: Option<serde_json::Value>,
    /// Bearer credential to attach, if any
    pub bearer: Option<String>,
}

impl HttpRequest {
    /// Create a request without body or credential
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    /// GET `path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// POST `path`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// DELETE `path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Codec`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| BookingError::Codec(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Return a copy carrying `token` as the bearer credential
    #[must_use]
    pub fn with_bearer(&self, token: Option<&str>) -> Self {
        Self {
            bearer: token.map(str::to_string),
            ..self.clone()
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body", &self.body.as_ref().map(|_| "<json>"))
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A raw response: status code and body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body (JSON text, possibly empty)
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// 401
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// HTTP request executor.
///
/// # Implementation Notes
///
/// - Return `Ok` for every response the server produced, whatever its status
/// - Return [`BookingError::Network`] only when no response was obtained
///   (connect failure, timeout, body read failure)
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Execute one request.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Network`] if no response was received.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
