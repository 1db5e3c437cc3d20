//! Error types for the authenticated HTTP client.
//!
//! # Design
//! One variant per step of a request: marshal, request construction,
//! transport, body read, unmarshal. Every variant records the method and URL
//! that failed and chains the underlying cause through `source()`, so callers
//! can match on the step and still walk down to the transport or serde error.
//!
//! HTTP status codes are never errors here. A 404 or 500 arrives as a normal
//! `HttpResponse`; only a failure to decode its body surfaces as `Unmarshal`.

use crate::http::{HttpMethod, HttpResponse};

/// Errors returned by `HttpClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The input payload could not be serialized to JSON.
    #[error("failed to marshal body for {method} request to endpoint: {url}")]
    Marshal {
        method: HttpMethod,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be assembled, e.g. an unparsable URL or a token
    /// that is not a legal header value.
    #[error("failed to create {method} request to endpoint: {url}")]
    Request {
        method: HttpMethod,
        url: String,
        #[source]
        source: ureq::http::Error,
    },

    /// The exchange never produced a response (DNS, refused connection,
    /// timeout, unsupported URL).
    #[error("{method} request to endpoint: {url} failed")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// A response arrived but its body could not be read.
    #[error("failed to parse response from {method} request to endpoint: {url}")]
    Parse {
        method: HttpMethod,
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// The response body did not decode into the requested output type.
    ///
    /// `response` holds the envelope when one was built; the login exchange
    /// decodes straight from the wire and leaves it empty.
    #[error("failed to unmarshal json response from {method} request to endpoint: {url}")]
    Unmarshal {
        method: HttpMethod,
        url: String,
        response: Option<Box<HttpResponse>>,
        #[source]
        source: serde_json::Error,
    },
}

impl HttpError {
    pub fn method(&self) -> HttpMethod {
        match self {
            HttpError::Marshal { method, .. }
            | HttpError::Request { method, .. }
            | HttpError::Transport { method, .. }
            | HttpError::Parse { method, .. }
            | HttpError::Unmarshal { method, .. } => *method,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            HttpError::Marshal { url, .. }
            | HttpError::Request { url, .. }
            | HttpError::Transport { url, .. }
            | HttpError::Parse { url, .. }
            | HttpError::Unmarshal { url, .. } => url,
        }
    }

    /// The envelope of a response whose body failed to decode.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            HttpError::Unmarshal { response, .. } => response.as_deref(),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HttpError>;
