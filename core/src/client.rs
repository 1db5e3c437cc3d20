//! Authenticated, blocking JSON client.
//!
//! # Design
//! `HttpClient` owns a `ureq` agent and one mutable field, the bearer token.
//! Every verb funnels into `send`, which marshals the optional input, attaches
//! the token verbatim as `Authorization`, performs one exchange and decodes
//! the body into the optional output. There is no retry, no token refresh and
//! no status-code interpretation: a 500 is a successful exchange.
//!
//! Token mutation goes through `&mut self` (see `auth`), so sharing one client
//! between threads while refreshing its token needs an external lock.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use ureq::http::{self, header};

use crate::error::{HttpError, Result};
use crate::http::{HttpMethod, HttpResponse};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Transport settings for an `HttpClient`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound on a whole exchange, body included. `None` waits forever.
    pub timeout: Option<Duration>,
}

/// Blocking HTTP client that sends a bearer token with every request.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) agent: ureq::Agent,
    pub(crate) token: String,
}

impl HttpClient {
    /// A client with an empty token. Call `fetch_token` before talking to
    /// protected endpoints.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// A client that already holds `token`.
    pub fn with_token(token: &str) -> Self {
        let mut client = Self::new();
        client.token = token.to_string();
        client
    }

    /// A client with an empty token and the given transport settings.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            agent: build_agent(&config),
            token: String::new(),
        }
    }

    /// The token currently sent as `Authorization`; empty before login.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// GET `url`, decoding the body into `output` when given.
    pub fn get<O>(&self, url: &str, output: Option<&mut O>) -> Result<HttpResponse>
    where
        O: DeserializeOwned,
    {
        self.send::<(), O>(HttpMethod::Get, url, None, output)
    }

    /// POST `input` as JSON to `url`, decoding the body into `output` when given.
    pub fn post<I, O>(&self, url: &str, input: Option<&I>, output: Option<&mut O>) -> Result<HttpResponse>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.send(HttpMethod::Post, url, input, output)
    }

    /// PUT `input` as JSON to `url`, decoding the body into `output` when given.
    pub fn put<I, O>(&self, url: &str, input: Option<&I>, output: Option<&mut O>) -> Result<HttpResponse>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.send(HttpMethod::Put, url, input, output)
    }

    /// DELETE `url`, decoding the body into `output` when given.
    pub fn delete<O>(&self, url: &str, output: Option<&mut O>) -> Result<HttpResponse>
    where
        O: DeserializeOwned,
    {
        self.send::<(), O>(HttpMethod::Delete, url, None, output)
    }

    /// Perform one exchange.
    ///
    /// `input` is serialized only for POST and PUT. When `output` is given the
    /// body is decoded into it; a decode failure returns `Unmarshal` carrying
    /// the envelope.
    fn send<I, O>(
        &self,
        method: HttpMethod,
        url: &str,
        input: Option<&I>,
        output: Option<&mut O>,
    ) -> Result<HttpResponse>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let body = match input {
            Some(input) if method.carries_body() => {
                Some(serde_json::to_vec(input).map_err(|source| HttpError::Marshal {
                    method,
                    url: url.to_string(),
                    source,
                })?)
            }
            _ => None,
        };

        let builder = http::Request::builder()
            .method(method.to_http())
            .uri(url)
            .header(header::ACCEPT, APPLICATION_JSON)
            .header(header::AUTHORIZATION, self.token.as_str());

        debug!(%method, url, has_body = body.is_some(), "sending request");
        let result = match body {
            Some(body) => {
                let request = builder
                    .header(header::CONTENT_TYPE, APPLICATION_JSON)
                    .body(body)
                    .map_err(|source| request_error(method, url, source))?;
                self.agent.run(request)
            }
            None => {
                let request = builder
                    .body(())
                    .map_err(|source| request_error(method, url, source))?;
                self.agent.run(request)
            }
        };

        let raw = result.map_err(|source| HttpError::Transport {
            method,
            url: url.to_string(),
            source,
        })?;
        let response = HttpResponse::read(raw).map_err(|source| HttpError::Parse {
            method,
            url: url.to_string(),
            source,
        })?;
        debug!(%method, url, status = response.status_code, bytes = response.body.len(), "received response");

        if let Some(output) = output {
            match response.json::<O>() {
                Ok(value) => *output = value,
                Err(source) => {
                    warn!(%method, url, status = response.status_code, error = %source, "response body did not decode");
                    return Err(HttpError::Unmarshal {
                        method,
                        url: url.to_string(),
                        response: Some(Box::new(response)),
                        source,
                    });
                }
            }
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("HttpClient").field("token", &token).finish_non_exhaustive()
    }
}

pub(crate) fn request_error(method: HttpMethod, url: &str, source: http::Error) -> HttpError {
    HttpError::Request {
        method,
        url: url.to_string(),
        source,
    }
}

/// Status codes are left to the caller, so the agent must not turn 4xx/5xx
/// into errors.
fn build_agent(config: &ClientConfig) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(config.timeout)
        .build()
        .new_agent()
}
