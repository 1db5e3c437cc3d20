//! Login exchange against the Enlight authentication service.
//!
//! The service lives on one host per deployment stage. `"prod"` has its own
//! fixed host; every other stage name is spliced into the per-stage template.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::http::{self, header};

use crate::client::{request_error, HttpClient, APPLICATION_JSON};
use crate::error::{HttpError, Result};
use crate::http::HttpMethod;

const PROD_LOGIN_URL: &str = "https://api-auth.users.enlight.skf.com/login";

/// Login endpoint for a deployment stage.
pub fn login_url(stage: &str) -> String {
    if stage == "prod" {
        PROD_LOGIN_URL.to_string()
    } else {
        format!("https://api-auth.{stage}.users.enlight.skf.com/login")
    }
}

/// Body posted to the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// The part of the login reply the client keeps.
///
/// Any JSON object decodes: extra fields are ignored and a missing `token`
/// yields an empty one. Only a body that is not JSON, or a `token` that is
/// not a string, fails.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default, alias = "Token", alias = "TOKEN")]
    pub token: String,
}

impl HttpClient {
    /// Log in on `stage` and keep the returned token for later requests.
    ///
    /// On any error the previously held token is left in place.
    pub fn fetch_token(&mut self, stage: &str, username: &str, password: &str) -> Result<()> {
        let url = login_url(stage);
        self.fetch_token_at(&url, username, password)
    }

    /// Same exchange as `fetch_token`, against an explicit login URL.
    ///
    /// The reply is decoded straight off the wire without building an
    /// envelope, and its status code is not consulted.
    pub fn fetch_token_at(&mut self, url: &str, username: &str, password: &str) -> Result<()> {
        let method = HttpMethod::Post;
        let credentials = LoginRequest { username, password };
        let body = serde_json::to_vec(&credentials).map_err(|source| HttpError::Marshal {
            method,
            url: url.to_string(),
            source,
        })?;

        let request = http::Request::builder()
            .method(method.to_http())
            .uri(url)
            .header(header::ACCEPT, APPLICATION_JSON)
            .header(header::CONTENT_TYPE, APPLICATION_JSON)
            .body(body)
            .map_err(|source| request_error(method, url, source))?;

        let mut response = self.agent.run(request).map_err(|source| HttpError::Transport {
            method,
            url: url.to_string(),
            source,
        })?;
        debug!(url, status = response.status().as_u16(), "login response received");

        let reply: LoginResponse = serde_json::from_reader(response.body_mut().as_reader())
            .map_err(|source| HttpError::Unmarshal {
                method,
                url: url.to_string(),
                response: None,
                source,
            })?;

        self.token = reply.token;
        debug!(url, "token acquired");
        Ok(())
    }
}
