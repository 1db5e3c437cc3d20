//! Blocking JSON HTTP client that authenticates with a bearer token.
//!
//! # Overview
//! `HttpClient::fetch_token` logs in against the Enlight auth service for a
//! deployment stage and keeps the returned token. The verb methods (`get`,
//! `post`, `put`, `delete`) then send that token verbatim as `Authorization`,
//! serialize an optional input as JSON and decode the body into an optional
//! output.
//!
//! # Design
//! - Every call returns an `HttpResponse` envelope (status, headers, raw
//!   body). A 4xx/5xx status is not an error; callers check `status_code`.
//! - `HttpError` names the failing step and carries the method and URL.
//! - No retries, no refresh, no pagination. One call is one exchange.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;

pub use auth::login_url;
pub use client::{ClientConfig, HttpClient};
pub use error::{HttpError, Result};
pub use http::{Headers, HttpMethod, HttpResponse};
