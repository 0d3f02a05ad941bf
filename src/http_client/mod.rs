//! This module provides the HTTP client stack used to talk to the object
//! store: a configurable base client wrapped in retry middleware.

mod base;
mod client;

pub use base::{HttpClientError, TlsOptions, create_base_http_client};
pub use client::create_retryable_http_client;
