//! A set of helpers for testing

mod alert;
mod config;
mod http_client;
mod service;

pub use alert::AlertBuilder;
pub use config::{TEST_HOST_NAME, TEST_UUID, create_test_app_config};
pub use http_client::create_test_http_client;
pub use service::ServiceBuilder;
