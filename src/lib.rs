#![warn(missing_docs)]
//! alertbridge reflects Alertmanager alerts into passive check results on
//! Icinga2 services, so alert state shows up in an Icinga based monitoring
//! view without a separate integration per alert source.

pub mod cmd;
pub mod config;
pub mod context;
pub mod engine;
pub mod http_client;
pub mod http_server;
pub mod models;
pub mod object_store;
pub mod supervisor;
pub mod test_helpers;
