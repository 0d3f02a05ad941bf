use std::{collections::HashMap, time::Duration};

use url::Url;

use crate::config::AppConfig;

/// Instance UUID used by [`create_test_app_config`].
pub const TEST_UUID: &str = "5a7c1f2e-1111-4222-8333-944455556666";

/// Service host used by [`create_test_app_config`].
pub const TEST_HOST_NAME: &str = "alertbridge_lab";

/// Creates a valid configuration with a single local endpoint, one static
/// service variable (`team: ops`) and a one week `keep_for`.
pub fn create_test_app_config() -> AppConfig {
    let mut config = AppConfig {
        uuid: TEST_UUID.to_string(),
        host_name: TEST_HOST_NAME.to_string(),
        keep_for: Duration::from_secs(168 * 60 * 60),
        static_service_vars: HashMap::from([("team".to_string(), "ops".to_string())]),
        ..Default::default()
    };
    config.object_store.urls = vec![Url::parse("http://127.0.0.1:5665").unwrap()];
    config.object_store.username = "bridge".to_string();
    config.object_store.password = "secret".to_string();
    config
}
