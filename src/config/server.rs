use serde::Deserialize;

/// Configuration for the webhook HTTP server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address and port for the HTTP server to listen on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Token Alertmanager must present, either as `Authorization: Bearer` or
    /// as a `token` query parameter. If not set in config, falls back to
    /// `ALERTBRIDGE_BEARER_TOKEN` env var.
    #[serde(default = "default_bearer_token_from_env")]
    pub bearer_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_address: default_listen_address(), bearer_token: None }
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:8888".to_string()
}

fn default_bearer_token_from_env() -> Option<String> {
    std::env::var("ALERTBRIDGE_BEARER_TOKEN").ok()
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = Config::builder()
            .add_source(config::File::from_str("", config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<ServerConfig>()
            .unwrap();
        assert_eq!(config.listen_address, "0.0.0.0:8888");
    }

    #[test]
    fn test_custom_server_config() {
        let yaml = r#"
          listen_address: "127.0.0.1:9999"
          bearer_token: "s3cret"
        "#;
        let config = Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<ServerConfig>()
            .unwrap();
        assert_eq!(config.listen_address, "127.0.0.1:9999");
        assert_eq!(config.bearer_token.as_deref(), Some("s3cret"));
    }
}
