//! An `ObjectStore` talking to the Icinga2 REST API.

use reqwest::{Response, header::ACCEPT};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use url::Url;

use super::traits::{ObjectFilter, ObjectStore, ObjectStoreError};
use crate::{
    config::ObjectStoreConfig,
    http_client::{TlsOptions, create_base_http_client, create_retryable_http_client},
    models::{CheckResult, Downtime, Host, ServiceRecord},
};

/// Attributes that name an object and cannot be changed after creation.
const IMMUTABLE_ATTRS: [&str; 2] = ["name", "host_name"];

#[derive(Debug, Deserialize)]
struct Results<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry<T> {
    attrs: T,
}

/// Icinga2 API client.
///
/// Holds the currently active API URL behind a lock; every request reads it
/// exactly once. Switching between endpoints is left to
/// [`FailoverStore`](super::FailoverStore).
pub struct IcingaClient {
    client: ClientWithMiddleware,
    username: String,
    password: String,
    templates: Vec<String>,
    active_url: RwLock<Url>,
}

impl IcingaClient {
    /// Builds a client from the object store configuration. The first
    /// configured URL is active initially.
    pub fn new(config: &ObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        let tls = TlsOptions { insecure: config.insecure_tls, ca_pem: config.ca_data.clone() };
        let base_client = create_base_http_client(&config.http_base, &tls)?;
        let client = create_retryable_http_client(&config.http_retry, base_client);
        Self::with_client(client, config)
    }

    /// Builds a client around an existing HTTP client.
    pub fn with_client(
        client: ClientWithMiddleware,
        config: &ObjectStoreConfig,
    ) -> Result<Self, ObjectStoreError> {
        let primary = config.urls.first().cloned().ok_or(ObjectStoreError::NoEndpoint)?;
        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
            templates: config.templates.clone(),
            active_url: RwLock::new(primary),
        })
    }

    async fn url_for(&self, segments: &[&str]) -> Result<Url, ObjectStoreError> {
        let base = self.active_url.read().await.clone();
        join_segments(&base, segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password)).header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ObjectStoreError> {
        let response = self.authorized(request).send().await?;
        ensure_success(response).await
    }

    /// GETs a single object, mapping 404 to `None`.
    async fn get_object<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, ObjectStoreError> {
        let url = self.url_for(segments).await?;
        let response = self.authorized(self.client.get(url)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let mut results = decode::<Results<ObjectEntry<T>>>(response).await?.results;
        if results.is_empty() { Ok(None) } else { Ok(Some(results.swap_remove(0).attrs)) }
    }

    async fn list_objects<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: String,
    ) -> Result<Vec<T>, ObjectStoreError> {
        let url = self.url_for(&["v1", "objects", collection]).await?;
        let response = self.send(self.client.get(url).query(&[("filter", filter)])).await?;
        let results = decode::<Results<ObjectEntry<T>>>(response).await?.results;
        Ok(results.into_iter().map(|entry| entry.attrs).collect())
    }
}

#[async_trait::async_trait]
impl ObjectStore for IcingaClient {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_host(&self, name: &str) -> Result<Option<Host>, ObjectStoreError> {
        self.get_object(&["v1", "objects", "hosts", name]).await
    }

    #[tracing::instrument(skip(self, host), fields(host = %host.name), level = "debug")]
    async fn create_host(&self, host: &Host) -> Result<Host, ObjectStoreError> {
        let url = self.url_for(&["v1", "objects", "hosts", &host.name]).await?;
        let attrs = attributes(host, &["name"])?;
        self.send(self.client.put(url).json(&json!({ "attrs": attrs }))).await?;
        tracing::info!(host = %host.name, "Created host.");
        Ok(host.clone())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_service(&self, full_name: &str) -> Result<Option<ServiceRecord>, ObjectStoreError> {
        self.get_object(&["v1", "objects", "services", full_name]).await
    }

    #[tracing::instrument(skip(self, service), fields(service = %service.full_name()), level = "debug")]
    async fn create_service(
        &self,
        service: &ServiceRecord,
    ) -> Result<ServiceRecord, ObjectStoreError> {
        let full_name = service.full_name();
        let url = self.url_for(&["v1", "objects", "services", &full_name]).await?;

        let mut body = Map::new();
        if !self.templates.is_empty() {
            body.insert("templates".to_string(), json!(self.templates));
        }
        body.insert("attrs".to_string(), Value::Object(attributes(service, &["name"])?));

        self.send(self.client.put(url).json(&body)).await?;
        Ok(service.clone())
    }

    #[tracing::instrument(skip(self, service), fields(service = %service.full_name()), level = "debug")]
    async fn update_service(
        &self,
        service: &ServiceRecord,
    ) -> Result<ServiceRecord, ObjectStoreError> {
        let full_name = service.full_name();
        let url = self.url_for(&["v1", "objects", "services", &full_name]).await?;
        let attrs = attributes(service, &IMMUTABLE_ATTRS)?;
        self.send(self.client.post(url).json(&json!({ "attrs": attrs }))).await?;
        Ok(service.clone())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete_service(&self, full_name: &str) -> Result<(), ObjectStoreError> {
        let url = self.url_for(&["v1", "objects", "services", full_name]).await?;
        self.send(self.client.delete(url).query(&[("cascade", "1")])).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_services(
        &self,
        filter: &ObjectFilter,
    ) -> Result<Vec<ServiceRecord>, ObjectStoreError> {
        self.list_objects("services", filter.service_expression()).await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_downtimes(&self, filter: &ObjectFilter) -> Result<Vec<Downtime>, ObjectStoreError> {
        self.list_objects("downtimes", filter.downtime_expression()).await
    }

    #[tracing::instrument(skip(self, service), fields(service = %service.full_name()), level = "debug")]
    async fn submit_check_result(
        &self,
        service: &ServiceRecord,
        result: &CheckResult,
    ) -> Result<(), ObjectStoreError> {
        let url = self.url_for(&["v1", "actions", "process-check-result"]).await?;
        let body = json!({
            "type": "Service",
            "filter": format!(
                "host.name==\"{}\" && service.name==\"{}\"",
                service.host_name, service.name
            ),
            "exit_status": result.exit_status,
            "plugin_output": result.plugin_output,
        });
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn probe_connectivity(&self, url: &Url) -> Result<(), ObjectStoreError> {
        let probe_url = join_segments(url, &["v1"])?;
        self.send(self.client.get(probe_url)).await?;
        Ok(())
    }

    async fn set_active_url(&self, url: Url) {
        *self.active_url.write().await = url;
    }

    async fn active_url(&self) -> Url {
        self.active_url.read().await.clone()
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ObjectStoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ObjectStoreError::InvalidUrl(base.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Serializes an object into an attribute map without the excluded keys.
fn attributes<T: serde::Serialize>(
    object: &T,
    excluded: &[&str],
) -> Result<Map<String, Value>, ObjectStoreError> {
    match serde_json::to_value(object).map_err(|e| ObjectStoreError::Decode(e.to_string()))? {
        Value::Object(mut attrs) => {
            for key in excluded {
                attrs.remove(*key);
            }
            Ok(attrs)
        }
        other => Err(ObjectStoreError::Decode(format!("expected an object, got {other}"))),
    }
}

async fn ensure_success(response: Response) -> Result<Response, ObjectStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ObjectStoreError::Status { status: status.as_u16(), body })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ObjectStoreError> {
    response.json::<T>().await.map_err(|e| ObjectStoreError::Decode(e.to_string()))
}
