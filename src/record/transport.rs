use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::wire::{ByIdParams, DeletePayload, FetchParams, RecordResponse, RecordsPayload};
use super::RecordId;
use crate::config::Config;
use crate::error::{ConfigError, RecordError};

/// The five per-table operations of the hosted record service.
#[async_trait]
pub trait RecordTransport: Send + Sync {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<RecordResponse, RecordError>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &ByIdParams,
    ) -> Result<RecordResponse, RecordError>;

    async fn create_record(
        &self,
        table: &str,
        payload: &RecordsPayload,
    ) -> Result<RecordResponse, RecordError>;

    async fn update_record(
        &self,
        table: &str,
        payload: &RecordsPayload,
    ) -> Result<RecordResponse, RecordError>;

    async fn delete_record(
        &self,
        table: &str,
        payload: &DeletePayload,
    ) -> Result<RecordResponse, RecordError>;
}

/// Talks to the record service over HTTPS with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, project_id: &str, public_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            public_key: public_key.to_string(),
        }
    }

    /// Builds the transport from startup configuration. Both credentials must be set.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let project_id = config
            .project_id
            .as_deref()
            .ok_or(ConfigError::Missing("TASKBOARD_PROJECT_ID"))?;
        let public_key = config
            .public_key
            .as_deref()
            .ok_or(ConfigError::Missing("TASKBOARD_PUBLIC_KEY"))?;
        Ok(Self::new(&config.api_url, project_id, public_key))
    }

    fn records_url(&self, table: &str) -> String {
        format!(
            "{}/projects/{}/tables/{}/records",
            self.base_url, self.project_id, table
        )
    }

    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        url: String,
        body: &B,
    ) -> Result<RecordResponse, RecordError> {
        tracing::debug!(%method, %url, "record request");
        let response = self
            .client
            .request(method, &url)
            .header("x-api-key", &self.public_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<RecordResponse>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(RecordError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(RecordError::Decode(e)),
        }
    }
}

#[async_trait]
impl RecordTransport for HttpTransport {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<RecordResponse, RecordError> {
        let url = format!("{}/query", self.records_url(table));
        self.send(Method::POST, url, params).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &ByIdParams,
    ) -> Result<RecordResponse, RecordError> {
        let url = format!("{}/{}/query", self.records_url(table), id);
        self.send(Method::POST, url, params).await
    }

    async fn create_record(
        &self,
        table: &str,
        payload: &RecordsPayload,
    ) -> Result<RecordResponse, RecordError> {
        self.send(Method::POST, self.records_url(table), payload).await
    }

    async fn update_record(
        &self,
        table: &str,
        payload: &RecordsPayload,
    ) -> Result<RecordResponse, RecordError> {
        self.send(Method::PATCH, self.records_url(table), payload).await
    }

    async fn delete_record(
        &self,
        table: &str,
        payload: &DeletePayload,
    ) -> Result<RecordResponse, RecordError> {
        self.send(Method::DELETE, self.records_url(table), payload).await
    }
}
