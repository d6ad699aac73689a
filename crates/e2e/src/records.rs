//! Side-channel record API used to seed and remove fixtures

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{ApiConfig, HarnessConfig};
use crate::error::{E2eError, E2eResult};

/// Writes records directly to the backend, bypassing the UI
#[async_trait]
pub trait RecordWriteApi: Send + Sync {
    /// Create all `records` in one call; any non-success fails the whole call
    async fn create(&self, records: &[Value]) -> E2eResult<()>;

    /// Delete by primary key in one call; an empty slice is a no-op
    async fn delete(&self, ids: &[i64]) -> E2eResult<()>;
}

/// [`RecordWriteApi`] over the admin open API
pub struct HttpRecordApi {
    client: reqwest::Client,
    base_url: String,
    config: ApiConfig,
}

impl HttpRecordApi {
    pub fn new(base_url: impl Into<String>, config: ApiConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn from_config(config: &HarnessConfig) -> E2eResult<Self> {
        Self::new(config.api_base_url.clone(), config.api.clone())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");

        if let Some(origin) = &self.config.origin {
            req = req.header("Origin", origin);
        }
        if let Some(token) = &self.config.bearer_token {
            req = req.bearer_auth(token);
        }
        for (name, value) in &self.config.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        req
    }

    async fn check(op: &'static str, resp: Response) -> E2eResult<()> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<cannot read body>".to_string());
        Err(E2eError::WriteApi {
            op,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RecordWriteApi for HttpRecordApi {
    async fn create(&self, records: &[Value]) -> E2eResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        debug!("Creating {} record(s) via {}", records.len(), self.config.create_path);

        let resp = self
            .request(Method::POST, &self.config.create_path)
            .json(records)
            .send()
            .await?;
        Self::check("create", resp).await?;

        info!("Created {} record(s)", records.len());
        Ok(())
    }

    async fn delete(&self, ids: &[i64]) -> E2eResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        debug!("Deleting records {:?} via {}", ids, self.config.delete_path);

        let resp = self
            .request(Method::DELETE, &self.config.delete_path)
            .json(ids)
            .send()
            .await?;
        Self::check("delete", resp).await?;

        info!("Deleted {} record(s)", ids.len());
        Ok(())
    }
}
