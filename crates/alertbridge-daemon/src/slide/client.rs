//! Slide REST API client.
//!
//! Bearer-token client for the alert, device, backup, and client endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::types::{Alert, Backup, Client, Device, ListResponse};
use crate::external::{ApiError, SourceSystem};

/// Connection settings for the Slide API.
#[derive(Debug, Clone)]
pub struct SlideConfig {
    /// API root, e.g. `https://api.slide.tech`.
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Slide REST API client.
#[derive(Debug)]
pub struct SlideClient {
    http: reqwest::Client,
    base_url: String,
}

impl SlideClient {
    /// Create a new Slide API client.
    pub fn new(config: &SlideConfig) -> Result<Self, ApiError> {
        if config.base_url.is_empty() {
            return Err(ApiError::Config("Slide base_url is empty".into()));
        }
        if config.api_key.is_empty() {
            return Err(ApiError::Config("Slide api_key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let token_val = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| ApiError::Config("Invalid Slide API key format".into()))?;
        headers.insert(AUTHORIZATION, token_val);

        // reqwest is built with rustls-no-provider; Err means already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Build the v1 URL for a given path.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    /// Check HTTP response status, returning error for non-success codes.
    fn check_status(resp: &reqwest::Response) -> Result<(), ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").into(),
            });
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.api_url(path);
        debug!(%url, "Slide GET");
        let resp = self.http.get(&url).send().await?;
        Self::check_status(&resp)?;
        Ok(resp.json().await?)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let body: ListResponse<T> = self.get_json(path).await?;
        Ok(body.data)
    }
}

#[async_trait]
impl SourceSystem for SlideClient {
    async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.list("/alert").await
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ApiError> {
        self.list("/device").await
    }

    async fn get_device(&self, device_id: &str) -> Result<Device, ApiError> {
        self.get_json(&format!("/device/{device_id}")).await
    }

    async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
        self.list("/backup").await
    }

    async fn list_organizations(&self) -> Result<Vec<Client>, ApiError> {
        self.list("/client").await
    }

    async fn close_alert(&self, alert_id: &str) -> Result<(), ApiError> {
        let url = self.api_url(&format!("/alert/{alert_id}"));
        let payload = serde_json::json!({ "status": "resolved", "resolved": true });
        let resp = self.http.patch(&url).json(&payload).send().await?;
        Self::check_status(&resp)?;
        info!(alert_id, "Slide alert resolved");
        Ok(())
    }
}
