//! ConnectWise Manage REST API client.
//!
//! Basic-auth client for companies, service tickets, and the service-board
//! catalog. List endpoints are paginated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::types::{
    Board, BoardStatus, Company, Member, Priority, Ticket, TicketCreateRequest, TicketType,
};
use crate::external::{ApiError, TargetSystem};

/// Largest page size ConnectWise accepts.
pub const PAGE_SIZE: usize = 1000;

/// Connection settings for a ConnectWise Manage instance.
#[derive(Debug, Clone)]
pub struct ConnectWiseConfig {
    /// API root, e.g. `https://na.myconnectwise.net/v4_6_release/apis/3.0`.
    pub base_url: String,
    pub company_id: String,
    pub public_key: String,
    pub private_key: String,
    pub client_id: String,
    pub timeout: Duration,
}

/// ConnectWise Manage REST API client.
#[derive(Debug)]
pub struct ConnectWiseClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ConnectWiseClient {
    /// Create a new ConnectWise API client.
    pub fn new(config: &ConnectWiseConfig) -> Result<Self, ApiError> {
        let required = [
            ("base_url", &config.base_url),
            ("company_id", &config.company_id),
            ("public_key", &config.public_key),
            ("private_key", &config.private_key),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(ApiError::Config(format!("ConnectWise {field} is empty")));
        }

        let mut headers = HeaderMap::new();
        if !config.client_id.is_empty() {
            let client_id = HeaderValue::from_str(&config.client_id)
                .map_err(|_| ApiError::Config("Invalid ConnectWise clientId format".into()))?;
            headers.insert("clientid", client_id);
        }

        // reqwest is built with rustls-no-provider; Err means already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: format!("{}+{}", config.company_id, config.public_key),
            password: config.private_key.clone(),
        })
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one page of a list endpoint. `path` may already carry a query.
    pub(crate) fn page_url(&self, path: &str, page: usize) -> String {
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{}{sep}page={page}&pageSize={PAGE_SIZE}", self.api_url(path))
    }

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

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Fetch every page of a list endpoint until a short page.
    async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let url = self.page_url(path, page);
            let resp = self.get(&url).send().await?;
            Self::check_status(&resp)?;
            let batch: Vec<T> = resp.json().await?;
            let len = batch.len();
            debug!(path, page, len, "ConnectWise page received");
            all.extend(batch);
            if len < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Active service boards.
    pub async fn list_boards(&self) -> Result<Vec<Board>, ApiError> {
        self.fetch_all("/service/boards?conditions=inactiveFlag=false")
            .await
    }

    /// Active statuses of one board. Filtered client-side.
    pub async fn list_statuses(&self, board_id: i64) -> Result<Vec<BoardStatus>, ApiError> {
        let statuses: Vec<BoardStatus> = self
            .fetch_all(&format!("/service/boards/{board_id}/statuses"))
            .await?;
        Ok(statuses.into_iter().filter(|s| !s.inactive).collect())
    }

    /// Active ticket priorities. Filtered client-side.
    pub async fn list_priorities(&self) -> Result<Vec<Priority>, ApiError> {
        let priorities: Vec<Priority> = self.fetch_all("/service/priorities").await?;
        Ok(priorities.into_iter().filter(|p| !p.inactive).collect())
    }

    /// Active ticket types of one board.
    pub async fn list_types(&self, board_id: i64) -> Result<Vec<TicketType>, ApiError> {
        self.fetch_all(&format!(
            "/service/boards/{board_id}/types?conditions=inactiveFlag=false"
        ))
        .await
    }

    /// Active members (technicians).
    pub async fn list_members(&self) -> Result<Vec<Member>, ApiError> {
        self.fetch_all("/system/members?conditions=inactiveFlag=false")
            .await
    }
}

#[async_trait]
impl TargetSystem for ConnectWiseClient {
    async fn list_organizations(&self) -> Result<Vec<Company>, ApiError> {
        let companies: Vec<Company> = self
            .fetch_all("/company/companies?conditions=deletedFlag=false&orderBy=name")
            .await?;
        info!(count = companies.len(), "ConnectWise companies retrieved");
        Ok(companies)
    }

    async fn create_ticket(&self, request: &TicketCreateRequest) -> Result<Ticket, ApiError> {
        let url = self.api_url("/service/tickets");
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(request)
            .send()
            .await?;
        Self::check_status(&resp)?;
        let ticket: Ticket = resp.json().await?;
        info!(
            ticket_id = ticket.id,
            company_id = request.company.id,
            board = %request.board.name,
            "ConnectWise ticket created"
        );
        Ok(ticket)
    }

    async fn get_ticket(&self, ticket_id: i64) -> Result<Ticket, ApiError> {
        let url = self.api_url(&format!("/service/tickets/{ticket_id}"));
        let resp = self.get(&url).send().await?;
        Self::check_status(&resp)?;
        Ok(resp.json().await?)
    }

    async fn update_ticket_status(&self, ticket_id: i64, status: &str) -> Result<(), ApiError> {
        let url = self.api_url(&format!("/service/tickets/{ticket_id}"));
        let patch = serde_json::json!([
            { "op": "replace", "path": "status", "value": { "name": status } }
        ]);
        let resp = self
            .http
            .patch(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&patch)
            .send()
            .await?;
        Self::check_status(&resp)?;
        info!(ticket_id, status, "ConnectWise ticket status updated");
        Ok(())
    }
}
