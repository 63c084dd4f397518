use super::{PaperStore, StoreError};
use crate::model::{DashboardData, Paper, UpdateRequest};
use async_trait::async_trait;
use url::Url;

/// API base used when the dashboard is served from a local development host.
pub const DEV_API_BASE: &str = "http://localhost:3001";

/// Pick the API base URL.
///
/// An explicit base always wins. Otherwise the origin the dashboard runs under
/// decides: `localhost` talks to the local dev server, anything else uses the
/// same origin as the deployment.
pub fn resolve_api_base(explicit: Option<&str>, origin: &str) -> Result<String, StoreError> {
    if let Some(base) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Url::parse(base)?;
        return Ok(base.trim_end_matches('/').to_string());
    }
    let url = Url::parse(origin)?;
    if url.host_str() == Some("localhost") {
        return Ok(DEV_API_BASE.to_string());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Client for the spreadsheet-backed HTTP API.
pub struct SheetApiStore {
    http: reqwest::Client,
    base: String,
}

impl SheetApiStore {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn data_url(&self) -> String {
        format!("{}/api/data", self.base)
    }

    fn update_url(&self) -> String {
        format!("{}/api/update", self.base)
    }
}

#[async_trait]
impl PaperStore for SheetApiStore {
    async fn fetch(&self) -> Result<DashboardData, StoreError> {
        let url = self.data_url();
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status(),
                url,
            });
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn push(&self, papers: &[Paper]) -> Result<(), StoreError> {
        let url = self.update_url();
        let resp = self
            .http
            .post(&url)
            .json(&UpdateRequest { papers })
            .send()
            .await?;
        // Body is ignored; only success matters.
        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status(),
                url,
            });
        }
        tracing::debug!(count = papers.len(), "pushed paper collection");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/sheet_api_tests.rs"]
mod tests;
