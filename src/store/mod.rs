//! Remote stores that hold the authoritative paper list.
//!
//! The controller only sees [`PaperStore`]; which backend sits behind it is a
//! configuration choice.

mod firestore;
mod sheet_api;

pub(crate) use firestore::paper_from_document;
pub use firestore::{Document, DocumentStoreClient, FirestoreStore, Subscription};
pub use sheet_api::{resolve_api_base, SheetApiStore, DEV_API_BASE};

use crate::config::{Backend, Settings};
use crate::model::{DashboardData, Paper};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("unexpected response payload: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("store misconfigured: {0}")]
    Config(String),
}

/// Read/write contract shared by every backend.
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Fetch the full paper collection and researcher profile.
    async fn fetch(&self) -> Result<DashboardData, StoreError>;
    /// Replace the stored collection with `papers`.
    async fn push(&self, papers: &[Paper]) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: PaperStore + ?Sized> PaperStore for Box<T> {
    async fn fetch(&self) -> Result<DashboardData, StoreError> {
        (**self).fetch().await
    }

    async fn push(&self, papers: &[Paper]) -> Result<(), StoreError> {
        (**self).push(papers).await
    }
}

fn http_client(settings: &Settings) -> Result<reqwest::Client, StoreError> {
    let mut builder = reqwest::Client::builder().user_agent(format!(
        "paper-tracker/{}",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Build the configured backend.
pub fn build_store(settings: &Settings) -> Result<Box<dyn PaperStore>, StoreError> {
    let http = http_client(settings)?;
    match settings.backend {
        Backend::Sheet => {
            let base = resolve_api_base(settings.api_base.as_deref(), &settings.origin)?;
            tracing::debug!(%base, "using spreadsheet API backend");
            Ok(Box::new(SheetApiStore::new(http, base)))
        }
        Backend::Firestore => {
            let client = document_client(settings, http)?;
            tracing::debug!(project = %settings.firestore.project_id, "using document store backend");
            Ok(Box::new(FirestoreStore::new(
                client,
                settings.firestore.papers_collection.clone(),
                settings.firestore.researcher_document.clone(),
            )))
        }
    }
}

/// Build a raw document-store client from settings.
pub fn build_document_client(settings: &Settings) -> Result<DocumentStoreClient, StoreError> {
    let http = http_client(settings)?;
    document_client(settings, http)
}

fn document_client(
    settings: &Settings,
    http: reqwest::Client,
) -> Result<DocumentStoreClient, StoreError> {
    let fs = &settings.firestore;
    if fs.project_id.trim().is_empty() {
        return Err(StoreError::Config(
            "firestore.project_id is required for the firestore backend".into(),
        ));
    }
    let base = format!(
        "{}/projects/{}/databases/(default)/documents",
        fs.endpoint.trim_end_matches('/'),
        fs.project_id
    );
    Ok(DocumentStoreClient::new(http, base, fs.api_key.clone()))
}
