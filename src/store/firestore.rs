//! Hosted document-database backend (Firestore REST v1).
//!
//! [`DocumentStoreClient`] exposes the raw document primitives
//! (create/update/delete/get/ordered query/subscribe). [`FirestoreStore`]
//! layers the paper/researcher contract on top of them.

use super::{PaperStore, StoreError};
use crate::model::{DashboardData, Paper, ResearcherProfile};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;

/// A stored document decoded into plain JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawDocument {
    fn decode(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let fields = self
            .fields
            .into_iter()
            .map(|(k, v)| (k, decode_value(&v)))
            .collect();
        Document { id, fields }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryRow {
    document: Option<RawDocument>,
}

/// Plain JSON to a Firestore typed value.
pub(crate) fn encode_value(v: &Value) -> Value {
    match v {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Firestore typed value back to plain JSON. Unknown kinds decode to null.
pub(crate) fn decode_value(v: &Value) -> Value {
    let Some(obj) = v.as_object() else {
        return Value::Null;
    };
    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        // Encoded as a decimal string on the wire.
        return match i {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(s.clone())),
            other => other.clone(),
        };
    }
    if let Some(d) = obj.get("doubleValue") {
        return d.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(t) = obj.get("timestampValue") {
        return t.clone();
    }
    if let Some(arr) = obj.get("arrayValue") {
        let values = arr
            .get("values")
            .and_then(Value::as_array)
            .map(|vs| vs.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(m) = obj.get("mapValue") {
        let fields = m
            .get("fields")
            .and_then(Value::as_object)
            .map(|f| f.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect())
            .unwrap_or_default();
        return Value::Object(fields);
    }
    Value::Null
}

fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

pub struct DocumentStoreClient {
    http: reqwest::Client,
    /// `.../projects/{project}/databases/(default)/documents`
    base: String,
    api_key: Option<String>,
}

impl DocumentStoreClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base: base.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        match &self.api_key {
            Some(key) => format!("{}/{}?key={}", self.base, path, key),
            None => format!("{}/{}", self.base, path),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, StoreError> {
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, StoreError> {
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Create a document with a generated id and return that id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> Result<String, StoreError> {
        let url = self.url(collection);
        let req = self
            .http
            .post(&url)
            .json(&json!({ "fields": encode_fields(fields) }));
        let resp = self.send(req, &url).await?;
        let doc: RawDocument = Self::decode(resp).await?;
        Ok(doc.decode().id)
    }

    /// Write `fields` to `collection/id`, creating the document if missing.
    pub async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        let req = self
            .http
            .patch(&url)
            .json(&json!({ "fields": encode_fields(fields) }));
        self.send(req, &url).await?;
        Ok(())
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        self.send(self.http.delete(&url), &url).await?;
        Ok(())
    }

    /// Fetch one document; `None` when it does not exist.
    pub async fn get_document(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let url = self.url(path);
        let resp = self.http.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(StoreError::Status {
                status: resp.status(),
                url,
            });
        }
        let doc: RawDocument = Self::decode(resp).await?;
        Ok(Some(doc.decode()))
    }

    /// All documents of `collection`, ascending by `order_by`.
    pub async fn query_ordered(
        &self,
        collection: &str,
        order_by: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let url = match &self.api_key {
            Some(key) => format!("{}:runQuery?key={}", self.base, key),
            None => format!("{}:runQuery", self.base),
        };
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{ "field": { "fieldPath": order_by }, "direction": "ASCENDING" }]
            }
        });
        let resp = self.send(self.http.post(&url).json(&body), &url).await?;
        let rows: Vec<QueryRow> = Self::decode(resp).await?;
        // Rows without a document only carry read metadata.
        Ok(rows
            .into_iter()
            .filter_map(|r| r.document.map(RawDocument::decode))
            .collect())
    }

    /// Poll the ordered query and deliver a snapshot whenever it changes.
    ///
    /// The first successful snapshot is always delivered. Polling stops when
    /// the returned [`Subscription`] is dropped.
    pub fn subscribe(
        self: std::sync::Arc<Self>,
        collection: String,
        order_by: String,
        interval: Duration,
    ) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel::<Vec<Document>>();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last: Option<Vec<Document>> = None;
            loop {
                ticker.tick().await;
                match self.query_ordered(&collection, &order_by).await {
                    Ok(docs) => {
                        if last.as_ref() != Some(&docs) {
                            if tx.send(docs.clone()).is_err() {
                                break;
                            }
                            last = Some(docs);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, %collection, "snapshot poll failed");
                    }
                }
                if tx.is_closed() {
                    break;
                }
            }
        });
        Subscription { rx, handle }
    }
}

/// Live query handle returned by [`DocumentStoreClient::subscribe`].
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
    handle: tokio::task::JoinHandle<()>,
}

impl Subscription {
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Dropping a JoinHandle does not stop the task.
        self.handle.abort();
    }
}

pub(crate) fn paper_from_document(doc: &Document) -> Result<Paper, StoreError> {
    serde_json::from_value(Value::Object(doc.fields.clone()))
        .map_err(|e| StoreError::Decode(format!("document {}: {e}", doc.id)))
}

fn paper_fields(paper: &Paper) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(paper) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Decode("paper did not serialize to an object".into())),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

/// Paper/researcher contract on top of the document store.
pub struct FirestoreStore {
    client: DocumentStoreClient,
    papers_collection: String,
    /// `collection/document` path of the researcher profile.
    researcher_document: String,
}

impl FirestoreStore {
    pub fn new(
        client: DocumentStoreClient,
        papers_collection: impl Into<String>,
        researcher_document: impl Into<String>,
    ) -> Self {
        Self {
            client,
            papers_collection: papers_collection.into(),
            researcher_document: researcher_document.into(),
        }
    }
}

#[async_trait]
impl PaperStore for FirestoreStore {
    async fn fetch(&self) -> Result<DashboardData, StoreError> {
        let docs = self
            .client
            .query_ordered(&self.papers_collection, "id")
            .await?;
        let papers = docs
            .iter()
            .map(paper_from_document)
            .collect::<Result<Vec<_>, _>>()?;

        let researcher = match self.client.get_document(&self.researcher_document).await? {
            Some(doc) => serde_json::from_value::<ResearcherProfile>(Value::Object(doc.fields))
                .map_err(|e| StoreError::Decode(format!("researcher: {e}")))?,
            None => ResearcherProfile::default(),
        };

        Ok(DashboardData { papers, researcher })
    }

    async fn push(&self, papers: &[Paper]) -> Result<(), StoreError> {
        let existing = self
            .client
            .query_ordered(&self.papers_collection, "id")
            .await?;

        let keep: HashSet<String> = papers.iter().map(|p| p.id.to_string()).collect();
        let writes = papers
            .iter()
            .map(|p| Ok((p.id.to_string(), paper_fields(p)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        try_join_all(writes.iter().map(|(id, fields)| {
            self.client
                .update_document(&self.papers_collection, id, fields)
        }))
        .await?;
        try_join_all(
            existing
                .iter()
                .filter(|d| !keep.contains(&d.id))
                .map(|d| self.client.delete_document(&self.papers_collection, &d.id)),
        )
        .await?;
        tracing::debug!(count = papers.len(), "synchronised paper documents");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/firestore_tests.rs"]
mod tests;
