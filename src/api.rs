// API client module: a small blocking HTTP client for the retrieval /
// answering service. Three calls are exposed: a health probe, the index
// build (multipart upload of PDFs) and the question endpoint. Every
// failure is turned into a `ClientError` so the UI never has to deal
// with raw transport errors.

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{BackendAddress, Timeouts};
use crate::document::UploadedDocument;
use crate::error::ClientError;

pub const HEALTH_PATH: &str = "/health";
pub const BUILD_INDEX_PATH: &str = "/build_index";
pub const ASK_PATH: &str = "/ask";

/// Multipart field name used for every uploaded file.
pub const FILES_FIELD: &str = "files";

/// Operations the controller needs from the backend. `ApiClient` is the
/// real implementation; tests substitute their own.
pub trait Backend {
    /// Base address shown to the user.
    fn base_url(&self) -> &str;

    /// True iff the backend answered the health probe with 200. Never fails.
    fn health_check(&self) -> bool;

    /// Replace the server-side index with the given documents.
    fn build_index(&self, documents: &mut [UploadedDocument]) -> Result<IndexSummary, ClientError>;

    /// Ask a question against the current index. The backend alone decides
    /// how many chunks to retrieve.
    fn ask(&self, question: &str) -> Result<AskResponse, ClientError>;
}

/// Successful `/build_index` body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    #[serde(default, deserialize_with = "nullable")]
    pub chunks: u64,
}

/// Successful `/ask` body. Missing or null fields fall back to empty values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AskResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub answer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub context: String,
    /// Retrieved evidence, in the backend's relevance order.
    #[serde(default, deserialize_with = "nullable")]
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChunkRecord {
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub metadata: ChunkMetadata,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkMetadata {
    #[serde(deserialize_with = "source_or_unknown")]
    pub source_file: String,
    #[serde(deserialize_with = "index_or_missing")]
    pub chunk_index: i64,
}

impl Default for ChunkMetadata {
    fn default() -> Self {
        Self {
            source_file: UNKNOWN_SOURCE.to_string(),
            chunk_index: MISSING_CHUNK_INDEX,
        }
    }
}

const UNKNOWN_SOURCE: &str = "unknown";
const MISSING_CHUNK_INDEX: i64 = -1;

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn source_or_unknown<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()))
}

fn index_or_missing<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(MISSING_CHUNK_INDEX))
}

/// Request body variants accepted by `ApiClient::perform`.
pub enum Payload {
    Empty,
    Json(Value),
    Multipart(multipart::Form),
}

/// Blocking client bound to one backend address for the process lifetime.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    address: BackendAddress,
    timeouts: Timeouts,
}

impl ApiClient {
    pub fn new(address: BackendAddress, timeouts: Timeouts) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            address,
            timeouts,
        })
    }

    /// Create a client for the address in `BACKEND_URL` (or the default)
    /// with the standard timeouts.
    pub fn from_env() -> Result<Self> {
        Self::new(BackendAddress::resolve(), Timeouts::default())
    }

    pub fn address(&self) -> &BackendAddress {
        &self.address
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Issue one request. Only transport failures are errors here; the
    /// status is left to the caller.
    fn send(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        timeout: Duration,
    ) -> Result<Response, ClientError> {
        let url = self.address.endpoint(path);
        debug!(%method, %url, ?timeout, "sending request");

        let req = self.client.request(method, &url).timeout(timeout);
        let req = match payload {
            Payload::Empty => req,
            Payload::Json(body) => req.json(&body),
            Payload::Multipart(form) => req.multipart(form),
        };

        req.send().map_err(|e| {
            let err = ClientError::transport(&e);
            warn!(%url, error = %err, "request failed");
            err
        })
    }

    /// Shared request routine for the build and ask calls: send, map a
    /// non-200 status to `ClientError::Backend`, decode the 200 body.
    pub fn perform<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        timeout: Duration,
    ) -> Result<T, ClientError> {
        let res = self.send(method, path, payload, timeout)?;
        let status = res.status();
        debug!(path, status = status.as_u16(), "response received");

        if status != StatusCode::OK {
            let body = res.text().unwrap_or_default();
            let err = ClientError::Backend {
                status: status.as_u16(),
                detail: error_detail(&body),
            };
            warn!(path, error = %err, "backend returned an error");
            return Err(err);
        }

        let body = res.text().map_err(|e| ClientError::transport(&e))?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(path, error = %e, "could not decode response body");
            ClientError::MalformedResponse(e.to_string())
        })
    }
}

impl Backend for ApiClient {
    fn base_url(&self) -> &str {
        self.address.as_str()
    }

    fn health_check(&self) -> bool {
        match self.send(Method::GET, HEALTH_PATH, Payload::Empty, self.timeouts.health) {
            Ok(res) => {
                let healthy = res.status() == StatusCode::OK;
                if !healthy {
                    warn!(status = res.status().as_u16(), "health probe failed");
                }
                healthy
            }
            Err(_) => false,
        }
    }

    fn build_index(&self, documents: &mut [UploadedDocument]) -> Result<IndexSummary, ClientError> {
        if documents.is_empty() {
            return Err(ClientError::NoDocuments);
        }

        let mut form = multipart::Form::new();
        for doc in documents.iter_mut() {
            let bytes = doc.read_all().map_err(|e| {
                ClientError::Transport(format!("could not read {}: {}", doc.filename(), e))
            })?;
            let part = multipart::Part::bytes(bytes)
                .file_name(doc.filename().to_string())
                .mime_str(doc.media_type())
                .map_err(|_| ClientError::InvalidMediaType {
                    filename: doc.filename().to_string(),
                    media_type: doc.media_type().to_string(),
                })?;
            form = form.part(FILES_FIELD, part);
        }

        debug!(documents = documents.len(), "uploading documents");
        self.perform(
            Method::POST,
            BUILD_INDEX_PATH,
            Payload::Multipart(form),
            self.timeouts.build_index,
        )
    }

    fn ask(&self, question: &str) -> Result<AskResponse, ClientError> {
        if question.trim().is_empty() {
            return Err(ClientError::EmptyQuestion);
        }

        self.perform(
            Method::POST,
            ASK_PATH,
            Payload::Json(json!({ "question": question })),
            self.timeouts.ask,
        )
    }
}

/// Pick the message to show for a non-200 response: the `detail` member
/// of a JSON object, otherwise the JSON itself, otherwise the raw text.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        Ok(other) => other.to_string(),
        Err(_) => body.to_string(),
    }
}
