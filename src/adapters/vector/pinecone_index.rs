//! Pinecone vector index over its REST API.
//!
//! On connect the index is described through the control plane and created
//! (serverless, cosine metric) if it does not exist yet. Queries and upserts
//! go to the index's own data-plane host.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::ports::{IndexedVector, NearestMatch, ReasonMetadata, VectorIndex, VectorIndexError};

const API_VERSION: &str = "2024-07";

/// Connection settings for a Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    api_key: Secret<String>,
    pub index_name: String,
    /// Control plane base URL (default: https://api.pinecone.io).
    pub control_plane_url: String,
    /// Vector dimension used when the index has to be created.
    pub dimension: usize,
    pub cloud: String,
    pub region: String,
    pub timeout: Duration,
    /// Delay between readiness checks after creating the index.
    pub ready_poll_interval: Duration,
    /// Readiness checks before giving up on a freshly created index.
    pub max_ready_polls: u32,
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            index_name: index_name.into(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            dimension: 1536,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            timeout: Duration::from_secs(30),
            ready_poll_interval: Duration::from_secs(2),
            max_ready_polls: 30,
        }
    }

    pub fn with_control_plane_url(mut self, url: impl Into<String>) -> Self {
        self.control_plane_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_serverless(mut self, cloud: impl Into<String>, region: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }

    pub fn with_ready_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.ready_poll_interval = interval;
        self.max_ready_polls = max_polls;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// A connected Pinecone index.
pub struct PineconeIndex {
    config: PineconeConfig,
    client: Client,
    /// Data-plane base URL, scheme included.
    data_url: String,
}

impl PineconeIndex {
    /// Resolves the index host, creating the index first if it is missing.
    pub async fn connect(config: PineconeConfig) -> Result<Self, VectorIndexError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VectorIndexError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let mut description = Self::describe(&client, &config).await?;

        if description.is_none() {
            info!(index = %config.index_name, dimension = config.dimension, "Creating vector index");
            Self::create(&client, &config).await?;
            description = Self::wait_until_ready(&client, &config).await?;
        }

        let description = description.ok_or_else(|| {
            VectorIndexError::Parse(format!("index {} not found after creation", config.index_name))
        })?;

        Ok(Self {
            data_url: data_plane_url(&description.host),
            config,
            client,
        })
    }

    /// Returns `None` when the index does not exist.
    async fn describe(
        client: &Client,
        config: &PineconeConfig,
    ) -> Result<Option<IndexDescription>, VectorIndexError> {
        let response = client
            .get(format!("{}/indexes/{}", config.control_plane_url, config.index_name))
            .header("Api-Key", config.api_key())
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| VectorIndexError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        let description = response
            .json()
            .await
            .map_err(|e| VectorIndexError::Parse(format!("Failed to parse index description: {}", e)))?;
        Ok(Some(description))
    }

    async fn create(client: &Client, config: &PineconeConfig) -> Result<(), VectorIndexError> {
        let body = CreateIndexRequest {
            name: &config.index_name,
            dimension: config.dimension,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &config.cloud,
                    region: &config.region,
                },
            },
        };

        let response = client
            .post(format!("{}/indexes", config.control_plane_url))
            .header("Api-Key", config.api_key())
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorIndexError::Request(e.to_string()))?;

        // 409: created concurrently by another instance
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        check_status(response).await.map(|_| ())
    }

    async fn wait_until_ready(
        client: &Client,
        config: &PineconeConfig,
    ) -> Result<Option<IndexDescription>, VectorIndexError> {
        let mut last = None;
        for _ in 0..config.max_ready_polls.max(1) {
            last = Self::describe(client, config).await?;
            if last.as_ref().is_some_and(IndexDescription::is_ready) {
                return Ok(last);
            }
            tokio::time::sleep(config.ready_poll_interval).await;
        }
        Ok(last)
    }

    async fn post_data<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response, VectorIndexError> {
        let response = self
            .client
            .post(format!("{}{}", self.data_url, path))
            .header("Api-Key", self.config.api_key())
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| VectorIndexError::Request(e.to_string()))?;
        check_status(response).await
    }
}

/// Hosts come back without a scheme; test servers may include one.
fn data_plane_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

async fn check_status(response: Response) -> Result<Response, VectorIndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(VectorIndexError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query_nearest(&self, vector: &[f32]) -> Result<Option<NearestMatch>, VectorIndexError> {
        let body = QueryRequest {
            vector,
            top_k: 1,
            include_metadata: true,
        };
        let response: QueryResponse = self
            .post_data("/query", &body)
            .await?
            .json()
            .await
            .map_err(|e| VectorIndexError::Parse(format!("Failed to parse query response: {}", e)))?;

        Ok(response.matches.into_iter().next().map(|m| NearestMatch {
            id: m.id,
            score: m.score,
            metadata: m.metadata.unwrap_or_default(),
        }))
    }

    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<(), VectorIndexError> {
        let body = UpsertRequest {
            vectors: vectors
                .iter()
                .map(|v| UpsertVector {
                    id: &v.id,
                    values: &v.values,
                    metadata: &v.metadata,
                })
                .collect(),
        };
        self.post_data("/vectors/upsert", &body).await.map(|_| ())
    }
}

// ----- Pinecone API Types -----

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

impl IndexDescription {
    fn is_ready(&self) -> bool {
        self.status.as_ref().map(|s| s.ready).unwrap_or(true)
    }
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: u32,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    score: Option<f32>,
    metadata: Option<ReasonMetadata>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a ReasonMetadata,
}
