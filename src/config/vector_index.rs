//! Vector index (Pinecone) configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Pinecone configuration. Without an API key the service uses an
/// in-process index instead.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorIndexConfig {
    /// Pinecone API key
    pub api_key: Option<String>,

    /// Index holding the example reasons
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Control plane URL used to describe and create the index
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,

    /// Vector dimension, must match the embedding model
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Serverless cloud for index creation
    #[serde(default = "default_cloud")]
    pub cloud: String,

    /// Serverless region for index creation
    #[serde(default = "default_region")]
    pub region: String,
}

impl VectorIndexConfig {
    /// Check if Pinecone is configured
    pub fn has_pinecone(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate vector index configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dimension == 0 {
            return Err(ValidationError::InvalidDimension);
        }
        if self.has_pinecone() {
            if self.index_name.is_empty() {
                return Err(ValidationError::MissingRequired("PINECONE_INDEX_NAME"));
            }
            if !self.control_plane_url.starts_with("https://")
                && !self.control_plane_url.starts_with("http://")
            {
                return Err(ValidationError::InvalidUrl("vector_index.control_plane_url"));
            }
        }
        Ok(())
    }
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: default_index_name(),
            control_plane_url: default_control_plane_url(),
            dimension: default_dimension(),
            cloud: default_cloud(),
            region: default_region(),
        }
    }
}

fn default_index_name() -> String {
    "weight-loss-reasons".to_string()
}

fn default_control_plane_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
