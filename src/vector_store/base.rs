use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::{
    api::{PineconeClient, PineconeIndex},
    local::MemoryIndex,
};
use crate::{config::DEFAULT_TOP_K, error::Result, value::Embedding};

/// Key-value payload stored next to each vector. The only key this crate
/// interprets is the chunk source path; everything else passes through.
pub type IndexMetadata = Map<String, Json>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexUpsert {
    pub embedding: Embedding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Embedding>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    pub top_k: usize,
    pub include_metadata: bool,
    pub include_values: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            include_metadata: true,
            include_values: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vector_count: usize,
    pub dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_fullness: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Metric {
    Cosine,
    Dotproduct,
    Euclidean,
}

/// Contract every index backend satisfies. `query` returns matches already
/// sorted by descending similarity score; callers never re-sort.
#[async_trait]
pub trait VectorIndexBehavior {
    async fn upsert(&mut self, inputs: Vec<IndexUpsert>) -> Result<usize>;
    async fn query(&self, embedding: Embedding, opts: QueryOptions) -> Result<Vec<IndexMatch>>;
    async fn describe_stats(&self) -> Result<IndexStats>;
}

#[derive(Debug, Clone)]
pub enum VectorIndexInner {
    Pinecone(Arc<Mutex<PineconeIndex>>),
    Memory(Arc<Mutex<MemoryIndex>>),
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    inner: VectorIndexInner,
}

impl VectorIndex {
    /// Connects to the managed service and binds to `index_name`. The
    /// connection is made once; the returned handle is cheap to clone and
    /// reuse across queries.
    pub async fn new_pinecone(
        api_key: impl Into<String>,
        environment: impl Into<String>,
        index_name: &str,
    ) -> Result<Self> {
        let client = PineconeClient::connect(api_key, environment).await?;
        let index = client.open_index(index_name).await?;
        Ok(Self {
            inner: VectorIndexInner::Pinecone(Arc::new(Mutex::new(index))),
        })
    }

    pub fn new_memory(dimension: usize) -> Self {
        Self {
            inner: VectorIndexInner::Memory(Arc::new(Mutex::new(MemoryIndex::new(dimension)))),
        }
    }

    pub async fn upsert(&self, inputs: Vec<IndexUpsert>) -> Result<usize> {
        match &self.inner {
            VectorIndexInner::Pinecone(inner) => inner.lock().await.upsert(inputs).await,
            VectorIndexInner::Memory(inner) => inner.lock().await.upsert(inputs).await,
        }
    }

    pub async fn query(&self, embedding: Embedding, opts: QueryOptions) -> Result<Vec<IndexMatch>> {
        match &self.inner {
            VectorIndexInner::Pinecone(inner) => inner.lock().await.query(embedding, opts).await,
            VectorIndexInner::Memory(inner) => inner.lock().await.query(embedding, opts).await,
        }
    }

    pub async fn describe_stats(&self) -> Result<IndexStats> {
        match &self.inner {
            VectorIndexInner::Pinecone(inner) => inner.lock().await.describe_stats().await,
            VectorIndexInner::Memory(inner) => inner.lock().await.describe_stats().await,
        }
    }
}
