use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;
use uuid::Uuid;

use super::super::base::{
    IndexMatch, IndexMetadata, IndexStats, IndexUpsert, Metric, QueryOptions, VectorIndexBehavior,
};
use crate::{
    error::{Error, Result},
    value::Embedding,
};

const API_KEY_HEADER: &str = "Api-Key";

/// Control-plane session with a Pinecone-style index service. Connecting
/// validates the API key and learns the project identifier that data-plane
/// hosts are derived from.
#[derive(Debug, Clone)]
pub struct PineconeClient {
    api_key: String,
    environment: String,
    project_name: String,
    client: reqwest::Client,
}

/// Handle bound to one named index, talking to its data-plane host.
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    name: String,
    dimension: usize,
    metric: Metric,
    base: Url,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WhoamiResponse {
    project_name: String,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    database: DatabaseInfo,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Debug, Deserialize)]
struct DatabaseInfo {
    dimension: usize,
    #[serde(default = "default_metric")]
    metric: Metric,
}

fn default_metric() -> Metric {
    Metric::Cosine
}

#[derive(Debug, Default, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    host: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Embedding,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<IndexMetadata>,
    #[serde(default)]
    values: Option<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<WireVector>,
}

#[derive(Debug, Serialize)]
struct WireVector {
    id: String,
    values: Embedding,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<IndexMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: usize,
    dimension: usize,
    #[serde(default)]
    index_fullness: Option<f32>,
}

async fn decode_json<T: DeserializeOwned>(endpoint: &str, resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Unauthorized);
    }
    if !status.is_success() {
        return Err(Error::UnexpectedResponse {
            endpoint: endpoint.to_owned(),
            reason: format!("status {status}"),
        });
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::UnexpectedResponse {
        endpoint: endpoint.to_owned(),
        reason: e.to_string(),
    })
}

impl PineconeClient {
    pub async fn connect(
        api_key: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let environment = environment.into();
        let client = reqwest::Client::new();

        let endpoint = format!("https://controller.{environment}.pinecone.io/actions/whoami");
        let resp = client
            .get(&endpoint)
            .header(API_KEY_HEADER, &api_key)
            .send()
            .await?;
        let whoami: WhoamiResponse = decode_json(&endpoint, resp).await?;

        Ok(Self {
            api_key,
            environment,
            project_name: whoami.project_name,
            client,
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub async fn open_index(&self, name: &str) -> Result<PineconeIndex> {
        let endpoint = format!(
            "https://controller.{}.pinecone.io/databases/{}",
            self.environment, name
        );
        let resp = self
            .client
            .get(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::IndexNotFound(name.to_owned()));
        }
        let desc: DescribeIndexResponse = decode_json(&endpoint, resp).await?;

        let host = desc.status.host.unwrap_or_else(|| {
            format!(
                "{}-{}.svc.{}.pinecone.io",
                name, self.project_name, self.environment
            )
        });
        let base =
            Url::parse(&format!("https://{host}")).map_err(|e| Error::UnexpectedResponse {
                endpoint: endpoint.clone(),
                reason: format!("bad index host `{host}`: {e}"),
            })?;

        Ok(PineconeIndex {
            name: name.to_owned(),
            dimension: desc.database.dimension,
            metric: desc.database.metric,
            base,
            api_key: self.api_key.clone(),
            client: self.client.clone(),
        })
    }
}

impl PineconeIndex {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let endpoint = self.base.join(path).map_err(|e| Error::UnexpectedResponse {
            endpoint: path.to_owned(),
            reason: e.to_string(),
        })?;
        let resp = self
            .client
            .post(endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;
        decode_json(endpoint.as_str(), resp).await
    }
}

#[async_trait]
impl VectorIndexBehavior for PineconeIndex {
    async fn upsert(&mut self, inputs: Vec<IndexUpsert>) -> Result<usize> {
        let vectors = inputs
            .into_iter()
            .map(|input| WireVector {
                id: Uuid::new_v4().to_string(),
                values: input.embedding,
                metadata: input.metadata,
            })
            .collect();
        let resp: UpsertResponse = self
            .post_json("/vectors/upsert", &UpsertRequest { vectors })
            .await?;
        Ok(resp.upserted_count)
    }

    async fn query(&self, embedding: Embedding, opts: QueryOptions) -> Result<Vec<IndexMatch>> {
        if embedding.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        let request = QueryRequest {
            vector: embedding,
            top_k: opts.top_k,
            include_metadata: opts.include_metadata,
            include_values: opts.include_values,
        };
        // The service returns matches sorted by descending score; pass the
        // order through untouched.
        let resp: QueryResponse = self.post_json("/query", &request).await?;
        Ok(resp
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
                values: m.values.map(Embedding::from),
            })
            .collect())
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        let resp: StatsResponse = self
            .post_json("/describe_index_stats", &serde_json::json!({}))
            .await?;
        Ok(IndexStats {
            total_vector_count: resp.total_vector_count,
            dimension: resp.dimension,
            index_fullness: resp.index_fullness,
        })
    }
}
