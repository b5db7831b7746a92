use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::embedding_model::EmbeddingModelInference,
    value::Embedding,
};

/// Encoder backed by an OpenAI-compatible `/embeddings` endpoint. The model
/// is named by its published identifier and hosted by the collaborator; this
/// client only ships text out and validates the vector that comes back.
#[derive(Debug, Clone)]
pub struct ApiEmbeddingModel {
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
}

impl ApiEmbeddingModel {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
            client: reqwest::Client::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl EmbeddingModelInference for ApiEmbeddingModel {
    async fn infer(&self, text: String) -> Result<Embedding> {
        let endpoint = format!("{}/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: &self.model,
            input: vec![text.as_str()],
        };
        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            return Err(Error::UnexpectedResponse {
                endpoint,
                reason: format!("status {status}"),
            });
        }
        let body = resp.text().await?;
        decode_embedding(&endpoint, &body, self.dimension)
    }
}

fn decode_embedding(endpoint: &str, body: &str, dimension: usize) -> Result<Embedding> {
    let decoded: EmbeddingsResponse =
        serde_json::from_str(body).map_err(|e| Error::UnexpectedResponse {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

    let Some(datum) = decoded.data.into_iter().next() else {
        return Err(Error::UnexpectedResponse {
            endpoint: endpoint.to_owned(),
            reason: "empty `data` array".to_owned(),
        });
    };
    if datum.embedding.len() != dimension {
        return Err(Error::DimensionMismatch {
            expected: dimension,
            actual: datum.embedding.len(),
        });
    }
    Ok(datum.embedding.into())
}
