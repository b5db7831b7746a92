use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::Result,
    model::{
        api::ApiEmbeddingModel,
        custom::{CustomEmbeddingFunc, CustomEmbeddingModel},
    },
    value::Embedding,
};

#[async_trait]
pub trait EmbeddingModelInference {
    async fn infer(&self, text: String) -> Result<Embedding>;
}

#[derive(Debug, Clone)]
enum EmbeddingModelInner {
    Api(ApiEmbeddingModel),
    Custom(CustomEmbeddingModel),
}

/// Query encoder. Constructed once per process and reused; every call
/// re-encodes its input, there is no caching of repeated queries.
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    inner: EmbeddingModelInner,
}

impl EmbeddingModel {
    /// Hosted encoder speaking the OpenAI-compatible `/embeddings` protocol.
    pub fn new_api(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            inner: EmbeddingModelInner::Api(ApiEmbeddingModel::new(
                base_url, api_key, model, dimension,
            )),
        }
    }

    /// Caller-provided encoder function. Useful when the embedding runtime
    /// lives elsewhere, and for tests.
    pub fn new_custom(f: Arc<CustomEmbeddingFunc>) -> Self {
        Self {
            inner: EmbeddingModelInner::Custom(CustomEmbeddingModel::new(f)),
        }
    }
}

#[async_trait]
impl EmbeddingModelInference for EmbeddingModel {
    async fn infer(&self, text: String) -> Result<Embedding> {
        match &self.inner {
            EmbeddingModelInner::Api(model) => model.infer(text).await,
            EmbeddingModelInner::Custom(model) => model.infer(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;

    use super::*;

    #[tokio::test]
    async fn custom_model_dispatches_to_the_closure() {
        let model = EmbeddingModel::new_custom(Arc::new(
            |text: String| -> BoxFuture<'static, Result<Embedding>> {
                Box::pin(async move { Ok(Embedding::from(vec![text.len() as f32])) })
            },
        ));

        let embedding = model.infer("four".to_owned()).await.unwrap();
        assert_eq!(embedding, Embedding::from(vec![4.0]));
    }
}
