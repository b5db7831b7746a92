use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{error::Result, model::embedding_model::EmbeddingModelInference, value::Embedding};

pub type CustomEmbeddingFunc =
    dyn Fn(String) -> BoxFuture<'static, Result<Embedding>> + Send + Sync;

#[derive(Clone)]
pub struct CustomEmbeddingModel {
    f: Arc<CustomEmbeddingFunc>,
}

impl Debug for CustomEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomEmbeddingModel")
            .field("f", &"function")
            .finish()
    }
}

impl CustomEmbeddingModel {
    pub fn new(f: Arc<CustomEmbeddingFunc>) -> Self {
        Self { f }
    }
}

#[async_trait]
impl EmbeddingModelInference for CustomEmbeddingModel {
    async fn infer(&self, text: String) -> Result<Embedding> {
        (self.f)(text).await
    }
}
