pub(crate) mod api;
pub(crate) mod custom;
pub(crate) mod embedding_model;

pub use api::ApiEmbeddingModel;
pub use embedding_model::{EmbeddingModel, EmbeddingModelInference};
