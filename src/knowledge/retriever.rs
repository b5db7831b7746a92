use std::path::PathBuf;

use serde::Serialize;

use crate::{
    config::DEFAULT_TOP_K,
    error::{Error, Result},
    knowledge::resolver::{ChunkResolver, SOURCE_PATH_KEY},
    model::{EmbeddingModel, EmbeddingModelInference as _},
    vector_store::{IndexMatch, QueryOptions, VectorIndex},
};

/// The single-best answer context: resolved chunk text, its provenance
/// path, and the similarity score the index reported for it.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: PathBuf,
    pub score: f32,
}

/// Composes the encoder, the index and the resolver into the end-to-end
/// question → chunk workflow. Holds no per-query state; a clone serves
/// concurrent requests independently.
#[derive(Debug, Clone)]
pub struct PassageRetriever {
    index: VectorIndex,
    model: EmbeddingModel,
    resolver: ChunkResolver,
    top_k: usize,
}

impl PassageRetriever {
    pub fn new(index: VectorIndex, model: EmbeddingModel) -> Self {
        Self {
            index,
            model,
            resolver: ChunkResolver::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(self, top_k: usize) -> Self {
        Self { top_k, ..self }
    }

    pub fn with_resolver(self, resolver: ChunkResolver) -> Self {
        Self { resolver, ..self }
    }

    /// Encodes the question and returns the full ordered match list, best
    /// first. This is the extension point for re-ranking or multi-chunk
    /// context assembly; an empty index yields an empty list, not an error.
    pub async fn search(&self, question: &str) -> Result<Vec<IndexMatch>> {
        let embedding = self.model.infer(question.to_owned()).await?;
        let opts = QueryOptions {
            top_k: self.top_k,
            include_metadata: true,
            include_values: false,
        };
        self.index.query(embedding, opts).await
    }

    /// Runs the whole workflow and keeps only the highest-scoring match.
    /// Zero matches fail with [`Error::NoMatches`].
    pub async fn nearest_chunk(&self, question: &str) -> Result<RetrievedChunk> {
        let matches = self.search(question).await?;
        let best = matches.into_iter().next().ok_or(Error::NoMatches)?;

        let source = source_path_of(&best)?;
        let text = self.resolver.read_chunk(&source).await?;
        Ok(RetrievedChunk {
            text,
            source,
            score: best.score,
        })
    }
}

fn source_path_of(m: &IndexMatch) -> Result<PathBuf> {
    m.metadata
        .as_ref()
        .and_then(|metadata| metadata.get(SOURCE_PATH_KEY))
        .and_then(|value| value.as_str())
        .map(PathBuf::from)
        .ok_or_else(|| Error::MissingSourcePath {
            id: m.id.clone(),
            key: SOURCE_PATH_KEY,
        })
}
