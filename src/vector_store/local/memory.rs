use std::cmp::Ordering;

use async_trait::async_trait;
use uuid::Uuid;

use super::super::base::{
    IndexMatch, IndexMetadata, IndexStats, IndexUpsert, QueryOptions, VectorIndexBehavior,
};
use crate::{
    error::{Error, Result},
    value::Embedding,
};

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    embedding: Embedding,
    metadata: Option<IndexMetadata>,
}

/// Exact-search index held in process memory. Scores every stored vector
/// with cosine similarity; fine for corpora that fit in RAM, and the
/// stand-in for the managed service in tests.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    dimension: usize,
    entries: Vec<Entry>,
}

impl MemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndexBehavior for MemoryIndex {
    async fn upsert(&mut self, inputs: Vec<IndexUpsert>) -> Result<usize> {
        for input in &inputs {
            self.check_dimension(&input.embedding)?;
        }
        let count = inputs.len();
        self.entries.extend(inputs.into_iter().map(|input| Entry {
            id: Uuid::new_v4().to_string(),
            embedding: input.embedding,
            metadata: input.metadata,
        }));
        Ok(count)
    }

    async fn query(&self, embedding: Embedding, opts: QueryOptions) -> Result<Vec<IndexMatch>> {
        self.check_dimension(&embedding)?;

        let mut matches: Vec<IndexMatch> = self
            .entries
            .iter()
            .map(|entry| IndexMatch {
                id: entry.id.clone(),
                score: embedding.cosine(&entry.embedding),
                metadata: opts.include_metadata.then(|| entry.metadata.clone()).flatten(),
                values: opts.include_values.then(|| entry.embedding.clone()),
            })
            .collect();
        // Stable sort keeps insertion order for equal scores.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(opts.top_k);
        Ok(matches)
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            total_vector_count: self.entries.len(),
            dimension: self.dimension,
            index_fullness: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn upsert(embedding: Vec<f32>, source: &str) -> IndexUpsert {
        IndexUpsert {
            embedding: embedding.into(),
            metadata: Some(
                json!({ "source_path": source })
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
        }
    }

    async fn populated() -> MemoryIndex {
        let mut index = MemoryIndex::new(3);
        index
            .upsert(vec![
                upsert(vec![1.0, 0.0, 0.0], "docs/one.txt"),
                upsert(vec![0.0, 1.0, 0.0], "docs/two.txt"),
                upsert(vec![0.9, 0.1, 0.0], "docs/one-ish.txt"),
            ])
            .await
            .unwrap();
        index
    }

    #[tokio::test]
    async fn matches_are_sorted_by_descending_score() {
        let index = populated().await;
        let matches = index
            .query(vec![1.0, 0.0, 0.0].into(), QueryOptions::default())
            .await
            .unwrap();

        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(
            matches[0].metadata.as_ref().unwrap()["source_path"],
            json!("docs/one.txt")
        );
    }

    #[yare::parameterized(
        fewer_than_stored = { 2, 2 },
        exactly_stored = { 3, 3 },
        more_than_stored = { 10, 3 },
    )]
    fn returns_min_of_top_k_and_count(top_k: usize, expected: usize) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let index = populated().await;
            let opts = QueryOptions {
                top_k,
                ..QueryOptions::default()
            };
            let matches = index.query(vec![1.0, 0.0, 0.0].into(), opts).await.unwrap();
            assert_eq!(matches.len(), expected);
        });
    }

    #[tokio::test]
    async fn empty_index_returns_no_matches() {
        let index = MemoryIndex::new(3);
        let matches = index
            .query(vec![1.0, 0.0, 0.0].into(), QueryOptions::default())
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn metadata_is_omitted_when_not_requested() {
        let index = populated().await;
        let opts = QueryOptions {
            include_metadata: false,
            ..QueryOptions::default()
        };
        let matches = index.query(vec![1.0, 0.0, 0.0].into(), opts).await.unwrap();
        assert!(matches.iter().all(|m| m.metadata.is_none()));
        assert!(matches.iter().all(|m| m.values.is_none()));
    }

    #[tokio::test]
    async fn cosine_scores_of_normalized_vectors_stay_in_range() {
        let index = populated().await;
        let matches = index
            .query(vec![0.6, 0.8, 0.0].into(), QueryOptions::default())
            .await
            .unwrap();
        assert!(!matches.is_empty());
        for m in matches {
            assert!((0.0..=1.0).contains(&m.score), "score {} out of range", m.score);
        }
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let index = populated().await;
        let err = index
            .query(vec![1.0, 0.0].into(), QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));

        let mut index = MemoryIndex::new(3);
        let err = index
            .upsert(vec![upsert(vec![1.0], "docs/short.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn stats_track_the_stored_count() {
        let mut index = MemoryIndex::new(3);
        assert_eq!(index.describe_stats().await.unwrap().total_vector_count, 0);

        index
            .upsert(vec![upsert(vec![1.0, 0.0, 0.0], "docs/one.txt")])
            .await
            .unwrap();
        let stats = index.describe_stats().await.unwrap();
        assert_eq!(stats.total_vector_count, 1);
        assert_eq!(stats.dimension, 3);
    }
}
