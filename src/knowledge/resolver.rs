use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Metadata key that names the file a stored chunk came from. Indexing
/// pipelines must write it; retrieval validates it before touching disk.
pub const SOURCE_PATH_KEY: &str = "source_path";

/// Reads chunk content from the local filesystem. No caching: every call
/// re-reads, so retrieval always reflects the current file state.
#[derive(Debug, Clone, Default)]
pub struct ChunkResolver {
    root: Option<PathBuf>,
}

impl ChunkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative metadata paths resolve against `root`; absolute paths are
    /// used as-is.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub async fn read_chunk(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = self.resolve(path.as_ref());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::ChunkRead { path, source })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    async fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("passage-test-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[tokio::test]
    async fn reads_full_file_content() {
        let dir = scratch_dir().await;
        let path = dir.join("chunk.txt");
        tokio::fs::write(&path, "ML Runtime is a managed execution environment.\n")
            .await
            .unwrap();

        let text = ChunkResolver::new().read_chunk(&path).await.unwrap();
        assert_eq!(text, "ML Runtime is a managed execution environment.\n");
    }

    #[tokio::test]
    async fn relative_paths_resolve_against_the_root() {
        let dir = scratch_dir().await;
        tokio::fs::write(dir.join("chunk.txt"), "rooted").await.unwrap();

        let resolver = ChunkResolver::with_root(&dir);
        assert_eq!(resolver.read_chunk("chunk.txt").await.unwrap(), "rooted");
    }

    #[tokio::test]
    async fn missing_file_is_a_chunk_read_error() {
        let dir = scratch_dir().await;
        let missing = dir.join("moved-away.txt");

        let err = ChunkResolver::new().read_chunk(&missing).await.unwrap_err();
        match err {
            Error::ChunkRead { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected ChunkRead, got {other:?}"),
        }
    }
}
