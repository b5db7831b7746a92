use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a retrieval. None of these are recovered or
/// retried locally; each one propagates and aborts the current query.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required environment variable `{0}`")]
    MissingEnv(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("vector index service request failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("the vector index service rejected the API key")]
    Unauthorized,

    #[error("index `{0}` does not exist")]
    IndexNotFound(String),

    #[error("the index returned no matches for the query")]
    NoMatches,

    #[error("embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("match `{id}` carries no `{key}` metadata")]
    MissingSourcePath { id: String, key: &'static str },

    #[error("failed to read chunk at `{}`", path.display())]
    ChunkRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected response from `{endpoint}`: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },
}
