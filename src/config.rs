use crate::error::{Error, Result};

pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;
pub const DEFAULT_TOP_K: usize = 5;

const DEFAULT_EMBEDDING_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Connection and model parameters, read from the environment exactly once
/// at startup and passed around by value afterwards. Nothing in the crate
/// reads the environment behind this struct's back.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub api_key: String,
    pub environment: String,
    pub index_name: String,
    pub embedding_api_base: String,
    pub embedding_api_key: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub top_k: usize,
}

impl RetrievalConfig {
    /// Reads `PINECONE_API_KEY`, `PINECONE_ENVIRONMENT` and `PINECONE_INDEX`
    /// (required), plus the optional `EMBEDDING_*` and `RETRIEVAL_TOP_K`
    /// overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(Error::MissingEnv(name))
        };

        let embedding_dimension =
            parse_or(&lookup, "EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?;
        let top_k = parse_or(&lookup, "RETRIEVAL_TOP_K", DEFAULT_TOP_K)?;

        Ok(Self {
            api_key: required("PINECONE_API_KEY")?,
            environment: required("PINECONE_ENVIRONMENT")?,
            index_name: required("PINECONE_INDEX")?,
            embedding_api_base: lookup("EMBEDDING_API_BASE")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_BASE.to_owned()),
            embedding_api_key: lookup("EMBEDDING_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .unwrap_or_default(),
            embedding_model: lookup("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_owned()),
            embedding_dimension,
            top_k,
        })
    }
}

fn parse_or(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: usize,
) -> Result<usize> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value = raw.parse::<usize>().map_err(|e| Error::InvalidConfig {
        name,
        reason: e.to_string(),
    })?;
    if value == 0 {
        return Err(Error::InvalidConfig {
            name,
            reason: "must be greater than zero".to_owned(),
        });
    }
    Ok(value)
}
