pub(crate) mod resolver;
pub(crate) mod retriever;

pub use resolver::{ChunkResolver, SOURCE_PATH_KEY};
pub use retriever::{PassageRetriever, RetrievedChunk};
