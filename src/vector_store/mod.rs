pub(crate) mod api;
pub(crate) mod base;
pub(crate) mod local;

pub use api::{PineconeClient, PineconeIndex};
pub use base::{
    IndexMatch, IndexMetadata, IndexStats, IndexUpsert, Metric, QueryOptions, VectorIndex,
    VectorIndexBehavior,
};
pub use local::MemoryIndex;
