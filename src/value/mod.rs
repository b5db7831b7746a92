pub(crate) mod embedding;

pub use embedding::Embedding;
