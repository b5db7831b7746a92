#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod model;
pub mod value;
pub mod vector_store;

#[cfg(feature = "cli")]
pub use cli::passage_cli;
pub use config::RetrievalConfig;
pub use error::{Error, Result};
