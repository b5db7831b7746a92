use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    config::RetrievalConfig,
    knowledge::{ChunkResolver, PassageRetriever},
    model::EmbeddingModel,
    vector_store::{PineconeClient, VectorIndex, VectorIndexBehavior},
};

#[derive(Parser, Debug)]
#[command(name = "passage", version, about = "Nearest-passage retrieval for RAG", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve the best-matching knowledge-base chunk for a question.
    Ask {
        question: String,

        #[arg(
            long,
            help = "How many matches to request from the index. Only the best one feeds the answer context."
        )]
        top_k: Option<usize>,

        #[arg(
            long,
            help = "Directory that relative `source_path` metadata entries resolve against."
        )]
        chunk_root: Option<PathBuf>,

        #[arg(long, help = "Print every returned match, not just the best one.")]
        show_matches: bool,
    },
    /// Show the configured index's current statistics.
    Stats,
}

pub async fn passage_cli(args: Vec<String>) -> anyhow::Result<()> {
    let cli = Cli::parse_from(args);
    let config = RetrievalConfig::from_env()?;

    match cli.command {
        Commands::Ask {
            question,
            top_k,
            chunk_root,
            show_matches,
        } => {
            let index = VectorIndex::new_pinecone(
                config.api_key.as_str(),
                config.environment.as_str(),
                &config.index_name,
            )
            .await?;
            let stats = index.describe_stats().await?;
            log::info!(
                "index `{}` holds {} vectors",
                config.index_name,
                stats.total_vector_count
            );

            let model = EmbeddingModel::new_api(
                config.embedding_api_base.as_str(),
                config.embedding_api_key.as_str(),
                config.embedding_model.as_str(),
                config.embedding_dimension,
            );

            let mut retriever = PassageRetriever::new(index, model)
                .with_top_k(top_k.unwrap_or(config.top_k));
            if let Some(root) = chunk_root {
                retriever = retriever.with_resolver(ChunkResolver::with_root(root));
            }

            if show_matches {
                for (rank, m) in retriever.search(&question).await?.iter().enumerate() {
                    println!("#{} {} (score {:.4})", rank + 1, m.id, m.score);
                }
            }

            let chunk = retriever.nearest_chunk(&question).await?;
            println!("source: {} (score {:.4})", chunk.source.display(), chunk.score);
            println!();
            println!("{}", chunk.text);
        }
        Commands::Stats => {
            let client =
                PineconeClient::connect(config.api_key.as_str(), config.environment.as_str())
                    .await?;
            let index = client.open_index(&config.index_name).await?;
            let stats = index.describe_stats().await?;

            println!("index:      {}", index.name());
            println!("metric:     {}", index.metric());
            println!("dimension:  {}", stats.dimension);
            println!("vectors:    {}", stats.total_vector_count);
            if let Some(fullness) = stats.index_fullness {
                println!("fullness:   {fullness:.3}");
            }
        }
    }

    Ok(())
}
