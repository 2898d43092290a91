//! `triage` command-line entrypoint.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use triage::builder::{BuildOutcome, IndexBuilder};
use triage::cache::{ResolverConfig, TieredResolver};
use triage::config::Config;
use triage::embedding::HttpEmbedder;
use triage::knowledge::FileDataset;
use triage::scoring::ChatCompletionCapability;
use triage::storage::KnowledgeBase;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "triage")]
#[command(about = "Resolve support questions into answer templates")]
struct Cli {
    /// Artifact directory (overrides TRIAGE_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the vector index, metadata and exact-match store from the dataset.
    Build {
        /// Dataset file (overrides TRIAGE_DATASET_PATH).
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Rebuild even when all artifacts exist.
        #[arg(long)]
        recreate: bool,
    },
    /// Resolve one question and print the hint as JSON.
    Ask {
        question: String,
        /// Similarity at or above which the semantic tier answers directly.
        #[arg(long)]
        threshold: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let result = match cli.command {
        Commands::Build { dataset, recreate } => {
            if let Some(path) = dataset {
                config.dataset_path = path;
            }
            run_build(&config, recreate).await
        }
        Commands::Ask {
            question,
            threshold,
        } => run_ask(&config, &question, threshold).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

async fn run_build(config: &Config, recreate: bool) -> anyhow::Result<()> {
    config.validate_for_build(recreate)?;
    let embedder = HttpEmbedder::new(config.embedding_config()?)?;
    let builder = IndexBuilder::new(embedder, FileDataset).with_batch_size(config.embed_batch_size);

    let outcome = builder
        .build(&config.dataset_path, &config.artifact_paths(), recreate)
        .await
        .with_context(|| format!("build from {}", config.dataset_path.display()))?;

    match outcome {
        BuildOutcome::Built { report, .. } => println!("Knowledge base built: {}", report),
        BuildOutcome::Skipped { reason } => {
            println!("Build skipped: {} (use --recreate to rebuild)", reason)
        }
    }
    Ok(())
}

async fn run_ask(config: &Config, question: &str, threshold: Option<f32>) -> anyhow::Result<()> {
    config.validate()?;
    let knowledge = KnowledgeBase::load(&config.artifact_paths())
        .context("load artifacts (run `triage build` first)")?;

    let embedder = HttpEmbedder::new(config.embedding_config()?)?;
    let capability = ChatCompletionCapability::new(config.chat_config()?)?;

    let mut resolver_config = ResolverConfig::default();
    if let Some(threshold) = threshold {
        resolver_config.high_confidence_similarity = threshold;
    }
    let resolver = TieredResolver::new(&knowledge, embedder, capability, resolver_config)?;

    let hint = resolver.resolve(question).await;
    println!("{}", serde_json::to_string_pretty(&hint)?);
    Ok(())
}
