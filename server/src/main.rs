//! Assessment recommender entry point
//!
//! Three modes:
//! - `serve`: JSON-RPC over stdio (one message per line)
//! - `recommend`: answer a single query and exit
//! - `predict`: bulk predictions from a query file to JSON lines

use anyhow::Context;
use assessment_core::{EncoderKind, RecommenderConfig, ServingContext};
use assessment_server::rpc::{LineTransport, RpcServer};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "assessment-server")]
#[command(about = "Assessment recommendations from a natural-language job description")]
#[command(version)]
struct Args {
    /// JSON config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding embeddings.bin, index.bin and assessments_metadata.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Query encoder: minilm or hash
    #[arg(long, global = true)]
    encoder: Option<EncoderKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve JSON-RPC requests over stdio
    Serve,

    /// Recommend assessments for one query
    Recommend {
        query: String,

        #[arg(long, short = 'k', default_value_t = 10)]
        top_k: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write `{query, assessment_url}` lines for every query in a file
    Predict {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, short)]
        output: PathBuf,

        #[arg(long, short = 'k', default_value_t = 10)]
        top_k: usize,
    },
}

fn resolve_config(args: &Args) -> anyhow::Result<RecommenderConfig> {
    let mut config = match &args.config {
        Some(path) => RecommenderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RecommenderConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(kind) = args.encoder {
        config.encoder = kind;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries protocol/output, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assessment_server=info,assessment_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(&args)?;
    tracing::info!("Loading recommender from {:?}", config.data_dir);

    // Model download and artifact reads are blocking
    let ctx = match tokio::task::spawn_blocking(move || ServingContext::load(config)).await? {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            tracing::error!("Failed to initialize recommender: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Serve => {
            tracing::info!("Starting assessment recommender server");
            let server = RpcServer::new(ctx);
            let mut transport = LineTransport::stdio();
            if let Err(e) = server.run(&mut transport).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Recommend { query, top_k, json } => {
            let recommendations =
                tokio::task::spawn_blocking(move || ctx.recommend(&query, top_k)).await??;
            if json {
                println!("{}", serde_json::to_string_pretty(&recommendations)?);
            } else {
                for (i, rec) in recommendations.iter().enumerate() {
                    println!(
                        "{:>2}. {} [{}] {} min  score {:.4}\n    {}",
                        i + 1,
                        rec.name,
                        rec.test_type,
                        rec.duration,
                        rec.relevance_score,
                        rec.url
                    );
                }
            }
        }
        Command::Predict {
            input,
            output,
            top_k,
        } => {
            let summary = tokio::task::spawn_blocking(move || {
                assessment_server::run_predictions(&ctx, &input, &output, top_k)
            })
            .await??;
            tracing::info!(
                "Prediction run finished: {} queries, {} predictions, {} failed",
                summary.queries,
                summary.predictions,
                summary.failed
            );
        }
    }

    Ok(())
}
