use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::{pin_mut, StreamExt};
use tracing_subscriber::EnvFilter;

use imgpair::batch::{run_batch, BatchOptions};
use imgpair::config::Config;
use imgpair::cost::PricePer1kTokens;
use imgpair::error::Error;
use imgpair::llm::ArkClient;

/// Compare paired images from two directories with a vision-language model.
///
/// Results are written as `<stem>.txt` into DIR_B.
#[derive(Parser)]
#[command(name = "imgpair")]
#[command(version, about)]
struct Cli {
    /// First image directory.
    #[arg(value_name = "DIR_A")]
    dir_a: PathBuf,

    /// Second image directory; analysis results are saved here too.
    #[arg(value_name = "DIR_B")]
    dir_b: PathBuf,

    /// Path to the configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Inference endpoint / model ID (overrides the configured one).
    #[arg(long)]
    model: Option<String>,

    /// Prompt sent to the model (overrides the configured one).
    #[arg(long)]
    prompt: Option<String>,

    /// Maximum concurrent API calls, 1-8 (overrides the configured value).
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Global preconditions: configuration and directories are checked once,
    // before any pair is dispatched.
    let config = Config::load(&cli.config)?;

    for dir in [&cli.dir_a, &cli.dir_b] {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.clone()).into());
        }
    }

    let model = cli
        .model
        .or_else(|| config.model_id.clone())
        .context("no model configured: pass --model or set model_id in config.json")?;

    let options = BatchOptions {
        model,
        prompt: cli.prompt.unwrap_or_else(|| config.prompt.clone()),
        max_workers: cli
            .workers
            .map(|w| w.clamp(1, imgpair::config::MAX_WORKERS_CAP))
            .unwrap_or(config.max_workers),
        rates: PricePer1kTokens {
            input: config.input_price_per_1k_tokens,
            output: config.output_price_per_1k_tokens,
        },
    };

    let client = Arc::new(ArkClient::new(config.base_url.clone(), config.api_key.clone()));
    let (progress, _summary) = run_batch(client, options, cli.dir_a, cli.dir_b);

    pin_mut!(progress);
    while let Some(line) = progress.next().await {
        println!("{line}");
    }

    Ok(())
}
