//! Batch orchestrator: match pairs, fan out to a bounded worker pool, and
//! drain completions into output files and a streaming progress log.
//!
//! The run moves through Matching → Dispatching → Draining → Done. Workers
//! are tokio tasks gated by a semaphore sized `max_workers`, so at most that
//! many remote calls are in flight at once; completions are consumed over an
//! mpsc channel in whatever order they finish. The single drain loop owns the
//! running totals and all file writes, so nothing else mutates shared state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use tokio::sync::{mpsc, oneshot, Semaphore};

use crate::cost::PricePer1kTokens;
use crate::llm::VisionClient;
use crate::pairing::{match_pairs, ImagePair};
use crate::worker::{analyze_pair, PairAnalysis};

/// Options a run needs beyond the two directories.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub model: String,
    pub prompt: String,
    pub max_workers: usize,
    pub rates: PricePer1kTokens,
}

/// Final tally of a run, built incrementally by the drain loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub pairs_found: usize,
    pub pairs_succeeded: usize,
    pub total_cost: f64,
}

/// Orchestrator phase, logged on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Matching,
    Dispatching,
    Draining,
    Done,
}

fn enter(phase: Phase) {
    tracing::debug!(?phase, "batch phase transition");
}

/// Run the full batch and stream human-readable progress lines.
///
/// The returned stream is lazy: nothing is matched or dispatched until it is
/// polled. The [`RunSummary`] arrives on the paired receiver once the stream
/// has yielded its final line; the CLI only consumes the lines.
pub fn run_batch(
    client: Arc<dyn VisionClient>,
    options: BatchOptions,
    dir_a: PathBuf,
    dir_b: PathBuf,
) -> (impl Stream<Item = String>, oneshot::Receiver<RunSummary>) {
    let (summary_tx, summary_rx) = oneshot::channel();

    let progress = stream! {
        yield format!(
            "Starting batch analysis with up to {} workers",
            options.max_workers
        );
        yield format!("Using prompt: {}", options.prompt);

        enter(Phase::Matching);
        let pairs = match match_pairs(&dir_a, &dir_b) {
            Ok(pairs) => pairs,
            Err(e) => {
                yield format!("Error: {e}");
                let _ = summary_tx.send(RunSummary::default());
                return;
            }
        };

        if pairs.is_empty() {
            yield "No matching image pairs found.".to_string();
            enter(Phase::Done);
            let _ = summary_tx.send(RunSummary::default());
            return;
        }

        let mut summary = RunSummary {
            pairs_found: pairs.len(),
            ..RunSummary::default()
        };
        yield format!(
            "Found {} matching image pairs, dispatching analysis tasks (results arrive in completion order)...",
            pairs.len()
        );

        enter(Phase::Dispatching);
        let mut rx = dispatch(client, &options, pairs);

        enter(Phase::Draining);
        while let Some((stem, result)) = rx.recv().await {
            yield drain_completion(&dir_b, &stem, result, &mut summary);
        }

        enter(Phase::Done);
        yield "-".repeat(50);
        yield format!(
            "{} / {} pairs processed successfully",
            summary.pairs_succeeded, summary.pairs_found
        );
        yield format!("Total estimated cost: ¥{:.6}", summary.total_cost);
        let _ = summary_tx.send(summary);
    };

    (progress, summary_rx)
}

/// Spawn one worker task per pair and return the completion channel.
///
/// The semaphore is the sole concurrency control: a task acquires a permit
/// before reading files or calling the API, and excess tasks queue on it.
/// Submission order is the matcher's stem order; completion order is not.
fn dispatch(
    client: Arc<dyn VisionClient>,
    options: &BatchOptions,
    pairs: Vec<ImagePair>,
) -> mpsc::UnboundedReceiver<(String, crate::error::Result<PairAnalysis>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let semaphore = Arc::new(Semaphore::new(options.max_workers));

    for pair in pairs {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        let model = options.model.clone();
        let prompt = options.prompt.clone();
        let rates = options.rates;

        tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let result = analyze_pair(client, &pair, &model, &prompt, rates).await;
            let _ = tx.send((pair.stem, result));
        });
    }

    rx
}

/// Handle one completed worker: write the output file on success, fold the
/// outcome into the summary, and produce the progress line.
fn drain_completion(
    dir_b: &Path,
    stem: &str,
    result: crate::error::Result<PairAnalysis>,
    summary: &mut RunSummary,
) -> String {
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!(stem, error = %e, "pair failed");
            return format!("[{stem}] failed: {e}");
        }
    };

    let output_path = dir_b.join(format!("{stem}.txt"));
    let replacing = output_path.exists();

    if let Err(e) = std::fs::write(&output_path, &analysis.text) {
        // A failed write counts as a pair failure, same as a remote error.
        tracing::warn!(stem, error = %e, "output write failed");
        return format!(
            "[{stem}] failed: cannot write {}: {e}",
            output_path.display()
        );
    }

    summary.pairs_succeeded += 1;
    summary.total_cost += analysis.cost.total_cost;

    if replacing {
        format!(
            "[{stem}] analysis complete, replaced existing file: {stem}.txt | {}",
            analysis.cost_summary
        )
    } else {
        format!(
            "[{stem}] analysis complete, saved to new file: {stem}.txt | {}",
            analysis.cost_summary
        )
    }
}
