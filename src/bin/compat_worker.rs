//! Compatibility worker host.
//!
//! Reads one JSON request per line from stdin and writes one JSON response per
//! line to stdout. Requests are evaluated concurrently on the worker pool, so
//! responses may come back in a different order than the requests; match
//! them by `id`. Logs go to stderr (`RUST_LOG`, default `info`).
//!
//! Usage:
//!   compat-worker --workers 4 --queue-size 256
//!
//! Environment variables:
//!   BLOCK_COMPAT_WORKERS - Number of worker tasks (default: one per core, at most 4)
//!   BLOCK_COMPAT_QUEUE_SIZE - Maximum queued requests (default: 256)

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use block_compat::runtime::handler::MessageHandler;
use block_compat::runtime::protocol::{Envelope, Response};
use block_compat::runtime::worker::CompatibilityWorker;
use block_compat::{CompatibilityEngine, RuleRegistry, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "compat-worker")]
#[command(about = "Block compatibility worker speaking JSON lines over stdio")]
#[command(version)]
struct Args {
    /// Number of worker tasks
    #[arg(
        long,
        env = "BLOCK_COMPAT_WORKERS",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    workers: Option<usize>,

    /// Maximum queued requests before stdin reading waits
    #[arg(
        long,
        env = "BLOCK_COMPAT_QUEUE_SIZE",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    queue_size: Option<usize>,
}

impl Args {
    fn worker_config(&self) -> WorkerConfig {
        let mut config = WorkerConfig::default();
        if let Some(workers) = self.workers {
            config = config.with_worker_count(workers);
        }
        if let Some(size) = self.queue_size {
            config = config.with_max_queue_size(size);
        }
        config
    }
}

/// Hand one encoded response to the stdout writer. Returns `false` when the
/// writer has gone away.
async fn forward(out_tx: &mpsc::Sender<String>, out: String) -> bool {
    match out_tx.send(out).await {
        Ok(()) => true,
        Err(_) => {
            error!("stdout writer stopped; dropping response");
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry = RuleRegistry::with_defaults();
    registry
        .validate()
        .context("compiled-in rule table is incomplete")?;

    let config = args.worker_config();
    let handler = MessageHandler::new(CompatibilityEngine::new(registry));
    let worker = CompatibilityWorker::spawn(handler.clone(), config.clone());
    info!("block-compat {} ready", block_compat::VERSION);

    let (out_tx, mut out_rx) = mpsc::channel::<String>(config.max_queue_size);

    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(line) = out_rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if out_tx.is_closed() {
            error!("stdout writer stopped; no longer reading requests");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let worker = worker.clone();
        let handler = handler.clone();
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            let out = match serde_json::from_str::<Envelope>(&line) {
                Ok(envelope) => {
                    let id = envelope.id.clone();
                    let response = worker
                        .request_envelope(envelope)
                        .await
                        .unwrap_or_else(|e| Response::error(id, e.to_string()));
                    match serde_json::to_string(&response) {
                        Ok(out) => out,
                        Err(e) => {
                            error!("failed to encode response {}: {}", response.id, e);
                            return;
                        }
                    }
                }
                // Let the handler build the malformed-request error
                Err(_) => handler.handle_json(&line),
            };

            forward(&out_tx, out).await;
        });
    }

    drop(out_tx);
    writer.await.context("writer task failed")??;
    info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let args =
            Args::try_parse_from(["compat-worker", "--workers", "3", "--queue-size", "64"]).unwrap();
        let config = args.worker_config();
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.max_queue_size, 64);
    }

    #[test]
    fn test_missing_flags_use_defaults() {
        let args = Args {
            workers: None,
            queue_size: None,
        };
        assert_eq!(args.worker_config(), WorkerConfig::default());
    }

    #[test]
    fn test_zero_and_garbage_are_rejected() {
        assert!(Args::try_parse_from(["compat-worker", "--workers", "0"]).is_err());
        assert!(Args::try_parse_from(["compat-worker", "--queue-size", "0"]).is_err());
        assert!(Args::try_parse_from(["compat-worker", "--workers", "lots"]).is_err());
    }

    #[tokio::test]
    async fn test_forward_reports_closed_writer() {
        let (out_tx, mut out_rx) = mpsc::channel::<String>(1);
        assert!(forward(&out_tx, "{}".into()).await);
        assert_eq!(out_rx.recv().await.as_deref(), Some("{}"));

        drop(out_rx);
        assert!(!forward(&out_tx, "{}".into()).await);
        assert!(out_tx.is_closed());
    }
}
