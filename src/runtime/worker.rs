//! In-process compatibility worker pool
//!
//! Evaluation runs off the caller's task: requests are queued on an mpsc
//! channel, picked up by a fixed set of worker tasks, and answered through a
//! per-request oneshot channel. Responses complete in whatever order the
//! workers finish; callers correlate by `id`. There is no cancellation:
//! dropping the reply receiver simply discards the response.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::core::{Block, ValidationVerdict};

use super::handler::MessageHandler;
use super::protocol::{BatchPayload, CheckPayload, Envelope, Request, Response, ResponseData};

/// Work item sent to the pool
enum Job {
    Typed(Request),
    Raw(Envelope),
}

struct PoolRequest {
    job: Job,
    response_tx: oneshot::Sender<Response>,
}

/// Handle to a running worker pool
///
/// Cloning the handle shares the same queue. The workers exit once every
/// handle has been dropped.
#[derive(Clone)]
pub struct CompatibilityWorker {
    request_tx: mpsc::Sender<PoolRequest>,
    worker_count: usize,
}

impl CompatibilityWorker {
    /// Spawn the worker tasks on the current tokio runtime
    pub fn spawn(handler: MessageHandler, config: WorkerConfig) -> Self {
        let worker_count = config.worker_count.max(1);
        let (request_tx, request_rx) = mpsc::channel::<PoolRequest>(config.max_queue_size.max(1));
        let request_rx = Arc::new(Mutex::new(request_rx));

        info!(
            "Starting compatibility worker pool with {} workers (queue size {})",
            worker_count, config.max_queue_size
        );

        for worker_id in 0..worker_count {
            let handler = handler.clone();
            let request_rx = Arc::clone(&request_rx);
            tokio::spawn(async move {
                worker_task(worker_id, handler, request_rx).await;
            });
        }

        Self {
            request_tx,
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Submit a typed request and wait for its response
    pub async fn request(&self, request: Request) -> Result<Response, WorkerError> {
        self.submit(Job::Typed(request)).await
    }

    /// Submit a raw envelope (payload decoded by the worker)
    pub async fn request_envelope(&self, envelope: Envelope) -> Result<Response, WorkerError> {
        self.submit(Job::Raw(envelope)).await
    }

    async fn submit(&self, job: Job) -> Result<Response, WorkerError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(PoolRequest { job, response_tx })
            .await
            .map_err(|_| WorkerError::Closed)?;

        response_rx.await.map_err(|_| WorkerError::Dropped)
    }
}

async fn worker_task(
    worker_id: usize,
    handler: MessageHandler,
    request_rx: Arc<Mutex<mpsc::Receiver<PoolRequest>>>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        let request = {
            let mut rx = request_rx.lock().await;
            match rx.recv().await {
                Some(r) => r,
                None => {
                    info!("Worker {} shutting down (channel closed)", worker_id);
                    return;
                }
            }
        };

        let response = match &request.job {
            Job::Typed(req) => handler.handle(req),
            Job::Raw(envelope) => handler.handle_envelope(envelope),
        };

        debug!("Worker {} answered request {}", worker_id, response.id);

        // Receiver gone means the caller no longer wants the answer
        let _ = request.response_tx.send(response);
    }
}

/// Asynchronous compatibility checks
#[async_trait]
pub trait CompatibilityService: Send + Sync {
    /// Check one block
    async fn check(
        &self,
        block: Block,
        context: &str,
        existing_blocks: Vec<Block>,
    ) -> Result<ValidationVerdict, WorkerError>;

    /// Check several blocks against one shared snapshot
    async fn check_batch(
        &self,
        blocks: Vec<Block>,
        context: &str,
        existing_blocks: Vec<Block>,
    ) -> Result<Vec<ValidationVerdict>, WorkerError>;
}

#[async_trait]
impl CompatibilityService for CompatibilityWorker {
    async fn check(
        &self,
        block: Block,
        context: &str,
        existing_blocks: Vec<Block>,
    ) -> Result<ValidationVerdict, WorkerError> {
        let request = Request::check(
            next_request_id(),
            CheckPayload {
                block,
                context: Some(context.to_string()),
                existing_blocks,
            },
        );

        match self.request(request).await?.data {
            ResponseData::Verdict(verdict) => Ok(verdict),
            ResponseData::Error(body) => Err(WorkerError::Remote(body.error)),
            ResponseData::Batch(_) => Err(WorkerError::UnexpectedResponse),
        }
    }

    async fn check_batch(
        &self,
        blocks: Vec<Block>,
        context: &str,
        existing_blocks: Vec<Block>,
    ) -> Result<Vec<ValidationVerdict>, WorkerError> {
        let request = Request::batch(
            next_request_id(),
            BatchPayload {
                blocks,
                context: Some(context.to_string()),
                existing_blocks,
            },
        );

        match self.request(request).await?.data {
            ResponseData::Batch(verdicts) => Ok(verdicts),
            ResponseData::Error(body) => Err(WorkerError::Remote(body.error)),
            ResponseData::Verdict(_) => Err(WorkerError::UnexpectedResponse),
        }
    }
}

fn next_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Worker pool errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker pool closed")]
    Closed,

    #[error("Worker dropped the request without answering")]
    Dropped,

    #[error("Worker reported an error: {0}")]
    Remote(String),

    #[error("Worker answered with an unexpected response type")]
    UnexpectedResponse,
}
