//! Async front for the synchronous dispatcher.
//!
//! Each [`DitherWorker`] owns a queue and one task that pulls jobs off it in
//! order, running every job on the blocking pool. A worker therefore has at
//! most one request in flight; [`WorkerPool`] spreads load over several.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use stipple_dither::{DitherError, Request, Response};
use tokio::sync::{mpsc, oneshot};

use crate::error::WorkerError;

/// Pending requests a worker accepts before `submit` waits.
const QUEUE_DEPTH: usize = 16;

struct Job {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Handle to one dispatcher worker. Dropping every handle stops the task.
#[derive(Clone)]
pub struct DitherWorker {
    id: usize,
    sender: mpsc::Sender<Job>,
}

impl DitherWorker {
    /// Start a worker task on the current tokio runtime.
    pub fn spawn(id: usize) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(Self::run(id, receiver));
        Self { id, sender }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Queue a request and wait for its response.
    pub async fn submit(&self, request: Request) -> Result<Response, WorkerError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Job { request, reply })
            .await
            .map_err(|_| WorkerError::Closed)?;
        response.await.map_err(|_| WorkerError::Dropped)
    }

    async fn run(id: usize, mut receiver: mpsc::Receiver<Job>) {
        tracing::debug!(worker = id, "Dither worker started");

        while let Some(Job { request, reply }) = receiver.recv().await {
            let kind = request.kind();
            let started = Instant::now();

            let response = match tokio::task::spawn_blocking(move || stipple_dither::handle(request)).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(worker = id, kind, %e, "Dither job aborted");
                    Response::Failed(DitherError::InternalFault(format!("job aborted: {e}")))
                }
            };

            tracing::debug!(
                worker = id,
                kind,
                failed = response.is_failure(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Dither job finished"
            );

            // The caller may have gone away; nothing to do then.
            let _ = reply.send(response);
        }

        tracing::debug!(worker = id, "Dither worker stopped");
    }
}

/// Fixed set of workers used round-robin.
pub struct WorkerPool {
    workers: Vec<DitherWorker>,
    next: AtomicUsize,
}

impl WorkerPool {
    /// Spawn `count` workers (at least one).
    pub fn new(count: usize) -> Self {
        let workers = (0..count.max(1)).map(DitherWorker::spawn).collect();
        Self {
            workers,
            next: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub async fn submit(&self, request: Request) -> Result<Response, WorkerError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[index].submit(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stipple_dither::{AdjustmentParams, Algorithm, AlgorithmParams, PixelBuffer};

    fn process(pixels: PixelBuffer) -> Request {
        Request::ProcessImage {
            pixels,
            algorithm: Algorithm::FloydSteinberg,
            params: AlgorithmParams::default(),
            adjustments: AdjustmentParams::default(),
        }
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let worker = DitherWorker::spawn(0);
        let pixels = PixelBuffer::filled(8, 8, [255, 255, 255, 255]).unwrap();

        match worker.submit(process(pixels.clone())).await.unwrap() {
            Response::Image { pixels: out, warnings } => {
                assert_eq!(out, pixels);
                assert!(warnings.is_empty());
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_worker_reports_failures_as_responses() {
        let worker = DitherWorker::spawn(0);
        let pixels = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
        let request = Request::ProcessImage {
            pixels,
            algorithm: Algorithm::Selective,
            params: AlgorithmParams::default(),
            adjustments: AdjustmentParams::default(),
        };

        let response = worker.submit(request).await.unwrap();
        assert!(matches!(
            response,
            Response::Failed(DitherError::UnsupportedAlgorithm(_))
        ));
    }

    #[tokio::test]
    async fn test_pool_round_robin() {
        let pool = WorkerPool::new(3);
        assert_eq!(pool.len(), 3);

        for _ in 0..6 {
            let pixels = PixelBuffer::filled(4, 4, [0, 0, 0, 255]).unwrap();
            assert!(!pool.submit(process(pixels)).await.unwrap().is_failure());
        }
        assert_eq!(pool.next.load(Ordering::Relaxed), 6);
    }

    #[tokio::test]
    async fn test_pool_never_empty() {
        assert_eq!(WorkerPool::new(0).len(), 1);
    }
}
