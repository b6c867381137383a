use crate::tasks::pipeline::{PipelineOutcome, SentimentPipeline};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// A request to run the sentiment pipeline for one hotkey
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StakeJob {
    pub netuid: u16,
    pub hotkey: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum JobError {
    #[error("A job for netuid {0} / hotkey {1} is already queued or running")]
    AlreadyQueued(u16, String),

    #[error("Job queue is full")]
    QueueFull,

    #[error("Job queue is closed")]
    Closed,
}

struct Envelope {
    job: StakeJob,
    reply: oneshot::Sender<PipelineOutcome>,
}

type InFlight = Arc<Mutex<HashSet<StakeJob>>>;

/// Handle to a submitted job. Dropping it does not cancel the job.
#[derive(Debug)]
pub struct JobHandle {
    job: StakeJob,
    receiver: oneshot::Receiver<PipelineOutcome>,
}

impl JobHandle {
    pub fn job(&self) -> &StakeJob {
        &self.job
    }

    /// Wait for the job to finish. `None` if the worker went away first.
    pub async fn outcome(self) -> Option<PipelineOutcome> {
        self.receiver.await.ok()
    }
}

/// Submission side of the worker pool, cheap to clone
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<Envelope>,
    in_flight: InFlight,
}

impl JobQueue {
    pub async fn submit(&self, netuid: u16, hotkey: &str) -> Result<JobHandle, JobError> {
        let job = StakeJob {
            netuid,
            hotkey: hotkey.to_string(),
        };

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.contains(&job) {
            return Err(JobError::AlreadyQueued(netuid, job.hotkey));
        }

        let (reply, receiver) = oneshot::channel();
        let envelope = Envelope {
            job: job.clone(),
            reply,
        };

        match self.sender.try_send(envelope) {
            Ok(()) => {
                in_flight.insert(job.clone());
                debug!("Queued stake job for netuid={}, hotkey={}", job.netuid, job.hotkey);
                Ok(JobHandle { job, receiver })
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(JobError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(JobError::Closed),
        }
    }
}

pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    queue: JobQueue,
    shutdown: CancellationToken,
}

struct WorkerHandle {
    id: usize,
    handle: JoinHandle<()>,
}

impl WorkerPool {
    pub fn new(pipeline: Arc<SentimentPipeline>, worker_count: usize, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let in_flight: InFlight = Arc::new(Mutex::new(HashSet::new()));
        let shutdown = CancellationToken::new();

        let worker_count = worker_count.max(1);
        let mut workers = Vec::with_capacity(worker_count);

        for id in 0..worker_count {
            let worker = Worker {
                id,
                pipeline: pipeline.clone(),
                receiver: receiver.clone(),
                in_flight: in_flight.clone(),
                shutdown: shutdown.clone(),
            };

            let handle = tokio::spawn(async move {
                worker.run().await;
            });

            workers.push(WorkerHandle { id, handle });
        }

        info!("Started {} stake workers", worker_count);

        Self {
            workers,
            queue: JobQueue { sender, in_flight },
            shutdown,
        }
    }

    pub fn queue(&self) -> JobQueue {
        self.queue.clone()
    }

    /// Stop taking jobs and wait for the workers. A job already running is
    /// finished first.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for worker in self.workers {
            if let Err(e) = worker.handle.await {
                error!("Worker {} panicked: {}", worker.id, e);
            }
        }
    }
}

struct Worker {
    id: usize,
    pipeline: Arc<SentimentPipeline>,
    receiver: Arc<Mutex<mpsc::Receiver<Envelope>>>,
    in_flight: InFlight,
    shutdown: CancellationToken,
}

impl Worker {
    async fn run(&self) {
        info!("Worker {} started", self.id);

        loop {
            let envelope = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                next = async { self.receiver.lock().await.recv().await } => match next {
                    Some(envelope) => envelope,
                    None => {
                        info!("Worker {} channel closed, shutting down", self.id);
                        break;
                    }
                },
            };

            let Envelope { job, reply } = envelope;

            // Run on its own task so a panic fails the job, not the worker
            let pipeline = self.pipeline.clone();
            let (netuid, hotkey) = (job.netuid, job.hotkey.clone());
            let outcome = match tokio::spawn(async move { pipeline.run(netuid, &hotkey).await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Worker {}: job for netuid={}, hotkey={} aborted: {}", self.id, job.netuid, job.hotkey, e);
                    PipelineOutcome::Failed { error: format!("job aborted: {}", e) }
                }
            };

            self.in_flight.lock().await.remove(&job);

            if reply.send(outcome).is_err() {
                debug!("Worker {}: nobody waiting on job for netuid={}", self.id, job.netuid);
            }
        }

        info!("Worker {} shutting down", self.id);
    }
}
