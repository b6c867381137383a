pub mod pipeline;
pub mod worker_pool;

pub use pipeline::{PipelineOutcome, PipelineSettings, SentimentPipeline};
pub use worker_pool::{JobError, JobHandle, JobQueue, StakeJob, WorkerPool};
