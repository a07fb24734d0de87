//! Infrastructure layer
//!
//! Owns the job workspace and exposes only submit / status / remove.
//! Nothing here knows about word counts or PDFs.

pub mod local_backend;

pub use local_backend::LocalBackend;

use anyhow::Result;

use crate::models::{JobHandle, JobSpec, JobStatus};

/// A job orchestration collaborator
pub trait JobBackend {
    /// Create the job, start running it and return immediately
    async fn submit(&self, spec: JobSpec) -> Result<JobHandle>;

    /// Current status of a submitted job
    async fn status(&self, job: &JobHandle) -> Result<JobStatus>;

    /// Forget the job and delete its files
    async fn remove(&self, job: &JobHandle) -> Result<()>;
}
