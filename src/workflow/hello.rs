//! Hello job - the smallest possible submission, useful to check a backend works

use anyhow::Result;
use tracing::info;

use crate::infrastructure::JobBackend;
use crate::models::{Backend, JobHandle, JobSpec};

/// Submit a job running the default executable (`echo Hello World`)
pub async fn execute_hello<B: JobBackend>(backend: &B) -> Result<JobHandle> {
    let job = backend.submit(JobSpec::new("hello", Backend::Local)).await?;

    info!(
        "To check the job's stdout, run: cat {}",
        job.outputdir.join("stdout").display()
    );

    Ok(job)
}
