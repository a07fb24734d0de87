//! Poll-and-aggregate
//!
//! Blocks the calling task until a job reports `completed` or the timeout
//! elapses, then turns the merged output into a single result file.
//!
//! ```text
//! Polling --(completed)--------------------------> Done
//! Polling --(elapsed > timeout, not completed)---> TimedOut
//! Polling --(elapsed > timeout, completed)-------> Done
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, JobError};
use crate::infrastructure::JobBackend;
use crate::models::{JobHandle, JobStatus};
use crate::services::aggregator::{count_frequency, write_result};
use crate::utils::logging::log_final_result;

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Done { elapsed: Duration },
    TimedOut { elapsed: Duration },
}

impl PollOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, PollOutcome::Done { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Done { elapsed } | PollOutcome::TimedOut { elapsed } => *elapsed,
        }
    }
}

/// State of one blocking wait
#[derive(Debug)]
pub struct PollState {
    start: Instant,
    timeout: Duration,
    last_status: Option<JobStatus>,
}

impl PollState {
    pub fn new(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
            last_status: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn timed_out(&self) -> bool {
        self.elapsed() > self.timeout
    }

    /// Record a status; true when it differs from the previous one
    pub fn observe(&mut self, status: JobStatus) -> bool {
        let changed = self.last_status != Some(status);
        self.last_status = Some(status);
        changed
    }

    pub fn last_status(&self) -> Option<JobStatus> {
        self.last_status
    }
}

/// Check `job` every `interval` until it completes or `timeout` elapses
///
/// A timeout is not an error: the caller gets [`PollOutcome::TimedOut`] and
/// decides whether to resubmit.
pub async fn wait_for_completion<B: JobBackend>(
    backend: &B,
    job: &JobHandle,
    timeout: Duration,
    interval: Duration,
) -> Result<PollOutcome> {
    info!(
        "⏳ Waiting for job {} to finish. Maximum wait time: {}s",
        job.id,
        timeout.as_secs()
    );

    let mut state = PollState::new(timeout);

    loop {
        let status = backend.status(job).await?;
        if state.observe(status) {
            debug!("job {} is {} after {:?}", job.id, status, state.elapsed());
        }

        if status == JobStatus::Completed {
            return Ok(PollOutcome::Done {
                elapsed: state.elapsed(),
            });
        }

        if state.timed_out() {
            // the job may have finished since the last check
            if backend.status(job).await? == JobStatus::Completed {
                return Ok(PollOutcome::Done {
                    elapsed: state.elapsed(),
                });
            }
            warn!(
                "Timeout reached. Job {} didn't finish (last status: {})",
                job.id, status
            );
            return Ok(PollOutcome::TimedOut {
                elapsed: state.elapsed(),
            });
        }

        sleep(interval).await;
    }
}

/// Wait for a word-count job and store the total in `<result_dir>/<job name>.txt`
///
/// # Returns
/// The total, or `None` when the job did not finish in time (nothing is written)
pub async fn store_word_count<B: JobBackend>(
    backend: &B,
    job: &JobHandle,
    result_dir: &Path,
    config: &Config,
) -> Result<Option<i64>> {
    let outcome =
        wait_for_completion(backend, job, config.poll_timeout(), config.poll_interval()).await?;

    if !outcome.is_done() {
        warn!("Job {} didn't finish, no word count stored", job.id);
        return Ok(None);
    }

    let merged_output = job.outputdir.join("stdout");
    if !merged_output.exists() {
        return Err(AppError::from(JobError::MissingOutput {
            job_id: job.id,
            path: merged_output,
        })
        .into());
    }

    let word_count = count_frequency(&merged_output)?;
    let result_file = write_result(result_dir, &job.name, word_count)?;

    log_final_result(&config.target_word, word_count, &result_file, &merged_output);

    Ok(Some(word_count))
}
