//! Local job backend
//!
//! Runs a job's executable on this machine, once per splitter argument tuple,
//! and concatenates the subjob outputs for each `TextMerger`.
//!
//! Workspace layout under `jobs_dir`:
//!
//! ```text
//! <id>/job.json          spec + status
//! <id>/input/<exe>       sandboxed copy of a file executable
//! <id>/output/           master output (merged files, or the single run)
//! <id>/<n>/output/       stdout / stderr of subjob n
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, JobError};
use crate::infrastructure::JobBackend;
use crate::models::{JobHandle, JobSpec, JobStatus, TextMerger};

type Registry = Arc<Mutex<HashMap<u64, JobStatus>>>;

/// Local process backend
///
/// The only owner of the jobs workspace.
pub struct LocalBackend {
    jobs_dir: PathBuf,
    registry: Registry,
    next_id: AtomicU64,
}

/// One process launch: a subjob, or the whole job when unsplit
#[derive(Debug, Clone)]
struct RunUnit {
    index: Option<usize>,
    args: Vec<String>,
    output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct JobRecord<'a> {
    id: u64,
    status: JobStatus,
    subjobs: usize,
    spec: &'a JobSpec,
}

impl LocalBackend {
    /// Open (or create) a jobs workspace
    ///
    /// New ids continue after the highest existing job directory.
    pub fn new(jobs_dir: impl AsRef<Path>) -> Result<Self> {
        let jobs_dir = jobs_dir.as_ref();
        std::fs::create_dir_all(jobs_dir)
            .map_err(|e| AppError::file_write_failed(jobs_dir, e))?;
        let jobs_dir = std::fs::canonicalize(jobs_dir)
            .map_err(|e| AppError::file_read_failed(jobs_dir, e))?;

        let next_id = std::fs::read_dir(&jobs_dir)
            .map_err(|e| AppError::file_read_failed(&jobs_dir, e))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u64>().ok())
            .max()
            .map_or(0, |id| id + 1);

        debug!(
            "local backend at {} (next job id {})",
            jobs_dir.display(),
            next_id
        );

        Ok(Self {
            jobs_dir,
            registry: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(next_id),
        })
    }

    pub fn jobs_dir(&self) -> &Path {
        &self.jobs_dir
    }

    pub fn job_dir(&self, id: u64) -> PathBuf {
        self.jobs_dir.join(id.to_string())
    }
}

impl JobBackend for LocalBackend {
    async fn submit(&self, spec: JobSpec) -> Result<JobHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let job_dir = self.job_dir(id);
        let input_dir = job_dir.join("input");
        let output_dir = job_dir.join("output");

        for dir in [&input_dir, &output_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::file_write_failed(dir, e))?;
        }

        let exe = sandbox_executable(&spec.application.exe, &input_dir)
            .await
            .with_context(|| format!("cannot prepare executable for job {}", id))?;

        let units = build_run_units(&spec, &job_dir, &output_dir);
        for unit in &units {
            fs::create_dir_all(&unit.output_dir)
                .await
                .map_err(|e| AppError::file_write_failed(&unit.output_dir, e))?;
        }

        let handle = JobHandle {
            id,
            name: spec.name.clone(),
            outputdir: output_dir,
            subjob_count: spec.subjob_count(),
        };

        write_job_record(&job_dir, id, JobStatus::Submitted, &spec).await?;
        self.registry.lock().await.insert(id, JobStatus::Submitted);

        info!(
            "Job {} ({}) submitted to Local backend, {} run(s)",
            id,
            spec.name,
            units.len()
        );

        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            let status = run_job(id, &exe, &units, &spec, &job_dir, &registry).await;
            set_status(&registry, id, status).await;
            if let Err(e) = write_job_record(&job_dir, id, status, &spec).await {
                warn!("job {}: cannot update job.json: {}", id, e);
            }
            info!("Job {} ({}) {}", id, spec.name, status);
        });

        Ok(handle)
    }

    async fn status(&self, job: &JobHandle) -> Result<JobStatus> {
        let registry = self.registry.lock().await;
        let status = registry
            .get(&job.id)
            .copied()
            .ok_or_else(|| AppError::from(JobError::UnknownJob(job.id)))?;
        Ok(status)
    }

    async fn remove(&self, job: &JobHandle) -> Result<()> {
        self.registry.lock().await.remove(&job.id);

        let job_dir = self.job_dir(job.id);
        if fs::try_exists(&job_dir).await.unwrap_or(false) {
            fs::remove_dir_all(&job_dir)
                .await
                .with_context(|| format!("cannot delete {}", job_dir.display()))?;
        }

        info!("Job {} removed", job.id);
        Ok(())
    }
}

/// Copy a file executable into the job's input sandbox
///
/// Anything that is not an existing file (e.g. `echo`) is left to `PATH` lookup.
async fn sandbox_executable(exe: &Path, input_dir: &Path) -> Result<PathBuf> {
    let is_file = fs::metadata(exe).await.map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Ok(exe.to_path_buf());
    }

    let file_name = exe
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "exe".into());
    let sandboxed = input_dir.join(file_name);

    // std::fs::copy keeps the permission bits, so the executable bit survives
    fs::copy(exe, &sandboxed)
        .await
        .map_err(|e| AppError::file_write_failed(&sandboxed, e))?;

    Ok(sandboxed)
}

fn build_run_units(spec: &JobSpec, job_dir: &Path, output_dir: &Path) -> Vec<RunUnit> {
    match &spec.splitter {
        Some(splitter) => splitter
            .args
            .iter()
            .enumerate()
            .map(|(index, extra)| RunUnit {
                index: Some(index),
                args: spec
                    .application
                    .args
                    .iter()
                    .chain(extra.iter())
                    .cloned()
                    .collect(),
                output_dir: job_dir.join(index.to_string()).join("output"),
            })
            .collect(),
        None => vec![RunUnit {
            index: None,
            args: spec.application.args.clone(),
            output_dir: output_dir.to_path_buf(),
        }],
    }
}

/// Run all units in order, then merge; returns the final status
async fn run_job(
    id: u64,
    exe: &Path,
    units: &[RunUnit],
    spec: &JobSpec,
    job_dir: &Path,
    registry: &Registry,
) -> JobStatus {
    set_status(registry, id, JobStatus::Running).await;

    let mut all_ok = true;
    for unit in units {
        match run_unit(id, exe, unit).await {
            Ok(true) => {}
            Ok(false) => all_ok = false,
            Err(e) => {
                error!("job {}: {:#}", id, e);
                all_ok = false;
            }
        }
    }

    if spec.splitter.is_some() {
        for merger in &spec.postprocessors {
            if let Err(e) = merge_text(merger, units, &job_dir.join("output")).await {
                error!("job {}: merge failed: {:#}", id, e);
                all_ok = false;
            }
        }
    }

    if all_ok {
        JobStatus::Completed
    } else {
        JobStatus::Failed
    }
}

async fn run_unit(id: u64, exe: &Path, unit: &RunUnit) -> Result<bool> {
    let stdout_path = unit.output_dir.join("stdout");
    let stderr_path = unit.output_dir.join("stderr");
    let stdout = std::fs::File::create(&stdout_path)
        .map_err(|e| AppError::file_write_failed(&stdout_path, e))?;
    let stderr = std::fs::File::create(&stderr_path)
        .map_err(|e| AppError::file_write_failed(&stderr_path, e))?;

    let status = Command::new(exe)
        .args(&unit.args)
        .current_dir(&unit.output_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .status()
        .await
        .map_err(|source| {
            AppError::from(JobError::LaunchFailed {
                job_id: id,
                exe: exe.display().to_string(),
                source,
            })
        })?;

    let label = unit
        .index
        .map_or_else(|| format!("job {}", id), |n| format!("job {}.{}", id, n));
    if status.success() {
        debug!("{} finished", label);
    } else {
        warn!("{} exited with {}", label, status);
    }

    Ok(status.success())
}

/// Concatenate each merged file over all subjobs into `output_dir`
async fn merge_text(merger: &TextMerger, units: &[RunUnit], output_dir: &Path) -> Result<()> {
    for file in &merger.files {
        let mut merged = String::new();

        for unit in units {
            let part = unit.output_dir.join(file);
            merged.push_str(&format!("# Merged from {}\n", part.display()));
            match fs::read_to_string(&part).await {
                Ok(content) => {
                    merged.push_str(&content);
                    if !content.is_empty() && !content.ends_with('\n') {
                        merged.push('\n');
                    }
                }
                Err(e) => {
                    merged.push_str(&format!("# Missing: {}\n", e));
                }
            }
        }

        let target = output_dir.join(file);
        fs::write(&target, merged)
            .await
            .map_err(|e| AppError::file_write_failed(&target, e))?;
        debug!("merged {} subjob '{}' files into {}", units.len(), file, target.display());
    }

    Ok(())
}

async fn set_status(registry: &Registry, id: u64, status: JobStatus) {
    // a removed job stays removed
    if let Some(entry) = registry.lock().await.get_mut(&id) {
        *entry = status;
    }
}

async fn write_job_record(job_dir: &Path, id: u64, status: JobStatus, spec: &JobSpec) -> Result<()> {
    let record = JobRecord {
        id,
        status,
        subjobs: spec.subjob_count(),
        spec,
    };
    let path = job_dir.join("job.json");
    let json = serde_json::to_string_pretty(&record)?;
    fs::write(&path, json)
        .await
        .map_err(|e| AppError::file_write_failed(&path, e))?;
    Ok(())
}
