//! Initial task - wrap a task in a shell script and run it as a job
//!
//! Flow:
//! 1. write the executable wrapper script
//! 2. submit it (word counting is split into one subjob per PDF page, with the
//!    subjob stdouts merged)
//! 3. wait; for word counting, sum the merged output into `<job name>.txt`
//! 4. delete the wrapper

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::JobBackend;
use crate::models::{ArgSplitter, Backend, Executable, JobHandle, JobSpec, TextMerger};
use crate::services::pdf_service::{PdfDocument, EXTRACTED_PAGES_DIR};
use crate::services::snippet_writer::set_executable;
use crate::utils::logging::log_job_submitted;
use crate::workflow::job_poller::{store_word_count, wait_for_completion};

pub const WORD_COUNTING_SCRIPT: &str = "count_it";
pub const SPLIT_PDF_SCRIPT: &str = "split_pdf";

/// What the wrapper script runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// `count-it` subcommand, split per page
    CountIt,
    /// `split-pdf` subcommand
    SplitPdf,
    /// Any other executable, called with `<data dir> <pdf>`
    Script(PathBuf),
}

impl TaskKind {
    /// Classify by the script's base name; `count_it.py` and `count_it` both work
    pub fn from_script(script: &str) -> Self {
        let path = Path::new(script);
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(WORD_COUNTING_SCRIPT) => TaskKind::CountIt,
            Some(SPLIT_PDF_SCRIPT) => TaskKind::SplitPdf,
            _ => TaskKind::Script(path.to_path_buf()),
        }
    }

    pub fn job_name(&self) -> String {
        match self {
            TaskKind::CountIt => WORD_COUNTING_SCRIPT.to_string(),
            TaskKind::SplitPdf => SPLIT_PDF_SCRIPT.to_string(),
            TaskKind::Script(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "job".to_string()),
        }
    }
}

/// Outcome of one initial-task run
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub job: JobHandle,
    /// Total word count; `None` for other tasks or when the job timed out
    pub word_count: Option<i64>,
    pub completed: bool,
}

/// Body of the wrapper script
///
/// `program` is the `ganga-genai` binary for the built-in tasks.
pub fn wrapper_script_content(kind: &TaskKind, program: &Path, data_dir: &Path, pdf_file: &str) -> String {
    let command = match kind {
        TaskKind::CountIt => format!(
            "\"{}\" count-it \"$1\" \"$2\" \"$3\" \"{}\"",
            program.display(),
            pdf_file
        ),
        TaskKind::SplitPdf => format!(
            "\"{}\" split-pdf \"{}\" \"{}\"",
            program.display(),
            data_dir.display(),
            pdf_file
        ),
        TaskKind::Script(script) => format!(
            "\"{}\" \"{}\" \"{}\"",
            script.display(),
            data_dir.display(),
            pdf_file
        ),
    };

    format!("#!/bin/bash\n{}\n", command)
}

/// Make a user script path absolute; `NotFound` when it does not exist
pub fn resolve_script(kind: TaskKind) -> Result<TaskKind> {
    match kind {
        TaskKind::Script(path) => {
            let absolute =
                fs::canonicalize(&path).map_err(|_| AppError::file_not_found(&path))?;
            Ok(TaskKind::Script(absolute))
        }
        other => Ok(other),
    }
}

/// Write the executable wrapper script configured in `config.wrapper_script`
pub fn create_call_script(
    kind: &TaskKind,
    program: &Path,
    data_dir: &Path,
    config: &Config,
) -> Result<PathBuf> {
    let wrapper = config.wrapper_script.clone();
    let content = wrapper_script_content(kind, program, data_dir, &config.pdf_file);

    fs::write(&wrapper, content).map_err(|e| AppError::file_write_failed(&wrapper, e))?;
    set_executable(&wrapper)?;

    info!("✓ Wrapper script written: {}", wrapper.display());
    Ok(wrapper)
}

/// Fail with a `NotFound` error unless `filepath` exists
pub fn check_file_existence(filepath: &Path) -> Result<()> {
    if !filepath.exists() {
        return Err(AppError::file_not_found(filepath).into());
    }
    Ok(())
}

/// Splitter arguments for word counting: `[data_dir, page_index, word]` per page
pub fn word_count_splitter_args(data_dir: &Path, page_count: usize, word: &str) -> Vec<Vec<String>> {
    (0..page_count)
        .map(|page| {
            vec![
                data_dir.display().to_string(),
                page.to_string(),
                word.to_string(),
            ]
        })
        .collect()
}

/// Submit the wrapper as a job
pub async fn submit_job<B: JobBackend>(
    backend: &B,
    kind: &TaskKind,
    wrapper: &Path,
    data_dir: &Path,
    config: &Config,
) -> Result<JobHandle> {
    let mut spec = JobSpec::new(kind.job_name(), Backend::Local)
        .with_application(Executable::new(wrapper));

    if *kind == TaskKind::CountIt {
        let input_pdf = data_dir.join(&config.pdf_file);
        check_file_existence(&input_pdf)?;

        let number_of_pages = PdfDocument::open(&input_pdf)?.page_count();
        let args = word_count_splitter_args(data_dir, number_of_pages, &config.target_word);

        spec = spec
            .with_splitter(ArgSplitter { args })
            .with_postprocessor(TextMerger {
                files: vec!["stdout".to_string()],
            });
    }

    let job = backend.submit(spec).await?;
    log_job_submitted(job.id, &job.name, job.subjob_count);

    Ok(job)
}

/// Run the whole initial task for `script`
///
/// # Parameters
/// - `program`: path of the `ganga-genai` binary the wrapper calls back into
pub async fn execute_initial_task<B: JobBackend>(
    backend: &B,
    script: &str,
    program: &Path,
    config: &Config,
) -> Result<TaskReport> {
    // subjobs run in their own directories, so every path must be absolute
    let kind = resolve_script(TaskKind::from_script(script))?;
    let data_dir = fs::canonicalize(&config.data_dir)
        .map_err(|_| AppError::file_not_found(&config.data_dir))?;

    let wrapper = create_call_script(&kind, program, &data_dir, config)?;
    let submitted = submit_job(backend, &kind, &wrapper, &data_dir, config).await;
    let report = match submitted {
        Ok(job) => finish_task(backend, &kind, job, &data_dir, config).await,
        Err(e) => Err(e),
    };

    remove_call_script(&wrapper);

    report
}

async fn finish_task<B: JobBackend>(
    backend: &B,
    kind: &TaskKind,
    job: JobHandle,
    data_dir: &Path,
    config: &Config,
) -> Result<TaskReport> {
    if *kind == TaskKind::CountIt {
        let word_count = store_word_count(backend, &job, data_dir, config)
            .await
            .context("word count aggregation failed")?;
        return Ok(TaskReport {
            completed: word_count.is_some(),
            job,
            word_count,
        });
    }

    let outcome =
        wait_for_completion(backend, &job, config.poll_timeout(), config.poll_interval()).await?;

    if *kind == TaskKind::SplitPdf && outcome.is_done() {
        info!(
            "Extracted pages from {} have been saved in the folder {}",
            config.pdf_file,
            data_dir.join(EXTRACTED_PAGES_DIR).display()
        );
    }
    info!(
        "For a detailed stdout, see {}",
        job.outputdir.join("stdout").display()
    );

    Ok(TaskReport {
        completed: outcome.is_done(),
        job,
        word_count: None,
    })
}

fn remove_call_script(wrapper: &Path) {
    match fs::remove_file(wrapper) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found", wrapper.display());
        }
        Err(e) => warn!("cannot remove {}: {}", wrapper.display(), e),
    }
}
