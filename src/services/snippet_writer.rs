//! Snippet file dispatch
//!
//! Extracts the three snippets from the generated text and writes the ones that
//! are present. Nothing is written unless both required snippets were found.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::{ContentLabel, Extraction};
use crate::services::snippet_extractor::ExtractionRequest;

pub const DEFAULT_PI_FILENAME: &str = "pi_estimation.py";
pub const GANGA_FILENAME: &str = "run_ganga_job.py";
pub const BASH_FILENAME: &str = "run_ganga.sh";

static FUNCTION_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"def\s+(\w+)\(").unwrap());

/// File name for the simulation code: first defined function, else the default
pub fn pi_filename(python_snippet: &str) -> String {
    FUNCTION_DEF
        .captures(python_snippet)
        .and_then(|caps| caps.get(1))
        .map(|name| format!("{}.py", name.as_str()))
        .unwrap_or_else(|| DEFAULT_PI_FILENAME.to_string())
}

/// Extract every snippet from `llm_output` and write them into `out_dir`
///
/// # Returns
/// `Ok(true)` when the job-submission snippet was written, `Ok(false)` when a
/// required snippet was missing (no file is written in that case).
pub fn write_code_snippet_to_file(llm_output: &str, out_dir: &Path) -> Result<bool> {
    let python = ExtractionRequest::for_label(ContentLabel::PiApproximation, llm_output).run();
    let ganga = ExtractionRequest::for_label(ContentLabel::GangaJob, llm_output).run();
    let bash = ExtractionRequest::for_label(ContentLabel::Bash, llm_output).run();

    if python == Extraction::AbsentRequired || ganga == Extraction::AbsentRequired {
        error!("❌ LLM failed to generate the code needed to run a Ganga job, nothing written");
        return Ok(false);
    }

    if let Some(snippet) = python.as_deref() {
        helper_write_to_file(&out_dir.join(pi_filename(snippet)), snippet, false)?;
    }
    if let Some(snippet) = ganga.as_deref() {
        helper_write_to_file(&out_dir.join(GANGA_FILENAME), snippet, false)?;
    }
    if let Some(snippet) = bash.as_deref() {
        helper_write_to_file(&out_dir.join(BASH_FILENAME), snippet, true)?;
    }

    Ok(ganga.is_present())
}

/// Write one snippet, left-trimmed
pub fn helper_write_to_file(path: &Path, snippet: &str, executable: bool) -> Result<PathBuf> {
    fs::write(path, snippet.trim_start()).map_err(|e| AppError::file_write_failed(path, e))?;

    if executable {
        set_executable(path)?;
    }

    info!("✓ Wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// chmod +x
#[cfg(unix)]
pub fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .map_err(|e| AppError::file_read_failed(path, e))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions).map_err(|e| AppError::file_write_failed(path, e))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
