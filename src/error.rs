use std::path::PathBuf;

use thiserror::Error;

/// Application error type
///
/// Library functions return `anyhow::Result` and raise these variants where the
/// caller (usually `main`) needs to tell failure categories apart.
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM service errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    /// Job submission / execution errors
    #[error("job error: {0}")]
    Job(#[from] JobError),
    /// PDF read/write errors
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),
    /// File operation errors
    #[error("file error: {0}")]
    File(#[from] FileError),
    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// LLM service errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API call failed (model: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    #[error("LLM returned no choices (model: {model})")]
    EmptyResponse { model: String },
    #[error("LLM returned empty content (model: {model})")]
    EmptyContent { model: String },
}

/// Job backend errors
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to launch '{exe}' for job {job_id}: {source}")]
    LaunchFailed {
        job_id: u64,
        exe: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown job id {0}")]
    UnknownJob(u64),
    #[error("job {job_id} has no merged output at {}", .path.display())]
    MissingOutput { job_id: u64, path: PathBuf },
}

/// PDF errors
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load PDF {}: {source}", .path.display())]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("page index {index} out of range, document has {page_count} pages")]
    PageOutOfRange { index: usize, page_count: usize },
    #[error("failed to extract text from page {page}: {source}")]
    TextExtractionFailed {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
    #[error("failed to write page {page} to {}: {message}", .path.display())]
    WriteFailed {
        page: u32,
        path: PathBuf,
        message: String,
    },
}

/// File operation errors
#[derive(Debug, Error)]
pub enum FileError {
    #[error("the file '{}' does not exist; store the file in the current directory and rerun the job", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file {}: {message}", .path.display())]
    TomlParseFailed { path: PathBuf, message: String },
    #[error("environment variable {var_name} has value '{value}' that is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== convenience constructors ==========

impl AppError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        AppError::File(FileError::NotFound { path: path.into() })
    }

    pub fn file_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    pub fn file_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    pub fn llm_api_failed(model: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_path() {
        let err = AppError::file_not_found("/tmp/LHC.pdf");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/LHC.pdf"));
        assert!(msg.starts_with("file error:"));
    }

    #[test]
    fn test_anyhow_downcast_keeps_category() {
        let err: anyhow::Error = AppError::from(PdfError::PageOutOfRange {
            index: 40,
            page_count: 29,
        })
        .into();
        match err.downcast_ref::<AppError>() {
            Some(AppError::Pdf(PdfError::PageOutOfRange { index, page_count })) => {
                assert_eq!((*index, *page_count), (40, 29));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
