//! Job description types handed to a [`JobBackend`](crate::infrastructure::JobBackend)

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Backend {
    #[default]
    Local,
}

/// The program a job runs, plus fixed leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executable {
    pub exe: PathBuf,
    pub args: Vec<String>,
}

impl Executable {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            args: Vec::new(),
        }
    }
}

impl Default for Executable {
    /// `echo Hello World`
    fn default() -> Self {
        Self {
            exe: PathBuf::from("echo"),
            args: vec!["Hello World".to_string()],
        }
    }
}

/// One subjob per argument tuple; each tuple is appended to the executable's args
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSplitter {
    pub args: Vec<Vec<String>>,
}

/// Concatenates the named output files of all subjobs into the master job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMerger {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    pub backend: Backend,
    pub application: Executable,
    pub splitter: Option<ArgSplitter>,
    pub postprocessors: Vec<TextMerger>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, backend: Backend) -> Self {
        Self {
            name: name.into(),
            backend,
            application: Executable::default(),
            splitter: None,
            postprocessors: Vec::new(),
        }
    }

    pub fn with_application(mut self, application: Executable) -> Self {
        self.application = application;
        self
    }

    pub fn with_splitter(mut self, splitter: ArgSplitter) -> Self {
        self.splitter = Some(splitter);
        self
    }

    pub fn with_postprocessor(mut self, merger: TextMerger) -> Self {
        self.postprocessors.push(merger);
        self
    }

    pub fn subjob_count(&self) -> usize {
        self.splitter.as_ref().map_or(0, |s| s.args.len())
    }
}

/// A submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: u64,
    pub name: String,
    /// Master job output directory; merged files land here
    pub outputdir: PathBuf,
    pub subjob_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    New,
    Submitted,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Submitted => "submitted",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
