pub mod job;
pub mod snippet;

pub use job::{ArgSplitter, Backend, Executable, JobHandle, JobSpec, JobStatus, TextMerger};
pub use snippet::{ContentLabel, Extraction};
