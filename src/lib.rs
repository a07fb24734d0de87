//! # ganga-genai
//!
//! Automation around Ganga-style jobs: ask a code model for a Monte Carlo pi
//! estimation and the job that runs it, and count words across PDF pages with a
//! split job.
//!
//! ## Layers
//!
//! ### ① Infrastructure
//! - `infrastructure/` - owns the job workspace, exposes submit / status / remove
//! - `LocalBackend` - runs jobs as local processes
//!
//! ### ② Services
//! - `services/` - single-purpose capabilities
//! - `snippet_extractor` - pulls code blocks out of generated text
//! - `LlmService` - one inference call
//! - `PdfDocument`, `word_counter`, `aggregator`
//!
//! ### ③ Workflow
//! - `workflow/` - end-to-end flows built from the services
//! - `code_generation` - prompt → output → snippet files
//! - `initial_task` - wrapper script → job → poll → result file
//!
//! ### ④ Entry
//! - `cli` - subcommands, config loading, logging setup

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use error::AppError;
pub use infrastructure::{JobBackend, LocalBackend};
pub use models::{ContentLabel, Extraction, JobHandle, JobSpec, JobStatus};
pub use services::snippet_extractor::extract_code_snippet;
pub use workflow::{execute_initial_task, run_ganga_llm, PollOutcome};
