//! Command line surface
//!
//! One subcommand per task. `count-it` and `split-pdf` are also what the job
//! wrapper scripts call back into, so they print nothing but their result on
//! stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::LocalBackend;
use crate::services::{count_word, split_pdf, LlmService};
use crate::utils::logging;
use crate::workflow::initial_task::check_file_existence;
use crate::workflow::{execute_hello, execute_initial_task, run_ganga_llm, wait_for_completion};

#[derive(Debug, Parser)]
#[command(name = "ganga-genai", version, about = "LLM code generation and PDF word counting on Ganga-style jobs")]
pub struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(long, global = true, env = "GANGA_GENAI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Count a word on one page (0-based) of a PDF and print the count
    CountIt {
        current_dir: PathBuf,
        page_num: usize,
        word: String,
        pdf_file: String,
    },
    /// Split a PDF into single pages under <current_dir>/extracted_pages
    SplitPdf { current_dir: PathBuf, pdf_file: String },
    /// Wrap a task in a script, run it as a job and collect the result
    InitialTask {
        /// count_it, split_pdf, or a path to an executable
        script: String,
    },
    /// Ask the model for pi estimation and Ganga job code
    Generate {
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Submit a hello-world job
    Hello,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_toml_file(path),
            None => Config::from_env(),
        }
    }
}

/// Execute the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    logging::init(cli.verbose || config.verbose_logging);

    match cli.command {
        Command::CountIt {
            current_dir,
            page_num,
            word,
            pdf_file,
        } => {
            let input_pdf = current_dir.join(pdf_file);
            check_file_existence(&input_pdf)?;
            let count = count_word(&input_pdf, page_num, &word)?;
            println!("{}", count);
        }
        Command::SplitPdf {
            current_dir,
            pdf_file,
        } => {
            let input_pdf = current_dir.join(pdf_file);
            check_file_existence(&input_pdf)?;
            split_pdf(&input_pdf, &current_dir)?;
        }
        Command::InitialTask { script } => {
            logging::log_startup("initial-task");
            let backend = LocalBackend::new(&config.jobs_dir)?;
            let program = std::env::current_exe().context("cannot locate own executable")?;

            let report = execute_initial_task(&backend, &script, &program, &config).await?;
            if !report.completed {
                warn!(
                    "Job {} did not finish in time; check {} and resubmit",
                    report.job.id,
                    report.job.outputdir.display()
                );
            }
        }
        Command::Generate { prompt } => {
            logging::log_startup("generate");
            if prompt.is_some() {
                config.prompt = prompt;
            }
            let llm = LlmService::new(&config);
            if !run_ganga_llm(&llm, &config).await? {
                anyhow::bail!("LLM failed to generate code to run a Ganga job");
            }
        }
        Command::Hello => {
            logging::log_startup("hello");
            let backend = LocalBackend::new(&config.jobs_dir)?;
            let job = execute_hello(&backend).await?;
            let outcome =
                wait_for_completion(&backend, &job, config.poll_timeout(), config.poll_interval())
                    .await?;
            if outcome.is_done() {
                let stdout = tokio::fs::read_to_string(job.outputdir.join("stdout")).await?;
                info!("Job {} says: {}", job.id, stdout.trim());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_it_positional_arguments() {
        let cli = Cli::try_parse_from(["ganga-genai", "count-it", "current_dir", "3", "word", "pdf_file"])
            .unwrap();
        match cli.command {
            Command::CountIt {
                current_dir,
                page_num,
                word,
                pdf_file,
            } => {
                assert_eq!(current_dir, PathBuf::from("current_dir"));
                assert_eq!(page_num, 3);
                assert_eq!(word, "word");
                assert_eq!(pdf_file, "pdf_file");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_argument_count_is_usage_error() {
        assert!(Cli::try_parse_from(["ganga-genai", "count-it", "dir", "3", "word"]).is_err());
        assert!(Cli::try_parse_from(["ganga-genai", "split-pdf", "dir"]).is_err());
        assert!(Cli::try_parse_from(["ganga-genai", "split-pdf", "dir", "a.pdf", "extra"]).is_err());
    }

    #[test]
    fn test_split_pdf_arguments() {
        let cli = Cli::try_parse_from(["ganga-genai", "split-pdf", "current_dir", "pdf_file"]).unwrap();
        assert!(matches!(cli.command, Command::SplitPdf { .. }));
    }
}
