//! Code generation - prompt the model, keep the raw output, write the snippets

use anyhow::Result;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::services::llm_service::{store_llm_output, TextGenerator};
use crate::services::snippet_writer::write_code_snippet_to_file;
use crate::utils::truncate_text;

/// Prompt asking for the pi estimation, the bash wrapper and the Ganga job
pub const DEFAULT_PROMPT: &str = "I want to use Ganga to calculate an approximation to the number \
pi using an accept-reject simulation method with one million simulations. I would like to \
perform this calculation through a Ganga job. The job should be split into a number of subjobs \
that each do thousand simulations. The code should be written in Python. \
Here are some instructions that you can follow. \
1. Write code to calculate the approximation of pi using the above-mentioned method. \
2. Write a bash script that will execute the code above. \
3. Run a ganga job using local backend: j = Job(name=job_name, backend=Local()) \
4. Run the Bash script as an Executable application: \
j.application = Executable() \
j.application.exe = File(the_script_to_run) \
5. Use ArgSplitter to split the job: j.splitter = ArgSplitter(args=splitter_args) \
It should split the job into a number of subjobs that each do thousand simulations. \
6. Merge output from the splitter using TextMerger: \
j.postprocessors.append(TextMerger(files=['stdout'])) \
7. Run the ganga job: j.submit() \
Label the code blocks 'python code snippet #1:', 'python code snippet #2:' and 'bash code snippet:'. \
Do not give me code as IPython or Jupyter prompts. Give me the python script.";

/// Run one generation and write the snippets found in it
///
/// # Returns
/// Whether the model produced usable job-submission code
pub async fn run_ganga_llm<G: TextGenerator>(generator: &G, config: &Config) -> Result<bool> {
    let prompt = config.prompt.as_deref().unwrap_or(DEFAULT_PROMPT);

    let output = generator.generate(prompt).await?;
    info!("LLM output: {}", truncate_text(&output, 200));
    debug!("full LLM output:\n{}", output);

    store_llm_output(&output, &config.llm_output_file).await?;

    let received_code_from_llm = write_code_snippet_to_file(&output, &config.output_dir)?;

    if received_code_from_llm {
        info!(
            "✅ Generated code written to {}",
            config.output_dir.display()
        );
    } else {
        error!(
            "❌ LLM failed to generate code, raw output kept in {}",
            config.llm_output_file.display()
        );
    }

    Ok(received_code_from_llm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::snippet_writer::{BASH_FILENAME, GANGA_FILENAME};
    use std::sync::Mutex;

    struct CannedGenerator {
        response: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.response.clone())
        }
    }

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            output_dir: dir.to_path_buf(),
            llm_output_file: dir.join("llm_output.txt"),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_marked_output_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let response = "python code snippet #1:\ndef pi_estimate(n):\n    return 3.14\n\
\npython code snippet #2:\nfrom ganga import Job\nJob().submit()\n\
\nbash code snippet:\n#!/bin/bash\npython3 pi_estimate.py\n";
        let generator = CannedGenerator::new(response);

        assert!(run_ganga_llm(&generator, &config).await.unwrap());

        assert!(dir.path().join("pi_estimate.py").exists());
        assert!(dir.path().join(GANGA_FILENAME).exists());
        assert!(dir.path().join(BASH_FILENAME).exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("llm_output.txt")).unwrap(),
            response
        );
        assert_eq!(generator.prompts.lock().unwrap()[0], DEFAULT_PROMPT);
    }

    #[tokio::test]
    async fn test_unusable_output_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            prompt: Some("estimate pi".to_string()),
            ..config_in(dir.path())
        };
        let generator = CannedGenerator::new("Sorry, I can only talk about pie recipes.");

        assert!(!run_ganga_llm(&generator, &config).await.unwrap());
        assert!(!dir.path().join(GANGA_FILENAME).exists());
        // the raw output is still kept for debugging
        assert!(dir.path().join("llm_output.txt").exists());
        assert_eq!(generator.prompts.lock().unwrap()[0], "estimate pi");
    }
}
