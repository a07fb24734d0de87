//! Logging helpers
//!
//! Subscriber setup and the banner-style messages shared by the subcommands.
//! Everything goes to stderr: a job's stdout must stay machine readable.

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins when set, otherwise `info` (or `debug` when `verbose`).
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log the program start banner
pub fn log_startup(command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 ganga-genai {} - {}", command, now());
    info!("{}", "=".repeat(60));
}

/// Log a submitted job
pub fn log_job_submitted(job_id: u64, job_name: &str, subjobs: usize) {
    if subjobs > 0 {
        info!(
            "📤 Job {} ({}) submitted with {} subjobs",
            job_id, job_name, subjobs
        );
    } else {
        info!("📤 Job {} ({}) submitted", job_id, job_name);
    }
}

/// Log the final word count and where it was stored
pub fn log_final_result(word: &str, count: i64, result_file: &Path, merged_output: &Path) {
    info!("\n{}", "─".repeat(60));
    info!(">>> Frequency of the word '{}' = {} <<<", word, count);
    info!("{}", "─".repeat(60));
    info!("The word count has been stored in: {}", result_file.display());
    info!(
        "Run this command to see the stored result: cat {}",
        result_file.display()
    );
    info!("{}", merged_output_hint(merged_output));
}

/// Shell command showing a job's merged stdout
pub fn merged_output_hint(merged_output: &Path) -> String {
    format!(
        "Run this command to check the merged output: cat {}",
        merged_output.display()
    )
}

/// Truncate long text for log display
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_output_hint_points_at_file() {
        let hint = merged_output_hint(Path::new("/jobs/3/output/stdout"));
        assert!(hint.ends_with("cat /jobs/3/output/stdout"));
        assert!(!hint.contains("peek"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("pi", 10), "pi");
        assert_eq!(truncate_text("monte carlo", 5), "monte...");
        // counts chars, not bytes
        assert_eq!(truncate_text("ππππ", 2), "ππ...");
    }
}
