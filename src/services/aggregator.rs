//! Merged-output aggregation
//!
//! The merged `stdout` of a split word-count job holds one integer per subjob,
//! interleaved with the merger's `#` header lines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::AppError;

/// Sum of every integer line, skipping `#` comments and unparsable lines
///
/// The sum saturates at the `i64` bounds.
pub fn count_frequency_lines(content: &str) -> i64 {
    content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| match line.trim().parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                if !line.trim().is_empty() {
                    debug!("skipping non-integer line: {:?}", line);
                }
                None
            }
        })
        .fold(0i64, |total, value| {
            total.checked_add(value).unwrap_or_else(|| {
                warn!("word count overflow adding {} to {}, saturating", value, total);
                total.saturating_add(value)
            })
        })
}

/// [`count_frequency_lines`] over a file
pub fn count_frequency(output_file: &Path) -> Result<i64> {
    let content =
        fs::read_to_string(output_file).map_err(|e| AppError::file_read_failed(output_file, e))?;
    Ok(count_frequency_lines(&content))
}

/// Write `count` as the only content of `<result_dir>/<job_name>.txt`
pub fn write_result(result_dir: &Path, job_name: &str, count: i64) -> Result<PathBuf> {
    let result_file = result_dir.join(format!("{}.txt", job_name));
    fs::write(&result_file, count.to_string())
        .map_err(|e| AppError::file_write_failed(&result_file, e))?;
    Ok(result_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines_are_skipped() {
        assert_eq!(count_frequency_lines("#header\n1\n2\n3\n"), 6);
    }

    #[test]
    fn test_non_integer_lines_are_skipped() {
        assert_eq!(count_frequency_lines("1\nabc\n2\n"), 3);
    }

    #[test]
    fn test_padded_and_negative_values() {
        assert_eq!(count_frequency_lines("  4 \r\n\n-1\n# 100\n2.5\n"), 3);
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(count_frequency_lines("9223372036854775807\n1\n"), i64::MAX);
        assert_eq!(
            count_frequency_lines("9223372036854775807\n9223372036854775807\n-5\n"),
            i64::MAX - 5
        );
        assert_eq!(count_frequency_lines("-9223372036854775808\n-1\n"), i64::MIN);
    }

    #[test]
    fn test_indented_comment_is_not_a_comment() {
        // only a leading '#' marks a comment; " #7" is simply unparsable
        assert_eq!(count_frequency_lines(" #7\n7\n"), 7);
    }

    #[test]
    fn test_count_frequency_file_and_result() {
        let dir = tempfile::tempdir().unwrap();
        let merged = dir.path().join("stdout");
        fs::write(&merged, "#sometext\n1\n2\n3\n#sometest\n").unwrap();

        let count = count_frequency(&merged).unwrap();
        assert_eq!(count, 6);

        let result_file = write_result(dir.path(), "count_it", count).unwrap();
        assert_eq!(result_file, dir.path().join("count_it.txt"));
        assert_eq!(fs::read_to_string(result_file).unwrap(), "6");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(count_frequency(Path::new("/nonexistent/stdout")).is_err());
    }
}
