//! Word counting on a single PDF page

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::services::pdf_service::PdfDocument;
use crate::services::text_preprocessor::preprocess_text;

/// Occurrences of `word` among the whitespace tokens of the preprocessed text
///
/// `word` itself is matched as given, it is not normalized.
pub fn count_word_in_text(text: &str, word: &str) -> usize {
    preprocess_text(text)
        .split_whitespace()
        .filter(|token| *token == word)
        .count()
}

/// Occurrences of `word` on page `page_index` (0-based) of `file`
pub fn count_word(file: &Path, page_index: usize, word: &str) -> Result<usize> {
    let document = PdfDocument::open(file)?;
    let text = document.page_text(page_index)?;
    let count = count_word_in_text(&text, word);

    debug!(
        "page {} of {}: '{}' x {}",
        page_index,
        file.display(),
        word,
        count
    );

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_word_in_text() {
        let text = "The Large Hadron Collider at CERN aka LHC aka large-hadron-collider.";
        assert_eq!(count_word_in_text(text, "hadron"), 2);
        assert_eq!(count_word_in_text(text, "aka"), 2);
        assert_eq!(count_word_in_text(text, "Hadron"), 0);
    }

    #[test]
    fn test_it_is_not_counted_inside_other_words() {
        let text = "It is what it is: items, its [it] and IT.";
        assert_eq!(count_word_in_text(text, "it"), 4);
    }
}
