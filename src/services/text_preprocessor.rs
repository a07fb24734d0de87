//! Page text normalization for word counting

use once_cell::sync::Lazy;
use regex::Regex;

static SQUARE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[|\]").unwrap());
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]|_").unwrap());

/// Lowercase `text` and replace brackets, punctuation and underscores by spaces
///
/// Each removed character becomes exactly one space, so token positions are kept.
pub fn preprocess_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let clean = SQUARE_BRACKETS.replace_all(&lowered, " ");
    NON_ALPHANUMERIC.replace_all(&clean, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_text() {
        let text = "The Large Hadron Collider! [citation] {CERN} more TEXT.";
        assert_eq!(
            preprocess_text(text),
            "the large hadron collider   citation   cern  more text "
        );
    }

    #[test]
    fn test_underscores_and_hyphens_split_words() {
        assert_eq!(preprocess_text("large-hadron_collider"), "large hadron collider");
    }

    #[test]
    fn test_preprocess_is_idempotent() {
        let samples = [
            "The Large Hadron Collider at CERN aka LHC aka large-hadron-collider.",
            "[1] It's (it) IT; it?",
            "already lowercase words only",
            "Ünïcode Wörds — and em dashes",
        ];
        for sample in samples {
            let once = preprocess_text(sample);
            assert_eq!(preprocess_text(&once), once, "not a fixed point: {sample}");
        }
    }
}
