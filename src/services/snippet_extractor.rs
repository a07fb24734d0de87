//! Snippet extractor
//!
//! Pulls code blocks out of free-form generated text. Every label has two
//! patterns: the first targets the `python code snippet #N:` markers the prompt
//! asks for, the second targets ordinary fenced code blocks for when the model
//! ignores the markers.
//!
//! Extraction strategy:
//! 1. Collect all matches of the primary pattern, take the first
//! 2. Nothing usable: retry once with the fallback pattern
//! 3. Still nothing: [`Extraction::AbsentRequired`] or [`Extraction::AbsentOptional`]
//!    depending on the label
//!
//! Failures are always values, never errors.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{error, info, warn};

use crate::models::{ContentLabel, Extraction};

// `regex` has no lookahead, so each marker pattern consumes its terminator in a
// non-capturing group instead. Only group 1 of the first match is used.
// `\n?\z` ends a block at the end of the text, before one trailing newline.
static PI_PRIMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)python code snippet #1:(.*?)(?:\npython code snippet #2|\n?\z)").unwrap()
});
static PI_FALLBACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```python(.*?)```").unwrap());

static GANGA_PRIMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)python code snippet #2:(.*?)(?:\nbash code snippet|\n?\z)").unwrap()
});
static GANGA_FALLBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```python(\n[^`]*?from.*?)```").unwrap());

static BASH_PRIMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)bash code snippet:(.*?)(?:\npython code snippet|\n?\z)").unwrap()
});
static BASH_FALLBACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```bash(.*?)```").unwrap());

/// One extraction call
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub label: ContentLabel,
    pub primary: &'a Regex,
    pub fallback: &'a Regex,
    pub text: &'a str,
}

impl<'a> ExtractionRequest<'a> {
    /// Request using the built-in marker/fence patterns for `label`
    pub fn for_label(label: ContentLabel, text: &'a str) -> Self {
        let (primary, fallback) = default_patterns(label);
        Self {
            label,
            primary,
            fallback,
            text,
        }
    }

    pub fn run(&self) -> Extraction {
        extract_code_snippet(self.label, self.primary, self.fallback, self.text)
    }
}

/// Built-in (primary, fallback) patterns for a label
pub fn default_patterns(label: ContentLabel) -> (&'static Regex, &'static Regex) {
    match label {
        ContentLabel::PiApproximation => (&*PI_PRIMARY, &*PI_FALLBACK),
        ContentLabel::GangaJob => (&*GANGA_PRIMARY, &*GANGA_FALLBACK),
        ContentLabel::Bash => (&*BASH_PRIMARY, &*BASH_FALLBACK),
    }
}

/// Compile a user-supplied pattern with `.` matching newlines
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).dot_matches_new_line(true).build()
}

/// All candidates of `pattern` in document order
///
/// A candidate is capture group 1 when the pattern has capture groups, the whole
/// match otherwise.
pub fn find_candidates<'t>(pattern: &Regex, text: &'t str) -> Vec<&'t str> {
    let has_groups = pattern.captures_len() > 1;

    pattern
        .captures_iter(text)
        .map(|caps| {
            let m = if has_groups { caps.get(1) } else { caps.get(0) };
            m.map_or("", |m| m.as_str())
        })
        .collect()
}

/// First candidate, if it is non-empty
///
/// Later candidates are ignored even when the first is blank: the model tends to
/// trail its code with blank blocks, and the first block is the canonical one.
pub fn first_candidate<'t>(candidates: &[&'t str]) -> Option<&'t str> {
    candidates.first().copied().filter(|s| !s.is_empty())
}

/// Extract the snippet for `label`, trying `primary` then `fallback`
pub fn extract_code_snippet(
    label: ContentLabel,
    primary: &Regex,
    fallback: &Regex,
    text: &str,
) -> Extraction {
    if let Some(snippet) = first_candidate(&find_candidates(primary, text)) {
        info!("✓ '{}' code found in LLM output", label);
        return Extraction::Present(snippet.to_string());
    }

    warn!(
        "⚠️ No code snippet for '{}' was parsed using coding marker #1, trying a different marker",
        label
    );

    if let Some(snippet) = first_candidate(&find_candidates(fallback, text)) {
        info!("✓ '{}' code found in LLM output (fallback marker)", label);
        return Extraction::Present(snippet.to_string());
    }

    if label.is_required() {
        error!("❌ Unable to parse '{}' code from LLM output", label);
    } else {
        warn!("LLM generated incomplete code, no '{}' snippet. Continuing...", label);
    }

    Extraction::absent(label)
}
