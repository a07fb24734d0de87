//! Snippet extraction types

use std::fmt;

/// Kind of code block being pulled out of the generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentLabel {
    /// Monte Carlo pi estimation code
    PiApproximation,
    /// Ganga job submission code
    GangaJob,
    /// Shell wrapper running the estimation code
    Bash,
}

impl ContentLabel {
    /// Labels whose absence aborts the whole snippet-writing run
    pub fn is_required(self) -> bool {
        matches!(self, ContentLabel::PiApproximation | ContentLabel::GangaJob)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentLabel::PiApproximation => "Pi approximation",
            ContentLabel::GangaJob => "Ganga job",
            ContentLabel::Bash => "Bash",
        }
    }
}

impl fmt::Display for ContentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// First non-empty match, untrimmed
    Present(String),
    /// Nothing matched for a required label; the run must stop
    AbsentRequired,
    /// Nothing matched for an optional label; the run continues
    AbsentOptional,
}

impl Extraction {
    pub fn absent(label: ContentLabel) -> Self {
        if label.is_required() {
            Extraction::AbsentRequired
        } else {
            Extraction::AbsentOptional
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Extraction::Present(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Extraction::Present(snippet) => Some(snippet),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Extraction::Present(snippet) => Some(snippet),
            _ => None,
        }
    }
}
