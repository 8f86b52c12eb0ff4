use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of characters a trimmed clause must exceed to be kept
pub const MIN_CLAUSE_CHARS: usize = 20;

/// Text extracted from an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub filename: String, // Diagnostics only
    pub content: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Wrap inline text that did not come from an upload
    pub fn from_text(content: impl Into<String>) -> Self {
        Self::new("inline.txt", content)
    }
}

/// A trimmed segment of a document, always longer than [`MIN_CLAUSE_CHARS`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Clause(String);

impl Clause {
    /// Trim `candidate` and keep it only if it is long enough to be a clause
    pub fn parse(candidate: &str) -> Option<Self> {
        let trimmed = candidate.trim();
        if trimmed.chars().count() > MIN_CLAUSE_CHARS {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Clause {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Clause::parse(&value).ok_or_else(|| {
            format!(
                "clause must be longer than {} characters after trimming",
                MIN_CLAUSE_CHARS
            )
        })
    }
}

impl From<Clause> for String {
    fn from(clause: Clause) -> Self {
        clause.0
    }
}

impl AsRef<str> for Clause {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPosition {
    pub start_offset: usize, // Byte offset in the clause text
    pub end_offset: usize,
}

/// Risk terms found in a single clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub terms: Vec<String>, // Vocabulary order
    pub clause: Clause,
    pub confidence: f64, // Percentage, two decimals
    pub highlight: Option<TextPosition>,
}

/// Short digest of a clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    pub truncated: bool,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One line of a unified diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffLine {
    OriginalHeader {
        label: String,
    },
    ModifiedHeader {
        label: String,
    },
    Hunk {
        original_start: usize,
        original_len: usize,
        modified_start: usize,
        modified_len: usize,
    },
    Context {
        text: String,
        original_line: usize, // 1-indexed
        modified_line: usize,
    },
    Deletion {
        text: String,
        original_line: usize,
    },
    Addition {
        text: String,
        modified_line: usize,
    },
}

impl DiffLine {
    pub fn is_change(&self) -> bool {
        matches!(self, DiffLine::Deletion { .. } | DiffLine::Addition { .. })
    }
}

/// Formats a hunk range the way GNU diff does: the length is omitted when it
/// is 1, and an empty range points at the line before it.
fn hunk_range(start: usize, len: usize) -> String {
    match len {
        1 => format!("{}", start),
        0 => format!("{},0", start.saturating_sub(1)),
        _ => format!("{},{}", start, len),
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::OriginalHeader { label } => write!(f, "--- {}", label),
            DiffLine::ModifiedHeader { label } => write!(f, "+++ {}", label),
            DiffLine::Hunk {
                original_start,
                original_len,
                modified_start,
                modified_len,
            } => write!(
                f,
                "@@ -{} +{} @@",
                hunk_range(*original_start, *original_len),
                hunk_range(*modified_start, *modified_len)
            ),
            DiffLine::Context { text, .. } => write!(f, " {}", text),
            DiffLine::Deletion { text, .. } => write!(f, "-{}", text),
            DiffLine::Addition { text, .. } => write!(f, "+{}", text),
        }
    }
}

/// Render diff lines as unified-diff text, one line each, no trailing newline
pub fn render_unified(lines: &[DiffLine]) -> String {
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A clause presented in detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseDetail {
    pub index: usize, // 1-indexed
    pub clause: Clause,
    pub summary: Summary,
}

/// Result of running the review pipeline over one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub filename: String,
    pub clause_count: usize,
    pub clauses: Vec<ClauseDetail>,
    pub findings: Vec<RiskFinding>,
    pub triggered_terms: Vec<String>,
}

impl AnalysisReport {
    pub fn has_risks(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Change tracking result between two documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub identical: bool,
    pub lines: Vec<DiffLine>,
    pub unified: String,
}
