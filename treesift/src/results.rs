/// Result types produced by the scan.
use std::path::PathBuf;

/// A single accepted line together with its capture context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 1-based line number within the file.
    pub line_number: usize,
    /// The accepted line, without its trailing newline.
    pub text: String,
    /// Byte ranges of accept-pattern hits within `text`, merged and sorted.
    pub spans: Vec<(usize, usize)>,
    /// Lines immediately before the match, as (line_number, text).
    pub context_before: Vec<(usize, String)>,
    /// Lines immediately after the match, as (line_number, text).
    pub context_after: Vec<(usize, String)>,
}

/// The outcome of evaluating one file.
#[derive(Debug, Clone)]
pub struct FileVerdict {
    pub path: PathBuf,
    pub matched: bool,
    pub matches: Vec<LineMatch>,
}

impl FileVerdict {
    pub fn accepted(path: PathBuf, matches: Vec<LineMatch>) -> Self {
        Self {
            path,
            matched: true,
            matches,
        }
    }

    pub fn unmatched(path: PathBuf) -> Self {
        Self {
            path,
            matched: false,
            matches: Vec::new(),
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Aggregate counters for a whole scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindStats {
    /// Files dispatched for evaluation.
    pub files_tested: u64,
    /// Files whose content satisfied the accept criteria.
    pub files_matched: u64,
    /// Accepted lines across all matched files.
    pub lines_matched: u64,
}
