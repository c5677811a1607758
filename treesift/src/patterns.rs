/// Pattern groups and the cumulative AND-matching state used by the
/// per-file evaluator.
///
/// # OR groups vs AND groups
///
/// Every criteria set is an ordered list of compiled regular expressions
/// tagged by how its members combine:
///
/// - An OR group is stateless: a datum satisfies the group when any one
///   pattern matches it. Each line (or path) is tested independently.
/// - An AND group is stateful across the lifetime of one file: each
///   pattern owns one bit that flips to true the first time *any* line
///   matches it, and never flips back. The group is satisfied once every
///   bit is set, even though no single line matched everything.
///
/// The bits live in [`AndState`], which is allocated fresh for each file
/// evaluation. Nothing here is shared between files, so concurrent
/// evaluations never observe each other's progress.
///
/// # Example
///
/// ```rust,ignore
/// let set = PatternSet::compile(&["foo".into(), "bar".into()])?;
/// let mut state = AndState::new(&set);
/// assert_eq!(state.update(&set, "foo here"), (false, true));
/// assert_eq!(state.update(&set, "nothing"), (false, false));
/// assert_eq!(state.update(&set, "bar here"), (true, true));
/// assert_eq!(state.update(&set, "nothing"), (true, false));
/// ```
use regex::Regex;

use crate::errors::{ScanError, ScanResult};

/// An ordered group of compiled patterns evaluated together.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    regexes: Vec<Regex>,
}

impl PatternSet {
    /// Compiles a pattern group, failing on the first invalid expression.
    pub fn compile(patterns: &[String]) -> ScanResult<Self> {
        let mut regexes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let re = Regex::new(pattern)
                .map_err(|e| ScanError::invalid_pattern(format!("{}: {}", pattern, e)))?;
            regexes.push(re);
        }
        Ok(Self { regexes })
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    /// OR semantics: true if any pattern matches the text.
    pub fn matches_any(&self, text: &str) -> bool {
        self.regexes.iter().any(|re| re.is_match(text))
    }

    /// AND semantics against a single datum: true if every pattern
    /// matches the text. Vacuously true for an empty group, so callers
    /// gate on [`is_empty`](Self::is_empty) first.
    pub fn matches_all(&self, text: &str) -> bool {
        self.regexes.iter().all(|re| re.is_match(text))
    }

    /// Byte spans of every pattern match in the text, sorted by start
    /// with overlapping or adjacent spans merged.
    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for re in &self.regexes {
            spans.extend(re.find_iter(text).map(|m| (m.start(), m.end())));
        }
        merge_spans(spans)
    }
}

/// Sorts spans and merges any that touch, so renderers can slice the
/// line into disjoint highlighted and plain segments.
pub fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => {
                last.1 = last.1.max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Cumulative AND-group progress for one file.
///
/// One bit per pattern, monotonically set as lines match. Never reset
/// and never shared across files.
#[derive(Debug, Clone)]
pub struct AndState {
    satisfied: Vec<bool>,
}

impl AndState {
    pub fn new(set: &PatternSet) -> Self {
        Self {
            satisfied: vec![false; set.len()],
        }
    }

    /// Feeds one line into the state. Returns `(all, newly)`: `all` is
    /// true once every pattern has been satisfied by some line so far,
    /// `newly` is true only when this line flipped at least one bit.
    pub fn update(&mut self, set: &PatternSet, line: &str) -> (bool, bool) {
        let mut newly = false;
        let mut count = 0;
        for (i, re) in set.regexes.iter().enumerate() {
            if self.satisfied[i] {
                count += 1;
            } else if re.is_match(line) {
                self.satisfied[i] = true;
                newly = true;
                count += 1;
            }
        }
        (count == self.satisfied.len(), newly)
    }

    /// True once every bit has been set. Vacuously true when the group
    /// is empty, so callers gate on the group size.
    pub fn all_satisfied(&self) -> bool {
        self.satisfied.iter().all(|&b| b)
    }
}

/// The full set of compiled criteria for one scan.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub accept_or: PatternSet,
    pub accept_and: PatternSet,
    pub reject_or: PatternSet,
    pub reject_and: PatternSet,
    pub delete_or: PatternSet,
    pub delete_and: PatternSet,
    pub include_or: PatternSet,
    pub include_and: PatternSet,
    pub exclude_or: PatternSet,
    pub exclude_and: PatternSet,
    pub prune: PatternSet,
}

impl Criteria {
    /// True when any content-accept pattern is configured.
    pub fn has_accept(&self) -> bool {
        !self.accept_or.is_empty() || !self.accept_and.is_empty()
    }

    /// True when any name-include pattern is configured.
    pub fn has_include(&self) -> bool {
        !self.include_or.is_empty() || !self.include_and.is_empty()
    }

    /// Merged highlight spans from both accept groups for one line.
    pub fn accept_spans(&self, line: &str) -> Vec<(usize, usize)> {
        let mut spans = self.accept_or.find_spans(line);
        spans.extend(self.accept_and.find_spans(line));
        merge_spans(spans)
    }
}
