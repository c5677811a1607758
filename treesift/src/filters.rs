/// File-level filters applied before any content is read: the
/// include/exclude name test and the modification-time window.
///
/// Exclude rules always win over include rules. When include patterns
/// are configured they act as a whitelist: a file matching none of them
/// is skipped even though nothing excluded it.
use std::path::Path;
use std::time::SystemTime;

use crate::patterns::Criteria;

/// Decides whether a file's path qualifies for content evaluation.
///
/// Precedence, first hit wins:
/// 1. any Exclude(OR) pattern matches - reject
/// 2. every Exclude(AND) pattern matches - reject
/// 3. any Include(OR) pattern matches - accept
/// 4. every Include(AND) pattern matches - accept
/// 5. include patterns configured but none matched - reject,
///    otherwise accept
pub fn matches_file_name(path: &Path, criteria: &Criteria) -> bool {
    let name = path.to_string_lossy();

    if !criteria.exclude_or.is_empty() && criteria.exclude_or.matches_any(&name) {
        return false;
    }
    if !criteria.exclude_and.is_empty() && criteria.exclude_and.matches_all(&name) {
        return false;
    }

    if !criteria.include_or.is_empty() && criteria.include_or.matches_any(&name) {
        return true;
    }
    if !criteria.include_and.is_empty() && criteria.include_and.matches_all(&name) {
        return true;
    }

    // Include patterns form a whitelist once any are configured.
    !criteria.has_include()
}

/// Modification-time bounds resolved to absolute instants.
///
/// `newer_than` is the lower bound, `older_than` the upper. Equality
/// with either bound passes. Both bounds together form a window; a
/// degenerate window with both bounds equal matches only that instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWindow {
    pub newer_than: Option<SystemTime>,
    pub older_than: Option<SystemTime>,
}

impl TimeWindow {
    pub fn is_unbounded(&self) -> bool {
        self.newer_than.is_none() && self.older_than.is_none()
    }

    /// True if the timestamp falls inside the window.
    pub fn valid_timestamp(&self, mtime: SystemTime) -> bool {
        if let Some(newer) = self.newer_than {
            if mtime < newer {
                return false;
            }
        }
        if let Some(older) = self.older_than {
            return mtime <= older;
        }
        true
    }
}
