/// Per-file evaluation.
///
/// Each file runs the same pipeline: name filter, modification-time
/// filter, binary classification, then a single line-by-line pass that
/// drives the accept, reject, and delete criteria together.
///
/// The pass keeps three cumulative states, one per AND group. Satisfied
/// patterns stay satisfied for the rest of the file. A line is
/// "contributing" when it newly advances the accept AND group or hits
/// an accept OR pattern; only contributing lines are recorded, and only
/// contributing lines are tested against the delete criteria. A deleted
/// line is dropped from the record and does not count toward OR
/// acceptance, but any accept AND progress it made is kept.
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::classify::is_binary;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::filters::matches_file_name;
use crate::patterns::AndState;
use crate::report::Reporter;
use crate::results::{FileVerdict, LineMatch};

/// Runs the whole pipeline for one file and reports the verdict.
pub fn evaluate_file(path: &Path, config: &ScanConfig, reporter: &Reporter) {
    trace!("evaluating {}", path.display());

    if !matches_file_name(path, &config.criteria) {
        return;
    }

    if !config.window.is_unbounded() {
        let mtime = match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                warn!("unable to read mtime of {}: {}", path.display(), e);
                return;
            }
        };
        if !config.window.valid_timestamp(mtime) {
            return;
        }
    }

    if !config.binary && is_binary(path, config.binary_size) {
        debug!("skipping binary {}", path.display());
        return;
    }

    match read_lines(path, config) {
        Ok(lines) => reporter.report(&evaluate_lines(path, &lines, config)),
        Err(e) => warn!("unable to scan {}: {}", path.display(), e),
    }
}

/// Applies the content criteria to a file's lines.
pub fn evaluate_lines(path: &Path, lines: &[String], config: &ScanConfig) -> FileVerdict {
    let criteria = &config.criteria;
    let mut accept_and = AndState::new(&criteria.accept_and);
    let mut reject_and = AndState::new(&criteria.reject_and);
    let mut delete_and = AndState::new(&criteria.delete_and);

    let mut all_and_accepted = false;
    let mut any_or_accepted = false;
    let mut rejected = false;
    let mut kept: Vec<usize> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let (reject_all, _) = reject_and.update(&criteria.reject_and, line);
        if (!criteria.reject_and.is_empty() && reject_all)
            || criteria.reject_or.matches_any(line)
        {
            rejected = true;
            break;
        }

        let (accept_all, accept_new) = accept_and.update(&criteria.accept_and, line);
        if !criteria.accept_and.is_empty() && accept_all {
            all_and_accepted = true;
        }
        let accept_or = criteria.accept_or.matches_any(line);

        if accept_new || accept_or {
            let (delete_all, _) = delete_and.update(&criteria.delete_and, line);
            let deleted = (!criteria.delete_and.is_empty() && delete_all)
                || criteria.delete_or.matches_any(line);
            if !deleted {
                kept.push(i);
                if accept_or {
                    any_or_accepted = true;
                }
            }
        }
    }

    if rejected || !(all_and_accepted || any_or_accepted) {
        return FileVerdict::unmatched(path.to_path_buf());
    }

    let matches = kept
        .iter()
        .map(|&i| build_match(i, lines, config))
        .collect();
    FileVerdict::accepted(path.to_path_buf(), matches)
}

fn build_match(i: usize, lines: &[String], config: &ScanConfig) -> LineMatch {
    let context_before: Vec<(usize, String)> = (0..config.before)
        .rev()
        .filter_map(|k| {
            i.checked_sub(k + 1)
                .and_then(|j| lines.get(j).map(|text| (j + 1, text.clone())))
        })
        .collect();
    let context_after: Vec<(usize, String)> = (1..=config.after)
        .filter_map(|k| lines.get(i + k).map(|text| (i + k + 1, text.clone())))
        .collect();

    LineMatch {
        line_number: i + 1,
        text: lines[i].clone(),
        spans: config.criteria.accept_spans(&lines[i]),
        context_before,
        context_after,
    }
}

/// Reads a file into lines, stripping terminators and capping line length.
fn read_lines(path: &Path, config: &ScanConfig) -> ScanResult<Vec<String>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::file_not_found(path),
        std::io::ErrorKind::PermissionDenied => ScanError::permission_denied(path),
        _ => ScanError::IoError(e),
    })?;

    let mut reader = BufReader::with_capacity(config.scan_buf_initial, file);
    // Two spare bytes so a maximum-length line still fits with its CRLF.
    let limit = config.scan_buf_max.saturating_add(2) as u64;
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        // Strip "\n" or "\r\n"; a bare "\r" with no newline is content.
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if buf.len() > config.scan_buf_max {
            return Err(ScanError::line_too_long(path, config.scan_buf_max));
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(lines)
}
