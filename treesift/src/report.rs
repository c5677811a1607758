/// Serialized result reporting.
///
/// One `Reporter` is shared by every worker. A single mutex guards both
/// the counters and the output stream so each file's block of output is
/// written whole, never interleaved with another worker's.
use std::io::Write;
use std::sync::Mutex;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::results::{FileVerdict, FindStats};

/// What gets written for each matched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Counters only, no per-file output.
    None,
    /// One path per matched file.
    #[default]
    FilesOnly,
    /// Path, then numbered matching lines with context.
    Lines,
    /// Matching line text only, no paths or numbers.
    RawLines,
}

struct ReporterInner {
    stats: FindStats,
    out: Box<dyn Write + Send>,
}

pub struct Reporter {
    inner: Mutex<ReporterInner>,
    mode: OutputMode,
    colorize: bool,
}

impl Reporter {
    pub fn new(mode: OutputMode, colorize: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Mutex::new(ReporterInner {
                stats: FindStats::default(),
                out,
            }),
            mode,
            colorize,
        }
    }

    /// Counts a file the moment it is dispatched for evaluation.
    pub fn file_tested(&self) {
        let mut inner = self.lock();
        inner.stats.files_tested += 1;
    }

    /// Folds one verdict into the totals and emits its output block.
    pub fn report(&self, verdict: &FileVerdict) {
        if !verdict.matched {
            return;
        }

        let mut inner = self.lock();
        inner.stats.files_matched += 1;
        inner.stats.lines_matched += verdict.matches.len() as u64;

        match self.mode {
            OutputMode::None => {}
            OutputMode::FilesOnly => {
                let path = verdict.path.display().to_string();
                let path = self.paint_path(&path);
                let _ = writeln!(inner.out, "{}", path);
            }
            OutputMode::Lines => {
                let path = verdict.path.display().to_string();
                let path = self.paint_path(&path);
                let _ = writeln!(inner.out, "{}", path);
                for m in &verdict.matches {
                    for (num, text) in &m.context_before {
                        let _ = writeln!(inner.out, "{} : {}", self.paint_num(*num), text);
                    }
                    let line = self.paint_spans(&m.text, &m.spans);
                    let _ = writeln!(inner.out, "{} | {}", self.paint_num(m.line_number), line);
                    for (num, text) in &m.context_after {
                        let _ = writeln!(inner.out, "{} : {}", self.paint_num(*num), text);
                    }
                }
            }
            OutputMode::RawLines => {
                for m in &verdict.matches {
                    let _ = writeln!(inner.out, "{}", m.text);
                }
            }
        }
    }

    pub fn stats(&self) -> FindStats {
        self.lock().stats
    }

    pub fn flush(&self) {
        let _ = self.lock().out.flush();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReporterInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn paint_path(&self, path: &str) -> String {
        if self.colorize {
            path.blue().to_string()
        } else {
            path.to_string()
        }
    }

    // Pad before painting so ANSI codes do not skew the column width.
    fn paint_num(&self, num: usize) -> String {
        let padded = format!("{:>8}", num);
        if self.colorize {
            padded.green().to_string()
        } else {
            padded
        }
    }

    fn paint_spans(&self, text: &str, spans: &[(usize, usize)]) -> String {
        if !self.colorize || spans.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        for &(start, end) in spans {
            out.push_str(&text[pos..start]);
            out.push_str(&text[start..end].red().bold().to_string());
            pos = end;
        }
        out.push_str(&text[pos..]);
        out
    }
}

/// Groups digits with commas for the summary lines.
pub fn commaize(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
