/// Scan orchestration.
///
/// The walk runs on the calling thread inside the worker pool's scope,
/// so a full pool blocks the walk instead of piling up queued files.
use std::io::{self, Write};

use tracing::info;

use crate::config::ScanConfig;
use crate::errors::ScanResult;
use crate::report::Reporter;
use crate::results::FindStats;

use super::pool::WorkerPool;
use super::walker::Walker;

/// Runs a scan, writing per-file output to stdout.
pub fn scan(config: &ScanConfig) -> ScanResult<FindStats> {
    scan_with_writer(config, Box::new(io::stdout()))
}

/// Runs a scan against an arbitrary output stream.
pub fn scan_with_writer(
    config: &ScanConfig,
    out: Box<dyn Write + Send>,
) -> ScanResult<FindStats> {
    let reporter = Reporter::new(config.output, config.colorize, out);
    let pool = WorkerPool::new(config.max_jobs)?;
    let walker = Walker::new(config, &reporter);

    pool.run(|jobs| {
        for root in &config.roots {
            walker.walk_root(jobs, root);
        }
    });

    reporter.flush();
    let stats = reporter.stats();
    info!(
        "scan complete: {} tested, {} matched, {} lines",
        stats.files_tested, stats.files_matched, stats.lines_matched
    );
    Ok(stats)
}
