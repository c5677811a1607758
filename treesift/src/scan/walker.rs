/// Directory traversal and job dispatch.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::report::Reporter;

use super::evaluator::evaluate_file;
use super::pool::JobScope;

pub struct Walker<'s> {
    config: &'s ScanConfig,
    reporter: &'s Reporter,
}

impl<'s> Walker<'s> {
    pub fn new(config: &'s ScanConfig, reporter: &'s Reporter) -> Self {
        Self { config, reporter }
    }

    /// Walks one root. A root that is itself a regular file is
    /// dispatched directly; an unreadable root is logged and skipped.
    pub fn walk_root(&self, jobs: &JobScope<'_, 's>, root: &Path) {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => self.walk_dir(jobs, root, 0),
            Ok(meta) if meta.is_file() => self.dispatch(jobs, root.to_path_buf()),
            Ok(_) => debug!("skipping special file {}", root.display()),
            Err(e) => warn!("unable to stat {}: {}", root.display(), e),
        }
    }

    fn walk_dir(&self, jobs: &JobScope<'_, 's>, dir: &Path, depth: usize) {
        if let Some(max) = self.config.max_depth {
            if depth > max {
                return;
            }
        }
        if !self.config.criteria.prune.is_empty()
            && self.config.criteria.prune.matches_any(&dir.to_string_lossy())
        {
            debug!("pruned {}", dir.display());
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("unable to read {}: {}", dir.display(), e);
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("unable to read entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            // Stat through symlinks so a link is walked or scanned as
            // its target. A dangling link fails the stat here.
            let path = entry.path();
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => self.walk_dir(jobs, &path, depth + 1),
                Ok(meta) if meta.is_file() => self.dispatch(jobs, path),
                Ok(_) => debug!("skipping special file {}", path.display()),
                Err(e) => warn!("unable to stat {}: {}", path.display(), e),
            }
        }
    }

    /// Counts the file and hands it to a worker. Blocks here when all
    /// workers are busy, which is what bounds the walk.
    fn dispatch(&self, jobs: &JobScope<'_, 's>, path: PathBuf) {
        self.reporter.file_tested();
        let config = self.config;
        let reporter = self.reporter;
        jobs.submit(move || evaluate_file(&path, config, reporter));
    }
}
