/// Configuration loading, merging, and compilation.
///
/// Options arrive in layers. A global file at
/// `<config dir>/treesift/config.yaml` is read first, then a
/// `.treesift.yaml` in the current directory, then any file named on the
/// command line, and finally the command-line flags themselves. Each
/// layer overrides the ones before it.
///
/// ```yaml
/// # .treesift.yaml
/// accept_or:
///   - "TODO"
///   - "FIXME"
/// exclude_or:
///   - "\\.git/"
/// newer_than: "2 weeks"
/// max_jobs: 8
/// output: lines
/// ```
///
/// `ScanOptions` is the raw, serializable form. `compile` turns it into
/// a `ScanConfig` with every regex built, every duration resolved to an
/// absolute instant, and every sentinel replaced with a typed value.
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};

use crate::errors::{ScanError, ScanResult};
use crate::filters::TimeWindow;
use crate::patterns::{Criteria, PatternSet};
use crate::report::OutputMode;

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_max_depth() -> i64 {
    -1
}

fn default_max_jobs() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap()
}

fn default_binary_size() -> usize {
    1024
}

fn default_scan_buf_initial() -> usize {
    1024 * 1024
}

fn default_scan_buf_max() -> usize {
    10 * 1024 * 1024
}

/// User-facing scan options, as read from config files and flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Content patterns; a line matching any of them accepts the file.
    #[serde(default)]
    pub accept_or: Vec<String>,
    /// Content patterns that must all match, across any lines of the file.
    #[serde(default)]
    pub accept_and: Vec<String>,
    /// Content patterns; a line matching any of them rejects the file.
    #[serde(default)]
    pub reject_or: Vec<String>,
    /// Content patterns that reject the file once all have matched.
    #[serde(default)]
    pub reject_and: Vec<String>,
    /// Patterns that discard an otherwise accepted line.
    #[serde(default)]
    pub delete_or: Vec<String>,
    /// Patterns that discard accepted lines once all have matched.
    #[serde(default)]
    pub delete_and: Vec<String>,
    /// File name patterns; matching any one admits the file.
    #[serde(default)]
    pub include_or: Vec<String>,
    /// File name patterns that must all match to admit the file.
    #[serde(default)]
    pub include_and: Vec<String>,
    /// File name patterns; matching any one skips the file.
    #[serde(default)]
    pub exclude_or: Vec<String>,
    /// File name patterns that skip the file once all match.
    #[serde(default)]
    pub exclude_and: Vec<String>,
    /// Directory path patterns that stop the walk from descending.
    #[serde(default)]
    pub prune: Vec<String>,
    /// Only test files modified within this age, e.g. "90" or "2 weeks".
    #[serde(default)]
    pub newer_than: Option<String>,
    /// Only test files modified at least this long ago.
    #[serde(default)]
    pub older_than: Option<String>,
    /// Directories or files to scan.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,
    /// Descent limit; the root itself is depth 0. Negative means no limit.
    #[serde(default = "default_max_depth")]
    pub max_depth: i64,
    /// Number of files evaluated concurrently.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: NonZeroUsize,
    /// Evaluate binary files instead of skipping them.
    #[serde(default)]
    pub binary: bool,
    /// Bytes sampled when classifying a file as binary.
    #[serde(default = "default_binary_size")]
    pub binary_size: usize,
    /// Context lines captured before each match.
    #[serde(default)]
    pub before: usize,
    /// Context lines captured after each match.
    #[serde(default)]
    pub after: usize,
    /// Per-file output style.
    #[serde(default)]
    pub output: OutputMode,
    /// Colorize paths, line numbers, and match spans.
    #[serde(default)]
    pub colorize: bool,
    /// Print the counter summary after the scan.
    #[serde(default)]
    pub summary: bool,
    /// Initial per-line read buffer size in bytes.
    #[serde(default = "default_scan_buf_initial")]
    pub scan_buf_initial: usize,
    /// Longest line the scanner will read, in bytes.
    #[serde(default = "default_scan_buf_max")]
    pub scan_buf_max: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            accept_or: Vec::new(),
            accept_and: Vec::new(),
            reject_or: Vec::new(),
            reject_and: Vec::new(),
            delete_or: Vec::new(),
            delete_and: Vec::new(),
            include_or: Vec::new(),
            include_and: Vec::new(),
            exclude_or: Vec::new(),
            exclude_and: Vec::new(),
            prune: Vec::new(),
            newer_than: None,
            older_than: None,
            roots: default_roots(),
            max_depth: default_max_depth(),
            max_jobs: default_max_jobs(),
            binary: false,
            binary_size: default_binary_size(),
            before: 0,
            after: 0,
            output: OutputMode::default(),
            colorize: false,
            summary: false,
            scan_buf_initial: default_scan_buf_initial(),
            scan_buf_max: default_scan_buf_max(),
        }
    }
}

impl ScanOptions {
    /// Loads options from the global and local config files.
    pub fn load() -> ScanResult<Self> {
        Self::load_from(None)
    }

    /// Loads options, additionally layering an explicit config file on top.
    ///
    /// The global and local files are optional; a file named here must
    /// exist.
    pub fn load_from(custom: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(config_dir) = dirs::config_dir() {
            let global = config_dir.join("treesift/config.yaml");
            if global.exists() {
                builder = builder.add_source(File::from(global));
            }
        }

        let local = PathBuf::from(".treesift.yaml");
        if local.exists() {
            builder = builder.add_source(File::from(local));
        }

        if let Some(path) = custom {
            if !path.exists() {
                return Err(ScanError::config_error(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        builder
            .build()
            .map_err(|e| ScanError::config_error(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ScanError::config_error(e.to_string()))
    }

    /// Overlays command-line options on top of these.
    ///
    /// A CLI field still holding its default value is treated as unset
    /// and leaves the file-sourced value in place.
    pub fn merge_with_cli(mut self, cli: ScanOptions) -> ScanOptions {
        let defaults = ScanOptions::default();

        if cli.accept_or != defaults.accept_or {
            self.accept_or = cli.accept_or;
        }
        if cli.accept_and != defaults.accept_and {
            self.accept_and = cli.accept_and;
        }
        if cli.reject_or != defaults.reject_or {
            self.reject_or = cli.reject_or;
        }
        if cli.reject_and != defaults.reject_and {
            self.reject_and = cli.reject_and;
        }
        if cli.delete_or != defaults.delete_or {
            self.delete_or = cli.delete_or;
        }
        if cli.delete_and != defaults.delete_and {
            self.delete_and = cli.delete_and;
        }
        if cli.include_or != defaults.include_or {
            self.include_or = cli.include_or;
        }
        if cli.include_and != defaults.include_and {
            self.include_and = cli.include_and;
        }
        if cli.exclude_or != defaults.exclude_or {
            self.exclude_or = cli.exclude_or;
        }
        if cli.exclude_and != defaults.exclude_and {
            self.exclude_and = cli.exclude_and;
        }
        if cli.prune != defaults.prune {
            self.prune = cli.prune;
        }
        if cli.newer_than != defaults.newer_than {
            self.newer_than = cli.newer_than;
        }
        if cli.older_than != defaults.older_than {
            self.older_than = cli.older_than;
        }
        if cli.roots != defaults.roots {
            self.roots = cli.roots;
        }
        if cli.max_depth != defaults.max_depth {
            self.max_depth = cli.max_depth;
        }
        if cli.max_jobs != defaults.max_jobs {
            self.max_jobs = cli.max_jobs;
        }
        if cli.binary != defaults.binary {
            self.binary = cli.binary;
        }
        if cli.binary_size != defaults.binary_size {
            self.binary_size = cli.binary_size;
        }
        if cli.before != defaults.before {
            self.before = cli.before;
        }
        if cli.after != defaults.after {
            self.after = cli.after;
        }
        if cli.output != defaults.output {
            self.output = cli.output;
        }
        if cli.colorize != defaults.colorize {
            self.colorize = cli.colorize;
        }
        if cli.summary != defaults.summary {
            self.summary = cli.summary;
        }
        if cli.scan_buf_initial != defaults.scan_buf_initial {
            self.scan_buf_initial = cli.scan_buf_initial;
        }
        if cli.scan_buf_max != defaults.scan_buf_max {
            self.scan_buf_max = cli.scan_buf_max;
        }

        self
    }

    /// Compiles the raw options into a ready-to-run configuration.
    pub fn compile(&self) -> ScanResult<ScanConfig> {
        let criteria = Criteria {
            accept_or: PatternSet::compile(&self.accept_or)?,
            accept_and: PatternSet::compile(&self.accept_and)?,
            reject_or: PatternSet::compile(&self.reject_or)?,
            reject_and: PatternSet::compile(&self.reject_and)?,
            delete_or: PatternSet::compile(&self.delete_or)?,
            delete_and: PatternSet::compile(&self.delete_and)?,
            include_or: PatternSet::compile(&self.include_or)?,
            include_and: PatternSet::compile(&self.include_and)?,
            exclude_or: PatternSet::compile(&self.exclude_or)?,
            exclude_and: PatternSet::compile(&self.exclude_and)?,
            prune: PatternSet::compile(&self.prune)?,
        };

        let window = TimeWindow {
            newer_than: self.newer_than.as_deref().map(parse_age).transpose()?,
            older_than: self.older_than.as_deref().map(parse_age).transpose()?,
        };

        if self.scan_buf_initial > self.scan_buf_max {
            return Err(ScanError::config_error(format!(
                "scan buffer initial size {} exceeds maximum {}",
                self.scan_buf_initial, self.scan_buf_max
            )));
        }

        let max_depth = if self.max_depth < 0 {
            None
        } else {
            Some(self.max_depth as usize)
        };

        Ok(ScanConfig {
            criteria,
            window,
            roots: self.roots.clone(),
            max_depth,
            max_jobs: self.max_jobs,
            binary: self.binary,
            binary_size: self.binary_size,
            before: self.before,
            after: self.after,
            output: self.output,
            colorize: self.colorize,
            summary: self.summary,
            scan_buf_initial: self.scan_buf_initial,
            scan_buf_max: self.scan_buf_max,
        })
    }
}

/// Compiled scan configuration with all patterns built and ages resolved.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub criteria: Criteria,
    pub window: TimeWindow,
    pub roots: Vec<PathBuf>,
    pub max_depth: Option<usize>,
    pub max_jobs: NonZeroUsize,
    pub binary: bool,
    pub binary_size: usize,
    pub before: usize,
    pub after: usize,
    pub output: OutputMode,
    pub colorize: bool,
    pub summary: bool,
    pub scan_buf_initial: usize,
    pub scan_buf_max: usize,
}

/// Resolves an age spec to the absolute instant that long ago.
///
/// A bare number is a count of seconds; anything else goes through
/// humantime, so "90", "15 minutes", and "2h 30m" all work.
fn parse_age(spec: &str) -> ScanResult<SystemTime> {
    let duration = if let Ok(secs) = spec.parse::<u64>() {
        Duration::from_secs(secs)
    } else {
        humantime::parse_duration(spec)
            .map_err(|e| ScanError::invalid_duration(format!("{}: {}", spec, e)))?
    };
    SystemTime::now()
        .checked_sub(duration)
        .ok_or_else(|| ScanError::invalid_duration(format!("{}: age reaches before the epoch", spec)))
}
