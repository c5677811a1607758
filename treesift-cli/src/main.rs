use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use treesift::{commaize, scan, OutputMode, ScanError, ScanOptions};

type Result<T> = std::result::Result<T, ScanError>;

/// Search directory trees for files whose content satisfies accept,
/// reject, and delete pattern criteria.
#[derive(Parser, Debug)]
#[command(name = "treesift", author, version, about)]
struct Args {
    /// Accept a file when any one of these patterns matches a line
    #[arg(short = 'a', long = "accept", value_name = "PATTERN")]
    accept_or: Vec<String>,

    /// Accept a file once all of these patterns have matched, on any lines
    #[arg(short = 'A', long = "accept-all", value_name = "PATTERN")]
    accept_and: Vec<String>,

    /// Reject a file when any one of these patterns matches a line
    #[arg(short = 'r', long = "reject", value_name = "PATTERN")]
    reject_or: Vec<String>,

    /// Reject a file once all of these patterns have matched, on any lines
    #[arg(short = 'R', long = "reject-all", value_name = "PATTERN")]
    reject_and: Vec<String>,

    /// Drop an accepted line when any one of these patterns matches it
    #[arg(short = 'd', long = "delete", value_name = "PATTERN")]
    delete_or: Vec<String>,

    /// Drop accepted lines once all of these patterns have matched
    #[arg(short = 'D', long = "delete-all", value_name = "PATTERN")]
    delete_and: Vec<String>,

    /// Only test files whose path matches any one of these patterns
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    include_or: Vec<String>,

    /// Only test files whose path matches all of these patterns
    #[arg(short = 'I', long = "include-all", value_name = "PATTERN")]
    include_and: Vec<String>,

    /// Skip files whose path matches any one of these patterns
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    exclude_or: Vec<String>,

    /// Skip files whose path matches all of these patterns
    #[arg(short = 'E', long = "exclude-all", value_name = "PATTERN")]
    exclude_and: Vec<String>,

    /// Do not descend into directories whose path matches
    #[arg(short = 'p', long = "prune", value_name = "PATTERN")]
    prune: Vec<String>,

    /// Only test files modified within this age, e.g. "90" or "2 weeks"
    #[arg(short = 'n', long = "newer-than", value_name = "AGE")]
    newer_than: Option<String>,

    /// Only test files modified at least this long ago
    #[arg(short = 'o', long = "older-than", value_name = "AGE")]
    older_than: Option<String>,

    /// Descend at most this many levels; the root is level 0, -1 is no limit
    #[arg(
        short = 'm',
        long = "max-depth",
        value_name = "DEPTH",
        allow_negative_numbers = true
    )]
    max_depth: Option<i64>,

    /// Number of files evaluated concurrently [default: CPU count]
    #[arg(short = 'M', long = "max-jobs", value_name = "N")]
    max_jobs: Option<std::num::NonZeroUsize>,

    /// Test binary files instead of skipping them
    #[arg(short = 'b', long = "binary")]
    binary: bool,

    /// Bytes sampled when deciding whether a file is binary
    #[arg(short = 'B', long = "binary-size", value_name = "BYTES")]
    binary_size: Option<usize>,

    /// Print this many context lines before each matching line
    #[arg(short = 'y', long = "before", value_name = "N")]
    before: Option<usize>,

    /// Print this many context lines after each matching line
    #[arg(short = 'z', long = "after", value_name = "N")]
    after: Option<usize>,

    /// Print matching lines, not just file names
    #[arg(short = 'l', long = "lines")]
    lines: bool,

    /// Print matching line text only, without file names or numbers
    #[arg(long = "raw")]
    raw: bool,

    /// Print no per-file output at all
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Colorize file names, line numbers, and matches
    #[arg(short = 'C', long = "color", alias = "colorize")]
    color: bool,

    /// Print the counter summary when the scan finishes
    #[arg(short = 's', long = "summary")]
    summary: bool,

    /// Line scan buffer sizes: initial and maximum, in bytes
    #[arg(
        short = 'S',
        long = "scan-buf-params",
        num_args = 2,
        value_names = ["INIT", "MAX"]
    )]
    scan_buf: Option<Vec<usize>>,

    /// Read additional options from this YAML file
    #[arg(short = 'c', long = "conf", value_name = "FILE")]
    conf: Option<PathBuf>,

    /// Suppress warnings
    #[arg(short = 'W', long = "no-warnings")]
    no_warnings: bool,

    /// Increase log verbosity; repeat for more detail
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Directories or files to scan [default: .]
    #[arg(value_name = "PATH")]
    roots: Vec<PathBuf>,
}

impl Args {
    /// Maps parsed flags onto scan options, leaving untouched fields at
    /// their defaults so the config-file merge can tell them apart.
    fn to_options(&self) -> ScanOptions {
        let defaults = ScanOptions::default();

        let output = if self.quiet {
            OutputMode::None
        } else if self.raw {
            OutputMode::RawLines
        } else if self.lines {
            OutputMode::Lines
        } else {
            defaults.output
        };

        let (scan_buf_initial, scan_buf_max) = match self.scan_buf.as_deref() {
            Some([init, max]) => (*init, *max),
            _ => (defaults.scan_buf_initial, defaults.scan_buf_max),
        };

        ScanOptions {
            accept_or: self.accept_or.clone(),
            accept_and: self.accept_and.clone(),
            reject_or: self.reject_or.clone(),
            reject_and: self.reject_and.clone(),
            delete_or: self.delete_or.clone(),
            delete_and: self.delete_and.clone(),
            include_or: self.include_or.clone(),
            include_and: self.include_and.clone(),
            exclude_or: self.exclude_or.clone(),
            exclude_and: self.exclude_and.clone(),
            prune: self.prune.clone(),
            newer_than: self.newer_than.clone(),
            older_than: self.older_than.clone(),
            roots: if self.roots.is_empty() {
                defaults.roots.clone()
            } else {
                self.roots.clone()
            },
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            max_jobs: self.max_jobs.unwrap_or(defaults.max_jobs),
            binary: self.binary,
            binary_size: self.binary_size.unwrap_or(defaults.binary_size),
            before: self.before.unwrap_or(defaults.before),
            after: self.after.unwrap_or(defaults.after),
            output,
            colorize: self.color,
            summary: self.summary,
            scan_buf_initial,
            scan_buf_max,
        }
    }
}

fn init_logging(args: &Args) {
    let level = if args.no_warnings {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let opts = ScanOptions::load_from(args.conf.as_deref())?.merge_with_cli(args.to_options());

    if opts.colorize {
        colored::control::set_override(true);
    }

    for root in &opts.roots {
        if !root.exists() {
            return Err(ScanError::file_not_found(root));
        }
    }

    let config = opts.compile()?;
    debug!(
        "scanning {} root(s) with {} job(s)",
        config.roots.len(),
        config.max_jobs
    );
    let stats = scan(&config)?;

    if config.summary {
        println!();
        println!("summary: files tested : {:>8}", commaize(stats.files_tested));
        println!("summary: files matched: {:>8}", commaize(stats.files_matched));
        println!("summary: lines matched: {:>8}", commaize(stats.lines_matched));
    }

    Ok(())
}

fn main() -> Result<()> {
    run()
}
