//! treesift: a concurrent, multi-criteria file content scanner.
//!
//! treesift walks directory trees with a bounded worker pool and tests
//! every file against regex criteria. Accept patterns select lines,
//! reject patterns veto whole files, and delete patterns drop
//! individual lines from an otherwise accepted file. Each kind comes in
//! two flavors: an OR group fires when any one pattern hits a line,
//! while an AND group accumulates hits across the whole file and fires
//! once every pattern has been seen. File names, directory pruning,
//! modification-time windows, and binary detection narrow the set of
//! files tested before any content is read.
//!
//! # Example
//!
//! ```rust,no_run
//! use treesift::{scan, ScanOptions, ScanResult};
//!
//! fn main() -> ScanResult<()> {
//!     let opts = ScanOptions {
//!         accept_or: vec!["TODO".to_string()],
//!         roots: vec!["src".into()],
//!         ..Default::default()
//!     };
//!     let stats = scan(&opts.compile()?)?;
//!     println!("{} files matched", stats.files_matched);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod errors;
pub mod filters;
pub mod patterns;
pub mod report;
pub mod results;
pub mod scan;

pub use config::{ScanConfig, ScanOptions};
pub use errors::{ScanError, ScanResult};
pub use report::{commaize, OutputMode, Reporter};
pub use results::{FileVerdict, FindStats, LineMatch};
pub use scan::{scan, scan_with_writer};
