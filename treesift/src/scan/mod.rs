/// The concurrent scan pipeline: traversal, bounded dispatch, and
/// per-file evaluation.
pub mod engine;
pub mod evaluator;
pub mod pool;
pub mod walker;

pub use engine::{scan, scan_with_writer};
