/// Binary file detection over a bounded prefix sample.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::warn;

/// Reads at most `sample_size` bytes and classifies the file.
///
/// A file is binary if the sample contains a NUL byte anywhere before
/// its final byte, or contains no newline at all. Unreadable and empty
/// files are treated as binary so they are skipped rather than flagged.
pub fn is_binary(path: &Path, sample_size: usize) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("unable to open {} for classification: {}", path.display(), e);
            return true;
        }
    };

    let mut buf = Vec::with_capacity(sample_size);
    if let Err(e) = file.take(sample_size as u64).read_to_end(&mut buf) {
        warn!("unable to sample {}: {}", path.display(), e);
        return true;
    }
    if buf.is_empty() {
        return true;
    }

    // A NUL as the very last sampled byte may be a truncated multi-byte
    // sequence, so only NULs before it count.
    let last = buf.len() - 1;
    let mut has_newline = false;
    for (i, &byte) in buf.iter().enumerate() {
        if byte == 0 && i < last {
            return true;
        }
        if byte == b'\n' {
            has_newline = true;
        }
    }

    !has_newline
}
