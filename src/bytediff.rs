// Byte-level delta between two calibration images.
//
// Images are fixed-offset: a changed cell stays at its offset, so the diff
// is a single linear scan over compared offsets with no realignment search.
// A post-pass merges adjacent changed offsets into contiguous runs for
// human-readable summaries.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Strict comparison was requested on images of differing length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("image lengths differ ({len_a} vs {len_b} bytes)")]
pub struct LengthMismatchError {
    pub len_a: usize,
    pub len_b: usize,
}

// ---------------------------------------------------------------------------
// Result model
// ---------------------------------------------------------------------------

/// One differing offset: the byte in each image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteChange {
    pub offset: usize,
    pub before: u8,
    pub after: u8,
}

/// A maximal contiguous range of differing offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffRun {
    pub start: usize,
    pub len: usize,
}

impl DiffRun {
    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Outcome of a byte-level comparison. Change offsets are strictly
/// increasing and unique; `runs` is derived from `changes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteDelta {
    pub changes: Vec<ByteChange>,
    pub runs: Vec<DiffRun>,
    pub len_a: usize,
    pub len_b: usize,
    /// Number of offsets actually compared (the overlapping prefix).
    pub compared: usize,
    /// Set when the inputs had different lengths (non-strict mode only;
    /// strict mode fails instead).
    pub length_mismatch: bool,
}

impl ByteDelta {
    /// True when the images are byte-identical, lengths included.
    pub fn is_identical(&self) -> bool {
        self.changes.is_empty() && !self.length_mismatch
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Compare two images offset by offset.
///
/// With `strict` set, differing lengths fail with [`LengthMismatchError`].
/// Otherwise only the overlapping prefix is compared and the mismatch is
/// recorded in the result. `diff_bytes(a, a, _)` always yields zero changes,
/// and swapping the arguments preserves the changed-offset set (before and
/// after values swap).
pub fn diff_bytes(a: &[u8], b: &[u8], strict: bool) -> Result<ByteDelta, LengthMismatchError> {
    if strict && a.len() != b.len() {
        return Err(LengthMismatchError {
            len_a: a.len(),
            len_b: b.len(),
        });
    }

    let compared = a.len().min(b.len());
    let mut changes = Vec::new();
    for offset in 0..compared {
        if a[offset] != b[offset] {
            changes.push(ByteChange {
                offset,
                before: a[offset],
                after: b[offset],
            });
        }
    }

    let runs = merge_runs(&changes);
    log::debug!(
        "byte diff: {} change(s) in {} run(s) over {compared} compared offset(s)",
        changes.len(),
        runs.len()
    );

    Ok(ByteDelta {
        len_a: a.len(),
        len_b: b.len(),
        compared,
        length_mismatch: a.len() != b.len(),
        changes,
        runs,
    })
}

fn merge_runs(changes: &[ByteChange]) -> Vec<DiffRun> {
    let mut runs: Vec<DiffRun> = Vec::new();
    for change in changes {
        match runs.last_mut() {
            Some(run) if run.end() == change.offset => run.len += 1,
            _ => runs.push(DiffRun {
                start: change.offset,
                len: 1,
            }),
        }
    }
    runs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
