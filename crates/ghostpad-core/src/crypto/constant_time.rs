//! Constant-time string comparison
//!
//! The loop always runs to the longer input's length and folds every
//! character pair into an accumulator, so running time depends only on the
//! lengths and never on where the first mismatch sits.

use std::hint::black_box;

/// Compare two strings without early exit on the first differing byte
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    constant_time_eq_counted(a, b).0
}

/// [`constant_time_eq`] that also reports how many per-character steps ran
pub fn constant_time_eq_counted(a: &str, b: &str) -> (bool, usize) {
    let a = a.as_bytes();
    let b = b.as_bytes();

    let mut diff = a.len() ^ b.len();
    let max_len = a.len().max(b.len());
    let mut steps = 0usize;

    for i in 0..max_len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(black_box(x ^ y));
        steps += 1;
    }

    (black_box(diff) == 0, steps)
}
