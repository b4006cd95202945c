//! Capacity-to-size math: (n, p) -> (m, k).
//!
//!   m = ceil(-(n * ln p) / (ln 2)^2), at least 1
//!   k = round((m / n) * ln 2), at least 1

use crate::consts::{MAX_NUM_BITS, MAX_NUM_HASHES, MIN_NUM_BITS, MIN_NUM_HASHES};
use crate::errors::{BloomError, Result};
use std::f64::consts::LN_2;

/// Bit-array length and probe count derived from a capacity and target rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    pub num_bits: u64,
    pub num_hashes: u32,
}

/// Computes the optimal (m, k) for `n` expected elements at false-positive rate `p`.
///
/// Fails with [`BloomError::InvalidParameter`] when:
/// - `n == 0`;
/// - `p` is not strictly between 0 and 1;
/// - the derived `m` exceeds [`MAX_NUM_BITS`] or `k` exceeds [`MAX_NUM_HASHES`].
///   Such filters could not be written in the v1 format, so e.g. `(2^36, 0.01)`
///   and `(1, 1e-320)` are rejected even though both inputs are in range.
pub fn size(n: u64, p: f64) -> Result<Sizing> {
    if n == 0 {
        return Err(BloomError::InvalidParameter("capacity must be greater than 0".into()));
    }
    if !(p > 0.0 && p < 1.0) {
        return Err(BloomError::InvalidParameter(format!(
            "false-positive rate must be in (0, 1), got {p}"
        )));
    }

    let n = n as f64;
    let bits = (-(n * p.ln()) / (LN_2 * LN_2)).ceil().max(MIN_NUM_BITS as f64);
    if bits > MAX_NUM_BITS as f64 {
        return Err(BloomError::InvalidParameter(format!(
            "filter would need {bits} bits, limit is {MAX_NUM_BITS}"
        )));
    }
    let num_bits = bits as u64;

    let hashes = ((num_bits as f64 / n) * LN_2).round().max(MIN_NUM_HASHES as f64);
    if hashes > MAX_NUM_HASHES as f64 {
        return Err(BloomError::InvalidParameter(format!(
            "filter would need {hashes} hash probes, limit is {MAX_NUM_HASHES}"
        )));
    }

    Ok(Sizing { num_bits, num_hashes: hashes as u32 })
}
