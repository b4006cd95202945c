//! Probe index generation (Kirsch–Mitzenmacher double hashing).
//!
//! Wire contract, shared by every reader and writer of the v1 format:
//!   d  = BLAKE3-256(data)
//!   h1 = u64 LE of d[0..8], h2 = u64 LE of d[8..16]
//!   probe(i) = (h1 + i * h2) mod 2^64 mod m, for i in 0..k

/// The two base hashes every probe sequence is derived from.
#[inline]
pub fn base_hashes(data: &[u8]) -> (u64, u64) {
    let dig = blake3::hash(data);
    let dig = dig.as_bytes();
    let mut h1 = [0u8; 8];
    let mut h2 = [0u8; 8];
    h1.copy_from_slice(&dig[0..8]);
    h2.copy_from_slice(&dig[8..16]);
    (u64::from_le_bytes(h1), u64::from_le_bytes(h2))
}

/// Returns the `k` bit indices in `[0, m)` that `data` maps to.
///
/// # Panics
///
/// Panics if `m` is zero.
pub fn probe(data: &[u8], k: u32, m: u64) -> Probes {
    assert!(m > 0, "probe target must have at least one bit");
    let (h1, h2) = base_hashes(data);
    Probes { h1, h2, m, i: 0, k }
}

/// Iterator over the probe indices of one element.
#[derive(Debug, Clone)]
pub struct Probes {
    h1: u64,
    h2: u64,
    m: u64,
    i: u32,
    k: u32,
}

impl Iterator for Probes {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        if self.i >= self.k {
            return None;
        }
        let idx = self.h1.wrapping_add((self.i as u64).wrapping_mul(self.h2)) % self.m;
        self.i += 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.k - self.i) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Probes {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_hashes_of_empty_input() {
        // BLAKE3("") = af1349b9f5f9a1a6 a0404dea36dcc949 ...
        assert_eq!(base_hashes(b""), (0xa6a1_f9f5_b949_13af, 0x49c9_dc36_ea4d_40a0));
    }

    #[test]
    fn golden_probe_sequences() {
        assert_eq!(probe(b"", 4, 1000).collect::<Vec<_>>(), vec![863, 111, 743, 991]);
        assert_eq!(
            probe(b"foo", 13, 1918).collect::<Vec<_>>(),
            vec![90, 1743, 1478, 1701, 1436, 1171, 1394, 1129, 864, 1087, 822, 557, 780]
        );
    }

    #[test]
    fn yields_exactly_k_indices_in_range() {
        let p = probe(b"some element", 17, 61);
        assert_eq!(p.len(), 17);
        let all: Vec<u64> = p.collect();
        assert_eq!(all.len(), 17);
        assert!(all.iter().all(|&i| i < 61));
    }

    #[test]
    fn single_bit_filter_always_probes_zero() {
        assert!(probe(b"x", 5, 1).all(|i| i == 0));
    }

    #[test]
    fn deterministic_per_input() {
        let a: Vec<u64> = probe(b"abc", 9, 4096).collect();
        let b: Vec<u64> = probe(b"abc", 9, 4096).collect();
        let c: Vec<u64> = probe(b"abd", 9, 4096).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    #[should_panic]
    fn zero_bits_is_a_programming_error() {
        let _ = probe(b"x", 1, 0);
    }
}
