//! Bloom filter engine: sized from (n, p), probed with double hashing.
use crate::bits::BitArray;
use crate::config::FilterConfig;
use crate::errors::{BloomError, Result};
use crate::hash::{probe, Probes};
use crate::sizing;

/// A fixed-size probabilistic set of byte strings.
///
/// `check` never returns `false` for an element that was added. It returns
/// `true` for an element that was never added with probability close to the
/// target rate `p` once about `n` elements are in, and higher beyond that.
///
/// Mutation takes `&mut self`; share a filter between writers behind a lock.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    n: u64,
    p: f64,
    k: u32,
    bits: BitArray,
}

impl BloomFilter {
    /// Sizes and allocates an empty filter for `n` elements at false-positive rate `p`.
    pub fn new(n: u64, p: f64) -> Result<Self> {
        let s = sizing::size(n, p)?;
        Ok(Self { n, p, k: s.num_hashes, bits: BitArray::new(s.num_bits) })
    }

    pub fn from_config(cfg: &FilterConfig) -> Result<Self> {
        cfg.validate()?;
        Self::new(cfg.capacity, cfg.fp_rate)
    }

    /// Reassembles a filter from decoded parts; the codec validates them first.
    pub(crate) fn from_parts(n: u64, p: f64, k: u32, bits: BitArray) -> Self {
        Self { n, p, k, bits }
    }

    #[inline]
    fn probes(&self, data: &[u8]) -> Probes {
        probe(data, self.k, self.bits.bit_len())
    }

    pub fn add(&mut self, data: &[u8]) {
        for bit in self.probes(data) {
            self.bits.insert(bit);
        }
    }

    pub fn check(&self, data: &[u8]) -> bool {
        self.probes(data).all(|bit| self.bits.contains(bit))
    }

    /// Inserts `data` and reports whether it was possibly present before.
    pub fn check_and_add(&mut self, data: &[u8]) -> bool {
        let mut present = true;
        for bit in self.probes(data) {
            present &= self.bits.contains(bit);
            self.bits.insert(bit);
        }
        present
    }

    /// Filters can only be merged when they share `m` and `k`.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.num_bits() == other.num_bits() && self.k == other.k
    }

    /// ORs `other` into this filter. Afterwards `check` is true for every
    /// element added to either.
    pub fn union(&mut self, other: &BloomFilter) -> Result<()> {
        if !self.is_compatible(other) {
            return Err(BloomError::Incompatible(format!(
                "m={} k={} vs m={} k={}",
                self.num_bits(), self.k, other.num_bits(), other.k
            )));
        }
        self.bits.union_with(&other.bits)
    }

    /// Expected element count `n` the filter was sized for.
    pub fn capacity(&self) -> u64 { self.n }
    /// Target false-positive rate `p` at capacity.
    pub fn target_fp_rate(&self) -> f64 { self.p }
    /// Bit-array length `m`.
    pub fn num_bits(&self) -> u64 { self.bits.bit_len() }
    /// Probes per element `k`.
    pub fn num_hashes(&self) -> u32 { self.k }
    pub fn bits(&self) -> &BitArray { &self.bits }

    pub fn bits_set(&self) -> u64 { self.bits.count_ones() }

    /// Fraction of bits that are set, in [0, 1].
    pub fn fill_ratio(&self) -> f64 {
        self.bits_set() as f64 / self.num_bits() as f64
    }

    /// False-positive probability implied by the current fill: `fill_ratio^k`.
    pub fn current_fp_rate(&self) -> f64 {
        self.fill_ratio().powi(self.k as i32)
    }
}
