//! Fixed-length packed bit array.
//!
//! Bit `i` lives in byte `i / 8` under mask `1 << (i % 8)` (LSB-first within
//! each byte). This ordering is part of the serialized format.

use crate::errors::{BloomError, Result};
use crate::utils::packed_len;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitArray {
    len: u64,
    bytes: Vec<u8>,
}

impl BitArray {
    /// All-zero array of `len` bits.
    pub fn new(len: u64) -> Self {
        Self { len, bytes: vec![0u8; packed_len(len)] }
    }

    /// Restores an array from its packed bytes.
    ///
    /// `bytes` must be exactly `ceil(len / 8)` long and every padding bit above
    /// `len` in the final byte must be clear.
    pub fn from_raw(bytes: Vec<u8>, len: u64) -> Result<Self> {
        let want = packed_len(len);
        if bytes.len() != want {
            return Err(BloomError::CorruptData(format!(
                "bit array of {len} bits needs {want} bytes, got {}",
                bytes.len()
            )));
        }
        let tail = (len % 8) as u32;
        if tail != 0 {
            let padding = 0xffu8 << tail;
            if bytes[want - 1] & padding != 0 {
                return Err(BloomError::CorruptData("padding bits set past end of bit array".into()));
            }
        }
        Ok(Self { len, bytes })
    }

    /// Number of addressable bits.
    #[inline]
    pub fn bit_len(&self) -> u64 { self.len }

    /// Packed representation, `ceil(bit_len / 8)` bytes.
    #[inline]
    pub fn raw(&self) -> &[u8] { &self.bytes }

    pub fn set(&mut self, index: u64) -> Result<()> {
        self.check_index(index)?;
        self.insert(index);
        Ok(())
    }

    pub fn test(&self, index: u64) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.contains(index))
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> u64 {
        self.bytes.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// ORs `other` into `self`. Both arrays must have the same length.
    pub fn union_with(&mut self, other: &BitArray) -> Result<()> {
        if self.len != other.len {
            return Err(BloomError::Incompatible(format!(
                "bit arrays differ in length ({} vs {})",
                self.len, other.len
            )));
        }
        for (dst, src) in self.bytes.iter_mut().zip(&other.bytes) {
            *dst |= *src;
        }
        Ok(())
    }

    #[inline]
    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.len {
            return Err(BloomError::IndexOutOfRange { index, len: self.len });
        }
        Ok(())
    }

    // Unchecked variants for callers whose indices are already reduced mod len.
    #[inline]
    pub(crate) fn insert(&mut self, index: u64) {
        debug_assert!(index < self.len);
        let idx = (index / 8) as usize; let off = (index & 7) as u8;
        self.bytes[idx] |= 1u8 << off;
    }

    #[inline]
    pub(crate) fn contains(&self, index: u64) -> bool {
        debug_assert!(index < self.len);
        let idx = (index / 8) as usize; let off = (index & 7) as u8;
        (self.bytes[idx] & (1u8 << off)) != 0
    }
}
