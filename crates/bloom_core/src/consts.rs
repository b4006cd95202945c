// crates/bloom_core/src/consts.rs

pub const MAGIC_FILTER: &[u8; 4] = b"BLMF";
pub const VERSION: u16 = 1;

/// magic(4) version(2) flags(2) n(8) p(8) m(8) k(4) crc32(4)
pub const HDR_SIZE: usize = 40;

pub const MIN_NUM_BITS: u64 = 1;
pub const MAX_NUM_BITS: u64 = 1 << 38;
pub const MIN_NUM_HASHES: u32 = 1;
pub const MAX_NUM_HASHES: u32 = 1024;

const _: () = { assert!(4 + 2 + 2 + 8 + 8 + 8 + 4 + 4 == HDR_SIZE); };
