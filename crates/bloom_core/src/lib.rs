//! Probabilistic set membership over byte strings.
//!
//! ```
//! use bloom_core::BloomFilter;
//!
//! let mut bf = BloomFilter::new(100, 0.0001)?;
//! bf.add(b"foo");
//! assert!(bf.check(b"foo"));
//!
//! let bytes = bf.to_bytes(true)?;
//! let back = BloomFilter::from_bytes(&bytes, true)?;
//! assert!(back.check(b"foo"));
//! # Ok::<(), bloom_core::BloomError>(())
//! ```
pub mod consts;
pub mod errors;
pub mod utils;
pub mod sizing;
pub mod hash;
pub mod bits;
pub mod filter;
pub mod codec;
pub mod compress;
pub mod config;
pub mod store;

pub use bits::BitArray;
pub use compress::{Compression, Zstd};
pub use config::FilterConfig;
pub use errors::{BloomError, Result};
pub use filter::BloomFilter;
pub use sizing::{size, Sizing};
