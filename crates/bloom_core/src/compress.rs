//! Optional compression wrapping for serialized filters.
//!
//! The codec only sees the [`Compression`] trait; [`Zstd`] is the transform
//! selected by the boolean `compress` flag on the convenience entry points.

use std::io::{self, Read, Write};

/// A whole-stream byte transform applied around the serialized filter.
pub trait Compression {
    /// Writes the compressed form of `raw` to `sink`.
    fn compress(&self, raw: &[u8], sink: &mut dyn Write) -> io::Result<()>;

    /// Wraps `source` so that reads yield the decompressed bytes.
    fn decompressor<'a>(&self, source: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>>;
}

#[derive(Debug, Clone, Copy)]
pub struct Zstd {
    pub level: i32,
}

impl Default for Zstd {
    fn default() -> Self { DEFAULT_ZSTD }
}

impl Compression for Zstd {
    fn compress(&self, raw: &[u8], sink: &mut dyn Write) -> io::Result<()> {
        zstd::stream::copy_encode(raw, sink, self.level)
    }

    fn decompressor<'a>(&self, source: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(zstd::stream::read::Decoder::new(source)?))
    }
}

const DEFAULT_ZSTD: Zstd = Zstd { level: zstd::DEFAULT_COMPRESSION_LEVEL };
static ZSTD: Zstd = DEFAULT_ZSTD;

/// Maps the boolean wire flag to the transform it stands for.
pub fn for_flag(compress: bool) -> Option<&'static dyn Compression> {
    if compress { Some(&ZSTD) } else { None }
}
