//! Filter wire format (v1) & IO
//!
//! Header (LE, 40 bytes):
//!   magic[4]   = "BLMF"
//!   version[2] = 1
//!   flags[2]   = 0 (reserved)
//!   n[8]       = expected element count
//!   p[8]       = target false-positive rate (f64 bits)
//!   m[8]       = bit-array length in bits
//!   k[4]       = probes per element
//!   crc[4]     = crc32(payload)
//!
//! Payload: ceil(m/8) bytes of packed bits (see `bits`).
//!
//! The whole header+payload may be wrapped by a [`Compression`] transform.

use crate::bits::BitArray;
use crate::compress::{self, Compression};
use crate::consts::{HDR_SIZE, MAGIC_FILTER, MAX_NUM_BITS, MAX_NUM_HASHES, MIN_NUM_BITS, MIN_NUM_HASHES, VERSION};
use crate::errors::{BloomError, Result};
use crate::filter::BloomFilter;
use crate::utils::{crc32, packed_len, read_f64, read_u16, read_u32, read_u64};
use std::fmt;
use std::io::{self, Read, Write};

// Upper bound on the up-front payload allocation; larger payloads grow as bytes arrive.
const PREALLOC_LIMIT: usize = 1 << 20;

/// Encodes `filter` as header followed by payload, uncompressed.
pub fn encode(filter: &BloomFilter) -> Vec<u8> {
    let payload = filter.bits().raw();
    let mut buf = Vec::with_capacity(HDR_SIZE + payload.len());
    buf.extend_from_slice(MAGIC_FILTER);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&filter.capacity().to_le_bytes());
    buf.extend_from_slice(&filter.target_fp_rate().to_le_bytes());
    buf.extend_from_slice(&filter.num_bits().to_le_bytes());
    buf.extend_from_slice(&filter.num_hashes().to_le_bytes());
    buf.extend_from_slice(&crc32(payload).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

pub fn serialize(filter: &BloomFilter, compression: Option<&dyn Compression>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_to(filter, &mut out, compression)?;
    Ok(out)
}

pub fn write_to<W: Write>(filter: &BloomFilter, mut writer: W, compression: Option<&dyn Compression>) -> Result<()> {
    let raw = encode(filter);
    match compression {
        Some(c) => c.compress(&raw, &mut writer)?,
        None => writer.write_all(&raw)?,
    }
    writer.flush()?;
    Ok(())
}

/// Reads one filter from a streaming source, consuming exactly the header and payload.
///
/// With a compression transform the decompressor may buffer past the end of the
/// frame, and any bytes after the frame are ignored.
pub fn read_from<'a, R: Read + 'a>(mut reader: R, compression: Option<&dyn Compression>) -> Result<BloomFilter> {
    match compression {
        None => decode(&mut reader),
        Some(c) => {
            let mut inner = c.decompressor(Box::new(TaggedSource(reader))).map_err(classify)?;
            decode(&mut inner).map_err(|e| match e {
                BloomError::Io(io) => classify(io),
                other => other,
            })
        }
    }
}

pub fn from_bytes(bytes: &[u8], compression: Option<&dyn Compression>) -> Result<BloomFilter> {
    read_from(bytes, compression)
}

/// Marks an error as raised by the caller's source rather than the decompressor.
#[derive(Debug)]
struct SourceError(io::Error);

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.0) }
}

struct TaggedSource<R>(R);

impl<R: Read> Read for TaggedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| io::Error::new(e.kind(), SourceError(e)))
    }
}

// Source failures pass through as `Io`; anything the decompressor raised is corruption.
fn classify(e: io::Error) -> BloomError {
    if !e.get_ref().is_some_and(|inner| inner.is::<SourceError>()) {
        return BloomError::CorruptData(format!("decompression failed: {e}"));
    }
    match e.into_inner().map(|inner| inner.downcast::<SourceError>()) {
        Some(Ok(src)) => BloomError::Io(src.0),
        _ => BloomError::CorruptData("decompression failed".into()),
    }
}

fn read_err(what: &'static str) -> impl Fn(io::Error) -> BloomError {
    move |e| match e.kind() {
        io::ErrorKind::UnexpectedEof => BloomError::CorruptData(format!("stream ended inside {what}")),
        io::ErrorKind::InvalidData => BloomError::CorruptData(format!("{what}: {e}")),
        _ => BloomError::Io(e),
    }
}

struct Header {
    n: u64,
    p: f64,
    m: u64,
    k: u32,
    crc: u32,
}

fn read_header<R: Read + ?Sized>(r: &mut R) -> Result<Header> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(read_err("header"))?;
    if &magic != MAGIC_FILTER {
        return Err(BloomError::CorruptData("bad magic".into()));
    }
    let version = read_u16(r).map_err(read_err("header"))?;
    if version != VERSION {
        return Err(BloomError::CorruptData(format!("unsupported version {version}")));
    }
    let flags = read_u16(r).map_err(read_err("header"))?;
    if flags != 0 {
        return Err(BloomError::CorruptData(format!("unknown header flags {flags:#06x}")));
    }
    let n = read_u64(r).map_err(read_err("header"))?;
    let p = read_f64(r).map_err(read_err("header"))?;
    let m = read_u64(r).map_err(read_err("header"))?;
    let k = read_u32(r).map_err(read_err("header"))?;
    let crc = read_u32(r).map_err(read_err("header"))?;

    if n == 0 {
        return Err(BloomError::CorruptData("capacity is zero".into()));
    }
    if !(p > 0.0 && p < 1.0) {
        return Err(BloomError::CorruptData(format!("false-positive rate {p} outside (0, 1)")));
    }
    if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&m) {
        return Err(BloomError::CorruptData(format!("bit count {m} outside [{MIN_NUM_BITS}, {MAX_NUM_BITS}]")));
    }
    if !(MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&k) {
        return Err(BloomError::CorruptData(format!("hash count {k} outside [{MIN_NUM_HASHES}, {MAX_NUM_HASHES}]")));
    }
    Ok(Header { n, p, m, k, crc })
}

fn decode<R: Read + ?Sized>(r: &mut R) -> Result<BloomFilter> {
    let hdr = read_header(r)?;

    let want = packed_len(hdr.m);
    let mut payload = Vec::with_capacity(want.min(PREALLOC_LIMIT));
    r.take(want as u64).read_to_end(&mut payload).map_err(read_err("payload"))?;
    if payload.len() != want {
        return Err(BloomError::CorruptData(format!(
            "payload truncated: expected {want} bytes, got {}",
            payload.len()
        )));
    }
    if crc32(&payload) != hdr.crc {
        return Err(BloomError::CorruptData("payload checksum mismatch".into()));
    }

    let bits = BitArray::from_raw(payload, hdr.m)?;
    Ok(BloomFilter::from_parts(hdr.n, hdr.p, hdr.k, bits))
}

/// Boolean-flag entry points; `compress = true` selects zstd.
impl BloomFilter {
    pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>> {
        serialize(self, compress::for_flag(compress))
    }

    pub fn write_to<W: Write>(&self, writer: W, compress: bool) -> Result<()> {
        write_to(self, writer, compress::for_flag(compress))
    }

    pub fn from_reader<'a, R: Read + 'a>(reader: R, compress: bool) -> Result<Self> {
        read_from(reader, compress::for_flag(compress))
    }

    pub fn from_bytes(bytes: &[u8], compress: bool) -> Result<Self> {
        from_bytes(bytes, compress::for_flag(compress))
    }
}
