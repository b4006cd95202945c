//! Named-file entry points.
//!
//! Writes go to a temp file in the target directory and are then renamed over
//! the destination, so readers never observe a half-written filter.

use crate::codec;
use crate::compress::{self, Compression};
use crate::errors::Result;
use crate::filter::BloomFilter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub fn write_file(
    filter: &BloomFilter,
    path: impl AsRef<Path>,
    compression: Option<&dyn Compression>,
) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new().prefix(".bloom_").tempfile_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        codec::write_to(filter, &mut w, compression)?;
        w.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    debug!(
        path = %path.display(),
        bits = filter.num_bits(),
        hashes = filter.num_hashes(),
        compressed = compression.is_some(),
        "filter written"
    );
    Ok(())
}

pub fn load_file(path: impl AsRef<Path>, compression: Option<&dyn Compression>) -> Result<BloomFilter> {
    let path = path.as_ref();
    let f = File::open(path)?;
    let filter = codec::read_from(BufReader::new(f), compression)?;
    debug!(
        path = %path.display(),
        bits = filter.num_bits(),
        hashes = filter.num_hashes(),
        compressed = compression.is_some(),
        "filter loaded"
    );
    Ok(filter)
}

impl BloomFilter {
    /// Writes the filter to `path`, creating or replacing it.
    pub fn write_file(&self, path: impl AsRef<Path>, compress: bool) -> Result<()> {
        write_file(self, path, compress::for_flag(compress))
    }

    pub fn load_file(path: impl AsRef<Path>, compress: bool) -> Result<Self> {
        load_file(path, compress::for_flag(compress))
    }
}
