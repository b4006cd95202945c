use byteorder::{LittleEndian as LE, ReadBytesExt};
use std::io::{self, Read};

pub fn crc32(data: &[u8]) -> u32 { crc32fast::hash(data) }

/// Number of bytes needed to pack `bits` bits.
#[inline]
pub fn packed_len(bits: u64) -> usize { bits.div_ceil(8) as usize }

pub fn read_u16<R: Read + ?Sized>(r: &mut R) -> io::Result<u16> { r.read_u16::<LE>() }
pub fn read_u32<R: Read + ?Sized>(r: &mut R) -> io::Result<u32> { r.read_u32::<LE>() }
pub fn read_u64<R: Read + ?Sized>(r: &mut R) -> io::Result<u64> { r.read_u64::<LE>() }
pub fn read_f64<R: Read + ?Sized>(r: &mut R) -> io::Result<f64> { r.read_f64::<LE>() }
