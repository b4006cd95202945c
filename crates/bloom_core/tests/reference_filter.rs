use bloom_core::{BloomError, BloomFilter};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use tempfile::tempdir;

const REFERENCE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata/reference.bloom");

fn check_results(bf: &BloomFilter) {
    for v in ["foo", "bar", "baz"] {
        assert!(bf.check(v.as_bytes()), "value {v} expected in filter but wasn't found");
    }
    assert!(!bf.check(b""), "empty value not expected in filter but was found");
    assert!(!bf.check(b"12345"), "missing value not expected in filter but was found");
}

fn same_filter(a: &BloomFilter, b: &BloomFilter) {
    assert_eq!(a.capacity(), b.capacity());
    assert_eq!(a.target_fp_rate(), b.target_fp_rate());
    assert_eq!(a.num_bits(), b.num_bits());
    assert_eq!(a.num_hashes(), b.num_hashes());
    for key in ["foo", "bar", "baz", "", "12345", "qux", "a longer key value"] {
        assert_eq!(a.check(key.as_bytes()), b.check(key.as_bytes()), "{key:?}");
    }
}

#[test]
fn reference_file_from_reader() {
    let f = File::open(REFERENCE).unwrap();
    let bf = BloomFilter::from_reader(f, false).unwrap();
    assert_eq!((bf.capacity(), bf.num_bits(), bf.num_hashes()), (100, 1918, 13));
    check_results(&bf);
}

// Values printed by testdata/gen_reference.py when it wrote the file.
const REFERENCE_CRC: u32 = 0xd042_5c45;
const REFERENCE_SET_BITS: u32 = 39;
const FOO_BITS: [u64; 13] = [90, 1743, 1478, 1701, 1436, 1171, 1394, 1129, 864, 1087, 822, 557, 780];

#[test]
fn reference_file_layout_matches_generator() {
    let raw = fs::read(REFERENCE).unwrap();
    assert_eq!(raw.len(), 40 + 240);
    assert_eq!(&raw[0..4], b"BLMF");
    assert_eq!(u64::from_le_bytes(raw[24..32].try_into().unwrap()), 1918);
    assert_eq!(u32::from_le_bytes(raw[32..36].try_into().unwrap()), 13);
    assert_eq!(u32::from_le_bytes(raw[36..40].try_into().unwrap()), REFERENCE_CRC);

    let payload = &raw[40..];
    assert_eq!(payload.iter().map(|b| b.count_ones()).sum::<u32>(), REFERENCE_SET_BITS);
    for bit in FOO_BITS {
        assert_ne!(payload[(bit / 8) as usize] & (1 << (bit % 8)), 0, "bit {bit}");
    }
    assert_eq!(bloom_core::hash::probe(b"foo", 13, 1918).collect::<Vec<_>>(), FOO_BITS);
}

#[test]
fn reference_file_matches_fresh_build() {
    let mut fresh = BloomFilter::new(100, 0.0001).unwrap();
    for v in ["foo", "bar", "baz"] {
        fresh.add(v.as_bytes());
    }
    let on_disk = fs::read(REFERENCE).unwrap();
    assert_eq!(fresh.to_bytes(false).unwrap(), on_disk);
}

#[test]
fn stream_bytes_and_file_agree() {
    let bytes = fs::read(REFERENCE).unwrap();
    let from_stream = BloomFilter::from_reader(File::open(REFERENCE).unwrap(), false).unwrap();
    let from_bytes = BloomFilter::from_bytes(&bytes, false).unwrap();
    let from_file = BloomFilter::load_file(REFERENCE, false).unwrap();
    same_filter(&from_stream, &from_bytes);
    same_filter(&from_stream, &from_file);
    check_results(&from_file);
}

fn serialized_roundtrip(compress: bool) {
    let mut bf = BloomFilter::new(100, 0.0001).unwrap();
    for v in ["foo", "bar", "baz"] {
        bf.add(v.as_bytes());
    }
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("test.bloom");
    bf.write_file(&path, compress).unwrap();

    let loaded = BloomFilter::load_file(&path, compress).unwrap();
    check_results(&loaded);
    assert_eq!(loaded, bf);

    let raw = fs::read(&path).unwrap();
    same_filter(&loaded, &BloomFilter::from_bytes(&raw, compress).unwrap());
    same_filter(&loaded, &BloomFilter::from_reader(&raw[..], compress).unwrap());
}

#[test]
fn from_serialized() {
    serialized_roundtrip(false);
}

#[test]
fn from_serialized_zstd() {
    serialized_roundtrip(true);
}

#[test]
fn truncated_payload_is_corrupt() {
    let bytes = fs::read(REFERENCE).unwrap();
    for cut in [1, 2, 100, 240, bytes.len() - 1] {
        let short = &bytes[..bytes.len() - cut];
        assert!(
            matches!(BloomFilter::from_bytes(short, false), Err(BloomError::CorruptData(_))),
            "cut {cut}"
        );
    }
}

#[test]
fn truncated_compressed_stream_is_corrupt() {
    let bf = BloomFilter::load_file(REFERENCE, false).unwrap();
    let packed = bf.to_bytes(true).unwrap();
    for cut in [1, packed.len() / 2, packed.len() - 1] {
        let short = &packed[..packed.len() - cut];
        assert!(
            matches!(BloomFilter::from_bytes(short, true), Err(BloomError::CorruptData(_))),
            "cut {cut}"
        );
    }
}

#[test]
fn from_reader_over_http() {
    let body = fs::read(REFERENCE).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut req = BufReader::new(conn.try_clone().unwrap());
        let mut line = String::new();
        while req.read_line(&mut line).unwrap() > 2 {
            line.clear();
        }
        write!(conn, "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len()).unwrap();
        conn.write_all(&body).unwrap();
    });

    let mut conn = std::net::TcpStream::connect(addr).unwrap();
    write!(conn, "GET /test.bloom HTTP/1.1\r\nHost: {addr}\r\n\r\n").unwrap();
    let mut resp = BufReader::new(conn);
    let mut len = 0u64;
    let mut line = String::new();
    loop {
        line.clear();
        resp.read_line(&mut line).unwrap();
        if line == "\r\n" {
            break;
        }
        if let Some(v) = line.strip_prefix("Content-Length: ") {
            len = v.trim().parse().unwrap();
        }
    }
    let bf = BloomFilter::from_reader(resp.take(len), false).unwrap();
    check_results(&bf);
    server.join().unwrap();
}
