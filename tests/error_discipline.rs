// Error taxonomy and latching discipline, driven through the public facade:
// fail-fast, sticky until reset, no trailer after a latched error.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;

use gzsplice::{Error, GzipStreamWriter};

/// Sink that accepts `budget` bytes, then fails every write.
struct QuotaSink {
    written: Vec<u8>,
    budget: usize,
}

impl QuotaSink {
    fn new(budget: usize) -> Self {
        QuotaSink {
            written: Vec::new(),
            budget,
        }
    }
}

impl Write for QuotaSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() + buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::Other, "quota exhausted"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn invalid_level_fails_construction() {
    for level in [-3, 10, 100, i32::MIN, i32::MAX] {
        match GzipStreamWriter::with_level(Vec::new(), level) {
            Err(Error::InvalidLevel(reported)) => assert_eq!(reported, level),
            other => panic!("level {level}: expected InvalidLevel, got {:?}", other.is_ok()),
        }
    }
}

#[test]
fn malformed_blobs_latch() {
    let cases: &[&[u8]] = &[
        b"",              // empty
        b"way too short", // under the 18-byte minimum
        &[0x1f; 18],      // right length, wrong magic
        // Valid magic/method, FNAME flagged, but no NUL before the trailer:
        &[0x1f, 0x8b, 0x08, 0x08, 0, 0, 0, 0, 0, 255, b'n', b'o', 0, 0, 0, 0, 0, 0, 0, 0],
    ];
    for (idx, blob) in cases.iter().enumerate() {
        let mut z = GzipStreamWriter::new(Vec::new());
        assert!(
            matches!(z.write_compressed(blob), Err(Error::InvalidBlob)),
            "case {idx}"
        );
        // Latched for all subsequent operations.
        assert!(matches!(z.write_raw(b"x"), Err(Error::InvalidBlob)));
        assert!(matches!(z.close(), Err(Error::InvalidBlob)));
    }
}

#[test]
fn sink_failure_mid_stream_latches_and_close_returns_it() {
    // Enough quota for the header, not for the body flush at close.
    let mut z = GzipStreamWriter::with_level(QuotaSink::new(10), 0).unwrap();
    // Level 0 emits stored blocks; a large write overflows the quota
    // either during the write or at close.
    let big = vec![0u8; 256 * 1024];
    let write_err = z.write_raw(&big).err();
    let close_err = z.close().err();
    let latched = write_err.or(close_err).expect("quota must trip somewhere");
    assert!(
        matches!(latched, Error::Sink(ref inner) if inner.to_string().contains("quota exhausted"))
    );
    // After latching, close keeps returning the same error and emits nothing.
    assert!(matches!(z.close(), Err(Error::Sink(_))));
}

#[test]
fn no_trailer_after_latched_error() {
    let mut z = GzipStreamWriter::new(Vec::new());
    z.write_raw(b"good data").unwrap();
    z.write_compressed(b"not a gzip blob").unwrap_err();
    z.close().unwrap_err();
    let out = z.reset(Vec::new());
    // Whatever reached the destination, it must not parse as a complete
    // member: the trailer was withheld.
    let mut dec = GzDecoder::new(out.as_slice());
    let mut content = Vec::new();
    assert!(
        dec.read_to_end(&mut content).is_err(),
        "latched writer must not have emitted a valid member"
    );
}

#[test]
fn reset_after_sink_failure_reuses_the_writer() {
    let mut z = GzipStreamWriter::with_level(QuotaSink::new(4), 6).unwrap();
    z.write_raw(b"spill").unwrap_err();

    let _broken = z.reset(QuotaSink::new(1 << 20));
    z.write_raw(b"recovered").unwrap();
    z.close().unwrap();
    let healthy = z.reset(QuotaSink::new(0));
    let mut content = Vec::new();
    GzDecoder::new(healthy.written.as_slice())
        .read_to_end(&mut content)
        .unwrap();
    assert_eq!(content, b"recovered");
}

#[test]
fn error_source_chain_preserved() {
    let mut z = GzipStreamWriter::with_level(QuotaSink::new(0), 6).unwrap();
    let err = z.write_raw(b"x").unwrap_err();
    let source = std::error::Error::source(&err).expect("sink error carries a source");
    assert!(source.to_string().contains("quota exhausted"));
}
