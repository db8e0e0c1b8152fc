//! The streaming writer: one gzip member assembled from raw payloads
//! compressed in-line and donor blobs spliced in verbatim.
//!
//! # State machine
//!
//! Three flags drive sequencing: `header_written` (the member header goes
//! out lazily, on the first operation), `deflate_active` (the DEFLATE sink
//! holds an open block that must be sync-flushed before a splice can be
//! byte-aligned), and `closed` (terminal; close is idempotent). A fourth,
//! `spliced_last`, records whether the most recent body bytes came from a
//! splice — a spliced blob's final block carries BFINAL = 1, so the close
//! path must not append compressor output after it, and a raw write that
//! follows a splice starts a fresh compressor segment. `spliced_last`
//! implies `!deflate_active`.
//!
//! # Error latching
//!
//! The first error observed by any operation is latched; every subsequent
//! call short-circuits with the same error until [`GzipStreamWriter::reset`].
//! Partial output may already be at the destination when an error latches;
//! callers must treat it as corrupt.

use std::io::Write;

use crate::blob::parse_blob;
use crate::crc32::{crc32_combine, crc32_update};
use crate::deflate::DeflateSink;
use crate::error::Error;
use crate::header::GzipHeader;
use crate::{BEST_COMPRESSION, DEFAULT_COMPRESSION, HUFFMAN_ONLY};

/// Writers that accept complete gzip members and splice their payload into
/// an output stream without recompression.
pub trait WriteCompressed {
    /// Splice one complete gzip member; returns the number of payload bytes
    /// emitted to the destination.
    fn write_compressed(&mut self, blob: &[u8]) -> Result<usize, Error>;
}

/// A streaming gzip writer producing exactly one member per lifetime (or
/// per reset), fed by raw writes and spliced donor blobs in any order.
///
/// Not safe for concurrent use; pool instances across threads with external
/// synchronisation.
pub struct GzipStreamWriter<W: Write> {
    /// Destination sink; `Option` so [`finish`](Self::finish) can return it.
    dest: Option<W>,
    /// DEFLATE sink, created lazily alongside the header and cached across
    /// resets.
    deflate: Option<DeflateSink>,
    level: i32,
    header: GzipHeader,
    /// Running CRC32 of the decompressed concatenation.
    crc: u32,
    /// Running decompressed length mod 2³².
    isize: u32,
    latched: Option<Error>,
    header_written: bool,
    closed: bool,
    deflate_active: bool,
    spliced_last: bool,
}

impl<W: Write> GzipStreamWriter<W> {
    /// Create a writer with the default compression level.
    pub fn new(dest: W) -> Self {
        Self::with_level(dest, DEFAULT_COMPRESSION)
            .expect("default compression level is in range")
    }

    /// Create a writer with a specific compression level.
    ///
    /// Levels outside `[HUFFMAN_ONLY, BEST_COMPRESSION]` are rejected with
    /// [`Error::InvalidLevel`].
    pub fn with_level(dest: W, level: i32) -> Result<Self, Error> {
        if !(HUFFMAN_ONLY..=BEST_COMPRESSION).contains(&level) {
            return Err(Error::InvalidLevel(level));
        }
        Ok(GzipStreamWriter {
            dest: Some(dest),
            deflate: None,
            level,
            header: GzipHeader::default(),
            crc: 0,
            isize: 0,
            latched: None,
            header_written: false,
            closed: false,
            deflate_active: false,
            spliced_last: false,
        })
    }

    // ── Header configuration ─────────────────────────────────────────────────
    // Setters apply only before the header has gone out; afterwards they are
    // silently ignored — the emitted member reflects the values at first use.

    /// Set the modification time (unix seconds; 0 = unset).
    pub fn set_mtime(&mut self, mtime: u32) {
        if !self.header_written {
            self.header.mtime = mtime;
        }
    }

    /// Set the OS byte (default 255 = unknown).
    pub fn set_os(&mut self, os: u8) {
        if !self.header_written {
            self.header.os = os;
        }
    }

    /// Set the extra field (at most 65 535 bytes; checked at emission).
    pub fn set_extra(&mut self, extra: Vec<u8>) {
        if !self.header_written {
            self.header.extra = Some(extra);
        }
    }

    /// Set the original-name field (Latin-1; checked at emission).
    pub fn set_name(&mut self, name: impl Into<String>) {
        if !self.header_written {
            self.header.name = Some(name.into());
        }
    }

    /// Set the comment field (Latin-1; checked at emission).
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        if !self.header_written {
            self.header.comment = Some(comment.into());
        }
    }

    /// The header configuration currently in effect.
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Compress `p` into the member.
    ///
    /// Returns the number of bytes consumed (`p.len()` on success). After
    /// close this is a no-op returning the latched error, if any, else
    /// `Ok(0)`.
    pub fn write_raw(&mut self, p: &[u8]) -> Result<usize, Error> {
        self.check_latched()?;
        if self.closed {
            return Ok(0);
        }
        match self.write_raw_inner(p) {
            Ok(n) => Ok(n),
            Err(err) => Err(self.latch(err)),
        }
    }

    fn write_raw_inner(&mut self, p: &[u8]) -> Result<usize, Error> {
        self.ensure_header()?;
        if self.spliced_last {
            // The spliced final block terminated the current DEFLATE
            // stream; continue in a fresh segment with an empty window so
            // a restarting decoder can decode it standalone.
            self.deflate.as_mut().expect("deflate sink initialised").reset();
            self.spliced_last = false;
        }
        self.crc = crc32_update(self.crc, p);
        self.isize = self.isize.wrapping_add(p.len() as u32);
        self.deflate_active = true;
        let dest = self.dest.as_mut().expect("destination writer already taken");
        self.deflate
            .as_mut()
            .expect("deflate sink initialised")
            .write(dest, p)
    }

    /// Splice a complete gzip member into the output.
    ///
    /// The donor's DEFLATE payload is written to the destination verbatim
    /// (bypassing the compressor) after a sync-flush byte-aligns any open
    /// compressor block; its trailer CRC/ISIZE are folded into the running
    /// totals arithmetically. Returns the number of payload bytes emitted.
    pub fn write_compressed(&mut self, blob: &[u8]) -> Result<usize, Error> {
        self.check_latched()?;
        if self.closed {
            return Ok(0);
        }
        match self.write_compressed_inner(blob) {
            Ok(n) => Ok(n),
            Err(err) => Err(self.latch(err)),
        }
    }

    fn write_compressed_inner(&mut self, blob: &[u8]) -> Result<usize, Error> {
        self.ensure_header()?;
        if self.deflate_active {
            let dest = self.dest.as_mut().expect("destination writer already taken");
            self.deflate
                .as_mut()
                .expect("deflate sink initialised")
                .sync_flush(dest)?;
            self.deflate_active = false;
        }

        let parts = parse_blob(blob)?;
        self.crc = crc32_combine(self.crc, parts.crc, u64::from(parts.isize));
        self.isize = self.isize.wrapping_add(parts.isize);

        let dest = self.dest.as_mut().expect("destination writer already taken");
        dest.write_all(parts.deflate)?;
        self.spliced_last = true;
        Ok(parts.deflate.len())
    }

    /// Sync-flush any open compressor block so a reader can reconstruct
    /// everything written so far. Emits no trailer. A no-op once closed, or
    /// when no raw data is pending.
    pub fn flush(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.check_latched()?;
        match self.flush_inner() {
            Ok(()) => Ok(()),
            Err(err) => Err(self.latch(err)),
        }
    }

    fn flush_inner(&mut self) -> Result<(), Error> {
        self.ensure_header()?;
        if self.deflate_active {
            let dest = self.dest.as_mut().expect("destination writer already taken");
            self.deflate
                .as_mut()
                .expect("deflate sink initialised")
                .sync_flush(dest)?;
            self.deflate_active = false;
        }
        Ok(())
    }

    /// Terminate the member: finalise the DEFLATE stream (unless the last
    /// body bytes came from a splice, whose BFINAL already terminated it)
    /// and emit the 8-byte trailer.
    ///
    /// Idempotent: a second close emits nothing and returns the latched
    /// error, if any, else `Ok`. Does not flush or close the destination.
    pub fn close(&mut self) -> Result<(), Error> {
        self.check_latched()?;
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.close_inner() {
            Ok(()) => Ok(()),
            Err(err) => Err(self.latch(err)),
        }
    }

    fn close_inner(&mut self) -> Result<(), Error> {
        self.ensure_header()?;
        if !self.spliced_last {
            let dest = self.dest.as_mut().expect("destination writer already taken");
            self.deflate
                .as_mut()
                .expect("deflate sink initialised")
                .finish(dest)?;
            self.deflate_active = false;
        }

        let mut trailer = [0u8; 8];
        trailer[..4].copy_from_slice(&self.crc.to_le_bytes());
        trailer[4..].copy_from_slice(&self.isize.to_le_bytes());
        let dest = self.dest.as_mut().expect("destination writer already taken");
        dest.write_all(&trailer)?;
        Ok(())
    }

    /// Close the member and hand back the destination.
    pub fn finish(mut self) -> Result<W, Error> {
        self.close()?;
        Ok(self.dest.take().expect("destination writer already taken"))
    }

    /// Return the writer to its initial state, pointing at `new_dest`, and
    /// hand back the previous destination.
    ///
    /// Clears the running CRC/ISIZE, all state flags, any latched error, and
    /// the header configuration; preserves the level and the cached
    /// compressor (reset onto a fresh stream).
    pub fn reset(&mut self, new_dest: W) -> W {
        let old = self.dest.replace(new_dest);
        if let Some(sink) = self.deflate.as_mut() {
            sink.reset();
        }
        self.header = GzipHeader::default();
        self.crc = 0;
        self.isize = 0;
        self.latched = None;
        self.header_written = false;
        self.closed = false;
        self.deflate_active = false;
        self.spliced_last = false;
        old.expect("destination writer already taken")
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn check_latched(&self) -> Result<(), Error> {
        match &self.latched {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn latch(&mut self, err: Error) -> Error {
        self.latched = Some(err.clone());
        err
    }

    /// Emit the member header on first use and create the DEFLATE sink.
    fn ensure_header(&mut self) -> Result<(), Error> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        let bytes = self.header.encode(self.level)?;
        let dest = self.dest.as_mut().expect("destination writer already taken");
        dest.write_all(&bytes)?;
        if self.deflate.is_none() {
            self.deflate = Some(DeflateSink::new(self.level));
        }
        Ok(())
    }
}

impl<W: Write> WriteCompressed for GzipStreamWriter<W> {
    fn write_compressed(&mut self, blob: &[u8]) -> Result<usize, Error> {
        GzipStreamWriter::write_compressed(self, blob)
    }
}

impl<W: Write> Write for GzipStreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_raw(buf).map_err(Into::into)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        GzipStreamWriter::flush(self).map_err(Into::into)
    }
}

impl<W: Write> Drop for GzipStreamWriter<W> {
    /// Best-effort close so a dropped writer still carries a trailer.
    /// Errors are discarded; call [`close`](Self::close) or
    /// [`finish`](Self::finish) to observe them.
    fn drop(&mut self) {
        if self.dest.is_none() || self.closed || self.latched.is_some() {
            return;
        }
        let _ = self.close();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot convenience
// ─────────────────────────────────────────────────────────────────────────────

/// Splice a batch of complete gzip members into a single member written to
/// `dest`, returning the destination on success.
pub fn concat_blobs<W: Write>(dest: W, blobs: &[&[u8]]) -> Result<W, Error> {
    let mut writer = GzipStreamWriter::new(dest);
    for blob in blobs {
        writer.write_compressed(blob)?;
    }
    writer.finish()
}
