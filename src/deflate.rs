//! Raw-DEFLATE sink: the compressor half of the stream writer.
//!
//! Wraps the backend's stateful raw-DEFLATE compressor (`flate2::Compress`
//! with no zlib framing) behind the three passes the writer needs:
//!
//! * `write`     — compress input, draining output to the destination;
//! * `sync_flush`— terminate the current block and emit the empty stored
//!                 block so the stream is byte-aligned (tail `00 00 FF FF`)
//!                 and the final-block bit stays unset;
//! * `finish`    — terminate the stream with a final (BFINAL = 1) block.
//!
//! `reset` rewinds to a fresh stream while keeping the allocation, which is
//! what lets a pooled writer reuse one compressor across members and what
//! gives each post-splice segment an empty back-reference window.

use std::io::Write;

use flate2::{Compress, Compression, FlushCompress, Status};

use crate::error::Error;
use crate::{BEST_COMPRESSION, HUFFMAN_ONLY, NO_COMPRESSION};

/// Staging-buffer size for draining compressor output.
const OUT_CHUNK: usize = 16 * 1024;

/// Map a crate-level compression level onto the backend.
///
/// The backend accepts 0–9 and a default; it has no Huffman-only strategy
/// knob, so `HUFFMAN_ONLY` degrades to the fastest setting.
fn backend_compression(level: i32) -> Compression {
    match level {
        NO_COMPRESSION..=BEST_COMPRESSION => Compression::new(level as u32),
        HUFFMAN_ONLY => Compression::fast(),
        _ => Compression::default(),
    }
}

/// A resettable raw-DEFLATE compressor draining into a caller-supplied sink.
pub(crate) struct DeflateSink {
    raw: Compress,
    out: Vec<u8>,
}

impl DeflateSink {
    pub(crate) fn new(level: i32) -> Self {
        DeflateSink {
            // false: raw DEFLATE, no zlib header/trailer — gzip frames the
            // stream itself.
            raw: Compress::new(backend_compression(level), false),
            out: vec![0u8; OUT_CHUNK],
        }
    }

    /// Compress `input`, writing all produced bytes to `dest`.
    ///
    /// Returns the number of input bytes consumed, which is `input.len()`
    /// on success: the loop runs until the backend has swallowed everything.
    pub(crate) fn write<W: Write>(&mut self, dest: &mut W, input: &[u8]) -> Result<usize, Error> {
        let total = input.len();
        let mut consumed_total = 0usize;
        while consumed_total < total {
            let before_in = self.raw.total_in();
            let before_out = self.raw.total_out();
            self.raw
                .compress(&input[consumed_total..], &mut self.out, FlushCompress::None)
                .map_err(compress_error)?;
            let consumed = (self.raw.total_in() - before_in) as usize;
            let produced = (self.raw.total_out() - before_out) as usize;
            dest.write_all(&self.out[..produced])?;
            consumed_total += consumed;
            if consumed == 0 && produced == 0 {
                // No forward progress with room in both buffers; the
                // remaining input is sitting in the backend's window.
                break;
            }
        }
        Ok(total)
    }

    /// Emit a sync-flush: close the current block and append the empty
    /// stored block, leaving the stream byte-aligned and unterminated.
    pub(crate) fn sync_flush<W: Write>(&mut self, dest: &mut W) -> Result<(), Error> {
        self.drain(dest, FlushCompress::Sync)
    }

    /// Terminate the DEFLATE stream, emitting the final block.
    pub(crate) fn finish<W: Write>(&mut self, dest: &mut W) -> Result<(), Error> {
        self.drain(dest, FlushCompress::Finish)
    }

    /// Start a fresh DEFLATE stream, retaining the allocation.
    pub(crate) fn reset(&mut self) {
        self.raw.reset();
    }

    /// Run `flush` passes with no input until the backend stops producing
    /// output (or reports end-of-stream for `Finish`).
    fn drain<W: Write>(&mut self, dest: &mut W, flush: FlushCompress) -> Result<(), Error> {
        loop {
            let before_out = self.raw.total_out();
            let status = self
                .raw
                .compress(&[], &mut self.out, flush)
                .map_err(compress_error)?;
            let produced = (self.raw.total_out() - before_out) as usize;
            dest.write_all(&self.out[..produced])?;
            if status == Status::StreamEnd || produced == 0 {
                return Ok(());
            }
        }
    }
}

/// A raw-mode compressor error is unreachable under correct state
/// management; surface it through the sink slot of the taxonomy.
fn compress_error(err: flate2::CompressError) -> Error {
    Error::Sink(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        err.to_string(),
    ))
}
