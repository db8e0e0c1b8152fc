//! `gzsplice` — a streaming gzip (RFC 1952) writer that mixes two input
//! kinds into a single, valid gzip member:
//!
//! * **raw byte payloads**, compressed inline through a DEFLATE sink, and
//! * **pre-compressed gzip blobs**, spliced into the output verbatim —
//!   their DEFLATE payload is lifted out of the donor member and their
//!   trailer CRC/ISIZE folded into the running totals arithmetically,
//!   without decompressing a single byte.
//!
//! The output decompresses to the concatenation, in write order, of every
//! raw payload and the decompressed content of every spliced blob.
//!
//! # Crate layout
//!
//! | Module    | Contents |
//! |-----------|----------|
//! | `crc32`   | CRC32 (IEEE) wrapper and the zero-extension combiner. |
//! | `blob`    | Donor-member parser: header walk, payload slice, trailer fields. |
//! | `header`  | Gzip header model and RFC 1952 serialisation. |
//! | `deflate` | Raw-DEFLATE sink: compress / sync-flush / finish passes. |
//! | `writer`  | The streaming writer state machine and public facade. |
//! | `error`   | Error taxonomy shared by all of the above. |
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use gzsplice::GzipStreamWriter;
//!
//! let mut z = GzipStreamWriter::new(Vec::new());
//! z.write_all(b"fresh bytes, compressed here").unwrap();
//! let member = z.finish().unwrap();
//! assert_eq!(&member[..2], &[0x1f, 0x8b]);
//! ```

pub mod blob;
pub mod crc32;
pub mod deflate;
pub mod error;
pub mod header;
pub mod writer;

// ── Compression levels ────────────────────────────────────────────────────────
// DEFLATE-convention levels, exported here so callers do not need to import
// the backend compressor crate.

/// Huffman-only coding, no LZ77 matching.
pub const HUFFMAN_ONLY: i32 = -2;
/// Backend-default compression level.
pub const DEFAULT_COMPRESSION: i32 = -1;
/// Stored blocks only.
pub const NO_COMPRESSION: i32 = 0;
/// Fastest setting that still performs matching.
pub const BEST_SPEED: i32 = 1;
/// Highest-ratio setting.
pub const BEST_COMPRESSION: i32 = 9;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use blob::{parse_blob, BlobParts};
pub use crc32::{crc32, crc32_combine, crc32_update};
pub use error::Error;
pub use header::GzipHeader;
pub use writer::{concat_blobs, GzipStreamWriter, WriteCompressed};
