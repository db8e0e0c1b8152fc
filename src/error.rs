//! Error taxonomy for the splicing gzip writer.
//!
//! Every fallible operation in this crate funnels into [`Error`]. The writer
//! latches the first error it observes and returns it from every subsequent
//! call until `reset`, so the type must be cloneable; `io::Error` is not,
//! which is why [`Error`] carries a hand-written `Clone` that re-materialises
//! the sink variant from its kind and message.

use core::fmt;
use std::io;

/// Errors produced while writing or splicing a gzip member.
#[derive(Debug)]
pub enum Error {
    /// Constructor saw a compression level outside `[HUFFMAN_ONLY, BEST_COMPRESSION]`.
    InvalidLevel(i32),
    /// A donor blob failed validation: too short, bad magic, or a malformed
    /// optional-field walk.
    InvalidBlob,
    /// A header name or comment contained a codepoint outside `(0, 0xFF]`.
    NonLatin1Header,
    /// The header extra field exceeded 65 535 bytes.
    HeaderExtraTooLarge,
    /// The destination sink reported an I/O failure.
    Sink(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLevel(level) => write!(f, "invalid compression level: {level}"),
            Error::InvalidBlob => f.write_str("invalid gzip blob"),
            Error::NonLatin1Header => f.write_str("non-Latin-1 header string"),
            Error::HeaderExtraTooLarge => f.write_str("header extra data is too large"),
            Error::Sink(inner) => write!(f, "destination sink error: {inner}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Sink(inner) => Some(inner),
            _ => None,
        }
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::InvalidLevel(level) => Error::InvalidLevel(*level),
            Error::InvalidBlob => Error::InvalidBlob,
            Error::NonLatin1Header => Error::NonLatin1Header,
            Error::HeaderExtraTooLarge => Error::HeaderExtraTooLarge,
            // io::Error is not Clone; kind + message survive the copy.
            Error::Sink(inner) => {
                Error::Sink(io::Error::new(inner.kind(), inner.to_string()))
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(inner: io::Error) -> Self {
        Error::Sink(inner)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Sink(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}
