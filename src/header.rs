//! Gzip header model and RFC 1952 serialisation.
//!
//! The header is configured on the writer before the first operation and
//! serialised exactly once per member. Optional string fields are stored as
//! Rust strings and converted to NUL-terminated Latin-1 on encode; RFC 1952
//! gives Latin-1 no escape hatch, so any codepoint outside `(0, 0xFF]` is a
//! hard error rather than a lossy substitution.

use crate::blob::{FLAG_COMMENT, FLAG_EXTRA, FLAG_NAME, GZIP_DEFLATE, GZIP_ID1, GZIP_ID2};
use crate::error::Error;
use crate::{BEST_COMPRESSION, BEST_SPEED};

/// Largest extra field RFC 1952's u16 length prefix can carry.
const MAX_EXTRA_LEN: usize = 0xFFFF;

/// OS byte meaning "unknown".
pub const OS_UNKNOWN: u8 = 255;

/// Configurable gzip header fields.
///
/// The zero value (via [`Default`]) emits the 10-byte fixed header with no
/// optional fields, mtime unset, and OS = unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Modification time as unix seconds; 0 means "not set" (RFC 1952 §2.3.1).
    pub mtime: u32,
    /// Operating-system byte; 255 = unknown.
    pub os: u8,
    /// Raw extra field (at most 65 535 bytes).
    pub extra: Option<Vec<u8>>,
    /// Original file name. Latin-1, no interior NUL.
    pub name: Option<String>,
    /// Free-form comment. Latin-1, no interior NUL.
    pub comment: Option<String>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        GzipHeader {
            mtime: 0,
            os: OS_UNKNOWN,
            extra: None,
            name: None,
            comment: None,
        }
    }
}

impl GzipHeader {
    /// Serialise the header for a member compressed at `level`.
    ///
    /// Layout: magic, method, FLG from field presence (FTEXT and FHCRC are
    /// never set), little-endian mtime when nonzero, XFL (2 for best
    /// compression, 4 for best speed, else 0), OS byte, then the optional
    /// extra / name / comment fields in RFC order.
    pub fn encode(&self, level: i32) -> Result<Vec<u8>, Error> {
        let mut flag = 0u8;
        if self.extra.is_some() {
            flag |= FLAG_EXTRA;
        }
        if self.name.is_some() {
            flag |= FLAG_NAME;
        }
        if self.comment.is_some() {
            flag |= FLAG_COMMENT;
        }

        let mut out = Vec::with_capacity(10);
        out.push(GZIP_ID1);
        out.push(GZIP_ID2);
        out.push(GZIP_DEFLATE);
        out.push(flag);
        if self.mtime > 0 {
            out.extend_from_slice(&self.mtime.to_le_bytes());
        } else {
            out.extend_from_slice(&[0, 0, 0, 0]);
        }
        out.push(match level {
            BEST_COMPRESSION => 2,
            BEST_SPEED => 4,
            _ => 0,
        });
        out.push(self.os);

        if let Some(extra) = &self.extra {
            if extra.len() > MAX_EXTRA_LEN {
                return Err(Error::HeaderExtraTooLarge);
            }
            out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
            out.extend_from_slice(extra);
        }
        if let Some(name) = &self.name {
            push_latin1(&mut out, name)?;
        }
        if let Some(comment) = &self.comment {
            push_latin1(&mut out, comment)?;
        }
        Ok(out)
    }
}

/// Append `s` as a NUL-terminated Latin-1 string.
///
/// ASCII input is appended byte-for-byte; anything above 0x7F is converted
/// codepoint-by-codepoint. Codepoints of 0 or above 0xFF cannot be
/// represented and yield [`Error::NonLatin1Header`].
fn push_latin1(out: &mut Vec<u8>, s: &str) -> Result<(), Error> {
    let mut needs_conversion = false;
    for ch in s.chars() {
        let code = ch as u32;
        if code == 0 || code > 0xFF {
            return Err(Error::NonLatin1Header);
        }
        if code > 0x7F {
            needs_conversion = true;
        }
    }
    if needs_conversion {
        out.extend(s.chars().map(|ch| ch as u32 as u8));
    } else {
        out.extend_from_slice(s.as_bytes());
    }
    out.push(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_COMPRESSION;

    #[test]
    fn default_header_bytes() {
        let bytes = GzipHeader::default().encode(DEFAULT_COMPRESSION).unwrap();
        assert_eq!(bytes, [0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn xfl_tracks_level() {
        let header = GzipHeader::default();
        assert_eq!(header.encode(BEST_COMPRESSION).unwrap()[8], 2);
        assert_eq!(header.encode(BEST_SPEED).unwrap()[8], 4);
        assert_eq!(header.encode(DEFAULT_COMPRESSION).unwrap()[8], 0);
        assert_eq!(header.encode(6).unwrap()[8], 0);
    }

    #[test]
    fn mtime_encoded_little_endian_when_set() {
        let header = GzipHeader {
            mtime: 0x0102_0304,
            ..GzipHeader::default()
        };
        let bytes = header.encode(DEFAULT_COMPRESSION).unwrap();
        assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn mtime_zero_means_unset() {
        let bytes = GzipHeader::default().encode(DEFAULT_COMPRESSION).unwrap();
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn extra_field_length_prefixed() {
        let header = GzipHeader {
            extra: Some(vec![0xAA, 0xBB, 0xCC]),
            ..GzipHeader::default()
        };
        let bytes = header.encode(DEFAULT_COMPRESSION).unwrap();
        assert_eq!(bytes[3], FLAG_EXTRA);
        assert_eq!(&bytes[10..12], &[0x03, 0x00]);
        assert_eq!(&bytes[12..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn extra_field_too_large() {
        let header = GzipHeader {
            extra: Some(vec![0u8; MAX_EXTRA_LEN + 1]),
            ..GzipHeader::default()
        };
        assert!(matches!(
            header.encode(DEFAULT_COMPRESSION),
            Err(Error::HeaderExtraTooLarge)
        ));
    }

    #[test]
    fn extra_field_at_limit_is_accepted() {
        let header = GzipHeader {
            extra: Some(vec![0u8; MAX_EXTRA_LEN]),
            ..GzipHeader::default()
        };
        let bytes = header.encode(DEFAULT_COMPRESSION).unwrap();
        assert_eq!(&bytes[10..12], &[0xFF, 0xFF]);
    }

    #[test]
    fn name_and_comment_nul_terminated_in_order() {
        let header = GzipHeader {
            name: Some("a.txt".into()),
            comment: Some("hi".into()),
            ..GzipHeader::default()
        };
        let bytes = header.encode(DEFAULT_COMPRESSION).unwrap();
        assert_eq!(bytes[3], FLAG_NAME | FLAG_COMMENT);
        assert_eq!(&bytes[10..], b"a.txt\0hi\0");
    }

    #[test]
    fn latin1_conversion_above_ascii() {
        let header = GzipHeader {
            name: Some("café".into()),
            ..GzipHeader::default()
        };
        let bytes = header.encode(DEFAULT_COMPRESSION).unwrap();
        // 'é' is U+00E9 — one Latin-1 byte, not the two-byte UTF-8 form.
        assert_eq!(&bytes[10..], &[b'c', b'a', b'f', 0xE9, 0]);
    }

    #[test]
    fn non_latin1_codepoint_rejected() {
        let header = GzipHeader {
            comment: Some("price: €5".into()),
            ..GzipHeader::default()
        };
        assert!(matches!(
            header.encode(DEFAULT_COMPRESSION),
            Err(Error::NonLatin1Header)
        ));
    }

    #[test]
    fn interior_nul_rejected() {
        let header = GzipHeader {
            name: Some("bad\0name".into()),
            ..GzipHeader::default()
        };
        assert!(matches!(
            header.encode(DEFAULT_COMPRESSION),
            Err(Error::NonLatin1Header)
        ));
    }

    #[test]
    fn encoded_header_parses_as_blob_prefix() {
        // A header with every optional field, completed into a member, must
        // walk cleanly through the blob parser.
        let header = GzipHeader {
            mtime: 1_700_000_000,
            os: 3,
            extra: Some(vec![1, 2, 3, 4]),
            name: Some("n".into()),
            comment: Some("c".into()),
        };
        let mut blob = header.encode(DEFAULT_COMPRESSION).unwrap();
        blob.extend_from_slice(b"\x03\x00");
        blob.extend_from_slice(&[0; 8]);
        let parts = crate::blob::parse_blob(&blob).unwrap();
        assert_eq!(parts.deflate, b"\x03\x00");
    }
}
