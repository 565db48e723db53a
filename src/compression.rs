//! Decompression of chunk payloads and standalone `.dat` files.
//!
//! Region chunks name their scheme in a one-byte tag:
//! - Gzip (1): RFC 1952 stream, used by a few old tools
//! - Zlib (2): RFC 1950 deflate stream, what the game writes
//!
//! Standalone files carry no tag. They are probed instead: gzip first, and
//! if the gzip decoder rejects the bytes they are handed to the tree
//! decoder unchanged.

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};
use log::trace;

use crate::{Error, Result};

/// Compression scheme byte of a region chunk payload.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Compression {
    Gzip = 1,
    Zlib = 2,
}

impl TryFrom<u8> for Compression {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Gzip),
            2 => Ok(Self::Zlib),
            _ => Err(Error::UnsupportedOrCorruptCompression {
                scheme: value,
                reason: "unknown compression scheme".to_owned(),
            }),
        }
    }
}

impl Compression {
    /// Inflates `payload` according to this scheme.
    pub fn decompress(self, payload: &[u8]) -> Result<Vec<u8>> {
        trace!("Decompressing {} bytes with {:?}", payload.len(), self);
        let mut output = Vec::with_capacity(payload.len() * 4);
        let outcome = match self {
            Compression::Gzip => GzDecoder::new(payload).read_to_end(&mut output),
            Compression::Zlib => ZlibDecoder::new(payload).read_to_end(&mut output),
        };
        outcome.map_err(|e| Error::UnsupportedOrCorruptCompression {
            scheme: self as u8,
            reason: e.to_string(),
        })?;
        Ok(output)
    }
}

/// Inflates a region chunk payload given its raw scheme byte.
///
/// Any scheme other than 1 or 2 fails with
/// [`Error::UnsupportedOrCorruptCompression`].
pub fn decompress(scheme: u8, payload: &[u8]) -> Result<Vec<u8>> {
    Compression::try_from(scheme)?.decompress(payload)
}

/// Returns the gzip-decompressed contents of `data`, or `data` itself when
/// it does not decode as gzip.
///
/// This is a two-step attempt, not format sniffing: `.dat` files in the
/// wild are sometimes stored raw, sometimes already inflated by tools.
pub fn decompress_lenient(data: Vec<u8>) -> Vec<u8> {
    match Compression::Gzip.decompress(&data) {
        Ok(inflated) => inflated,
        Err(e) => {
            trace!("Not gzip ({e}), using {} raw bytes", data.len());
            data
        }
    }
}
