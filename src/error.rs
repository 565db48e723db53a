//! Error types for region, decompression and tree decoding failures.
//!
//! Every variant is scoped to the smallest unit that produced it: one
//! region slot, one standalone file, or one region header. The scanner
//! logs and skips them; nothing here is meant to abort a whole run.
//!
//! # Example
//!
//! ```
//! use na_bookscan::{Error, TreeError, read_be};
//!
//! match read_be(&[0x0A, 0x00]) {
//!     Err(Error::MalformedTree(TreeError::EndOfFile)) => {}
//!     other => panic!("expected a truncated tree, got {other:?}"),
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::TagID;

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// All failures the scanner can hit while reading one source.
#[derive(Debug, Error)]
pub enum Error {
    /// The region location table is shorter than 4096 bytes.
    ///
    /// This is the only error that abandons a whole region container.
    #[error("region header truncated: {found} of 4096 bytes available")]
    TruncatedHeader { found: usize },

    /// Fewer than the 5 bytes of length and compression scheme were
    /// available at the slot's sector offset, or the length left no room
    /// for the compression byte.
    #[error("chunk header truncated in slot {slot}")]
    TruncatedChunkHeader { slot: usize },

    /// The sector ended before the declared payload length.
    #[error("chunk payload truncated in slot {slot}: expected {expected} bytes, found {found}")]
    TruncatedChunkPayload {
        slot: usize,
        expected: usize,
        found: usize,
    },

    /// Unknown compression scheme byte, or the decompressor rejected the stream.
    #[error("unsupported or corrupt compression (scheme {scheme}): {reason}")]
    UnsupportedOrCorruptCompression { scheme: u8, reason: String },

    /// The decompressed bytes are not a well-formed tagged tree.
    #[error("malformed tree: {0}")]
    MalformedTree(#[from] TreeError),

    /// The file could not be opened or read at all.
    #[error("cannot read {}: {source}", path.display())]
    UnreadableSourceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A region file name that does not carry `r.<x>.<z>.mca` coordinates.
    #[error("region file name {0:?} does not encode region coordinates")]
    InvalidRegionName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a byte buffer failed to decode as a tagged tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A length prefix or fixed-width value would read past the buffer end,
    /// including a compound that was never terminated.
    #[error("unexpected end of input")]
    EndOfFile,

    /// NBT defines tag types 0-12. Anything else is rejected.
    #[error("invalid NBT tag type: {0:#04x}")]
    InvalidTagType(u8),

    /// A list element does not match the list's declared element type.
    #[error("tag in list mismatch: expected {expected:?}, got {actual:?}")]
    TagMismatch { expected: TagID, actual: TagID },

    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
}
