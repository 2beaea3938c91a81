//! Error types for archive reading.

use std::path::PathBuf;

use thiserror::Error;

use crate::HeaderError;

/// Errors that can occur while opening or reading an archive.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file's format could not be resolved from magic bytes or its
    /// filename suffix.
    #[error("unsupported archive format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// I/O error while opening or repositioning the archive.
    ///
    /// Read failures mid-stream are not reported here; they surface as a
    /// short read, which enumeration treats as end-of-archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A header block failed checksum or field decoding.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// A GNU long-name record was not followed by a real header.
    #[error("long-name record without a following entry")]
    OrphanedLongName,

    /// A chain of GNU long-name records exceeded the configured depth cap.
    #[error("long-name chain too deep: {depth} > {limit}")]
    LinkChainTooDeep {
        /// Number of consecutive long-name records seen.
        depth: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A resolved entry name exceeds the configured maximum length.
    #[error("entry name exceeds limit: {len} bytes > {limit} bytes")]
    PathTooLong {
        /// Actual name length.
        len: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The reader was closed; open a new one to keep reading.
    #[error("archive handle is closed")]
    Closed,
}

/// Result type for archive reading operations.
pub type Result<T> = std::result::Result<T, ReadError>;
