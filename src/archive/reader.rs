//! The archive handle: open, enumerate, read, close.

use std::fmt;
use std::path::Path;

use crate::{is_blank_block, trim_field, EntryType, UstarHeader, BLOCK_SIZE};

use super::entry::ArchiveEntry;
use super::error::{ReadError, Result};
use super::limits::Limits;
use super::source::{ArchiveSource, Format};

/// Handle to an open tar archive.
///
/// Holds the archive path, the resolved [`Format`], and the single live
/// byte-source backend. Operations take `&mut self` because the one stream
/// position is shared mutable state; overlapping reads against the same
/// handle are not a thing this type supports.
///
/// # Lifecycle
///
/// Created by [`open`] (or [`with_format`] when the caller already resolved
/// the format), live for enumeration and any number of entry reads,
/// invalidated by [`close`]. Closing is idempotent; every operation after
/// it fails with [`ReadError::Closed`].
///
/// [`open`]: TarReader::open
/// [`with_format`]: TarReader::with_format
/// [`close`]: TarReader::close
pub struct TarReader {
    source: ArchiveSource,
    limits: Limits,
}

impl TarReader {
    /// Open the archive at `path`, resolving its format from magic bytes or
    /// the filename suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::UnsupportedFormat`] when the format cannot be
    /// resolved, or [`ReadError::Io`] when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<TarReader> {
        Self::open_with_limits(path, Limits::default())
    }

    /// Like [`open`](TarReader::open), with custom [`Limits`].
    pub fn open_with_limits(path: impl AsRef<Path>, limits: Limits) -> Result<TarReader> {
        let path = path.as_ref();
        let format = Format::detect(path)?
            .ok_or_else(|| ReadError::UnsupportedFormat(path.to_path_buf()))?;
        let source = ArchiveSource::open(path.to_path_buf(), format)?;
        Ok(TarReader { source, limits })
    }

    /// Open the archive with an externally resolved format, skipping
    /// detection.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Io`] when the file cannot be opened.
    pub fn with_format(path: impl AsRef<Path>, format: Format) -> Result<TarReader> {
        let source = ArchiveSource::open(path.as_ref().to_path_buf(), format)?;
        Ok(TarReader {
            source,
            limits: Limits::default(),
        })
    }

    /// The resolved archive format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.source.format()
    }

    /// Enumerate all entries from the stream's current position.
    ///
    /// Walks header blocks sequentially, skipping blank terminator blocks
    /// and resolving GNU long-name records, and records each entry's
    /// content offset. Content is never buffered, only skipped over.
    ///
    /// The pass exhausts the stream: a second call on the same handle
    /// yields an empty list. The reader does not rewind first; a freshly
    /// opened handle is already at byte 0.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Header`] on the first malformed header; there
    /// are no partial results from a corrupt archive. Long-name chains
    /// beyond the configured cap fail with [`ReadError::LinkChainTooDeep`],
    /// a long-name record whose declared size exceeds `max_path_len` with
    /// [`ReadError::PathTooLong`] (checked before the payload is read), and
    /// a long-name record with no entry after it with
    /// [`ReadError::OrphanedLongName`].
    pub fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        if self.source.is_closed() {
            return Err(ReadError::Closed);
        }
        let mut entries = Vec::new();
        let mut offset: u64 = 0;
        loop {
            let block = self.source.read_bytes(BLOCK_SIZE);
            if block.len() < BLOCK_SIZE {
                break;
            }
            let Some(mut entry) = self.parse_block(&block)? else {
                // Blank terminator block: no entry, keep scanning in case
                // the writer padded before physical EOF.
                continue;
            };

            // A GNU long-name record's content is the real name of the
            // following header. Chains are bounded; one level is the normal
            // case.
            let mut depth = 0;
            let mut long_name: Option<Vec<u8>> = None;
            while entry.entry_type == EntryType::GnuLongName {
                depth += 1;
                if depth > self.limits.max_link_chain {
                    return Err(ReadError::LinkChainTooDeep {
                        depth,
                        limit: self.limits.max_link_chain,
                    });
                }
                // The declared size is attacker-controlled; bound it before
                // the payload buffer is allocated.
                if entry.size > self.limits.max_path_len as u64 {
                    return Err(ReadError::PathTooLong {
                        len: usize::try_from(entry.size).unwrap_or(usize::MAX),
                        limit: self.limits.max_path_len,
                    });
                }
                let padded = entry.padded_size();
                let payload = self.source.read_bytes(padded as usize);
                long_name = Some(trim_field(&payload).to_vec());
                offset += (BLOCK_SIZE as u64) + padded;

                let block = self.source.read_bytes(BLOCK_SIZE);
                if block.len() < BLOCK_SIZE {
                    return Err(ReadError::OrphanedLongName);
                }
                entry = self
                    .parse_block(&block)?
                    .ok_or(ReadError::OrphanedLongName)?;
            }
            if let Some(name) = long_name {
                if name.len() > self.limits.max_path_len {
                    return Err(ReadError::PathTooLong {
                        len: name.len(),
                        limit: self.limits.max_path_len,
                    });
                }
                entry.name = name;
            }

            let content = entry.padded_size();
            self.source.skip_bytes(content);
            offset += BLOCK_SIZE as u64;
            entry.offset = offset;
            offset += content;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read one entry's raw content.
    ///
    /// Rewinds to the archive start, skips forward to the entry's content
    /// offset, and reads `entry.size` bytes. Trailing block padding is
    /// never included. For compressed backends the rewind reopens the
    /// stream, so every call pays a fresh decompression pass up to the
    /// offset.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Closed`] after [`close`](TarReader::close), or
    /// [`ReadError::Io`] if repositioning fails.
    pub fn read_entry(&mut self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        if self.source.is_closed() {
            return Err(ReadError::Closed);
        }
        self.source.rewind()?;
        self.source.skip_bytes(entry.offset);
        Ok(self.source.read_bytes(entry.size as usize))
    }

    /// Release the underlying handle. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.source.close();
    }

    /// Whether [`close`](TarReader::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.source.is_closed()
    }

    /// Decode one header block into an entry, or `None` for a blank block.
    fn parse_block(&self, block: &[u8]) -> Result<Option<ArchiveEntry>> {
        let header = UstarHeader::from_block(block)?;
        if is_blank_block(block) {
            return Ok(None);
        }
        header.verify_checksum()?;

        let name = header.full_name();
        if name.len() > self.limits.max_path_len {
            return Err(ReadError::PathTooLong {
                len: name.len(),
                limit: self.limits.max_path_len,
            });
        }

        Ok(Some(ArchiveEntry {
            name,
            mode: header.entry_mode()?,
            uid: header.entry_uid()?,
            gid: header.entry_gid()?,
            size: header.entry_size()?,
            mtime: header.entry_mtime()?,
            entry_type: header.entry_type(),
            link_target: header.link_target().to_vec(),
            uname: header.user_name().to_vec(),
            gname: header.group_name().to_vec(),
            offset: 0,
        }))
    }
}

impl fmt::Debug for TarReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TarReader")
            .field("format", &self.format())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
