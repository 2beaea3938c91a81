//! Byte-source backends for the three archive formats.
//!
//! One [`ArchiveSource`] owns the single open handle for an archive and
//! exposes the four capabilities the reader needs: read, skip, rewind,
//! close. Plain tar files seek natively. The gzip and bzip2 decoders only
//! move forward, so skipping reads and discards, and rewinding drops the
//! decoder and reopens the compressed stream from the path.

use std::fs::File;
use std::io::{ErrorKind, Read, Result, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;

/// Chunk size for skip-by-reading on non-seekable backends.
const SKIP_CHUNK: usize = 8192;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Bzip2 magic bytes.
const BZIP2_MAGIC: [u8; 2] = *b"BZ";

/// Archive format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Plain uncompressed tar.
    Tar,
    /// Gzip-compressed tar.
    Gzip,
    /// Bzip2-compressed tar.
    Bzip2,
}

impl Format {
    /// Resolve the format of the file at `path`.
    ///
    /// Magic bytes win: `1F 8B` is gzip and `42 5A` is bzip2 whatever the
    /// file is called. Otherwise the filename suffix decides (`.tar`,
    /// `.tar.gz`, `.tar.bz2`). Returns `None` when neither identifies the
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the magic bytes
    /// cannot be read.
    pub fn detect(path: impl AsRef<Path>) -> Result<Option<Format>> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut magic = [0u8; 2];
        if read_full(&mut file, &mut magic)? == magic.len() {
            if magic == GZIP_MAGIC {
                return Ok(Some(Format::Gzip));
            }
            if magic == BZIP2_MAGIC {
                return Ok(Some(Format::Bzip2));
            }
        }
        let name = path.to_string_lossy();
        if name.ends_with(".tar.gz") {
            Ok(Some(Format::Gzip))
        } else if name.ends_with(".tar.bz2") {
            Ok(Some(Format::Bzip2))
        } else if name.ends_with(".tar") {
            Ok(Some(Format::Tar))
        } else {
            Ok(None)
        }
    }
}

/// The one open OS/decoder handle behind a source.
enum Backend {
    Plain(File),
    Gzip(GzDecoder<File>),
    Bzip2(BzDecoder<File>),
}

impl Backend {
    fn open(path: &Path, format: Format) -> Result<Backend> {
        let file = File::open(path)?;
        Ok(match format {
            Format::Tar => Backend::Plain(file),
            Format::Gzip => Backend::Gzip(GzDecoder::new(file)),
            Format::Bzip2 => Backend::Bzip2(BzDecoder::new(file)),
        })
    }

    fn reader(&mut self) -> &mut dyn Read {
        match self {
            Backend::Plain(file) => file,
            Backend::Gzip(decoder) => decoder,
            Backend::Bzip2(decoder) => decoder,
        }
    }
}

/// Unified byte source over the three backends.
///
/// `None` backend means closed; every read on a closed source is empty.
pub(crate) struct ArchiveSource {
    path: PathBuf,
    format: Format,
    backend: Option<Backend>,
}

impl ArchiveSource {
    /// Open the backend for `format` at `path`.
    pub(crate) fn open(path: PathBuf, format: Format) -> Result<ArchiveSource> {
        let backend = Backend::open(&path, format)?;
        Ok(ArchiveSource {
            path,
            format,
            backend: Some(backend),
        })
    }

    pub(crate) fn format(&self) -> Format {
        self.format
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Read up to `n` bytes from the current position.
    ///
    /// Returns fewer bytes (or none) at end-of-stream. Read failures are
    /// swallowed and yield an empty result; enumeration treats it like
    /// end-of-archive.
    pub(crate) fn read_bytes(&mut self, n: usize) -> Vec<u8> {
        let Some(backend) = self.backend.as_mut() else {
            return Vec::new();
        };
        let mut buf = vec![0u8; n];
        let filled = read_full(backend.reader(), &mut buf).unwrap_or(0);
        buf.truncate(filled);
        buf
    }

    /// Advance the position by `n` bytes without returning content.
    ///
    /// Failures are swallowed; a position left short surfaces later as a
    /// short read.
    pub(crate) fn skip_bytes(&mut self, n: u64) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        match backend {
            Backend::Plain(file) => {
                if let Ok(n) = i64::try_from(n) {
                    let _ = file.seek(SeekFrom::Current(n));
                }
            }
            Backend::Gzip(decoder) => {
                discard_bytes(decoder, n);
            }
            Backend::Bzip2(decoder) => {
                // The remaining count goes down by the requested chunk size
                // whatever the decoder actually returned, mirroring bzread
                // bookkeeping. read_full drains the full chunk short of EOF.
                let mut buf = [0u8; SKIP_CHUNK];
                let mut remaining = n;
                while remaining > 0 {
                    let chunk = remaining.min(SKIP_CHUNK as u64) as usize;
                    let _ = read_full(decoder, &mut buf[..chunk]);
                    remaining -= chunk as u64;
                }
            }
        }
    }

    /// Reposition to byte 0.
    ///
    /// Plain files seek; the decoders cannot seek backward, so the
    /// compressed stream is reopened from the path.
    pub(crate) fn rewind(&mut self) -> Result<()> {
        match self.backend.as_mut() {
            None => Ok(()),
            Some(Backend::Plain(file)) => {
                file.seek(SeekFrom::Start(0))?;
                Ok(())
            }
            Some(_) => {
                self.backend = None;
                self.backend = Some(Backend::open(&self.path, self.format)?);
                Ok(())
            }
        }
    }

    /// Release the backend handle. Safe to call repeatedly.
    pub(crate) fn close(&mut self) {
        self.backend = None;
    }
}

/// Fill `buf` as far as the stream allows, retrying on EINTR.
///
/// Returns the number of bytes read; fewer than `buf.len()` means the
/// stream ended.
fn read_full(reader: &mut dyn Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read and discard `n` bytes, stopping early at end-of-stream.
fn discard_bytes(reader: &mut dyn Read, n: u64) {
    let mut buf = [0u8; SKIP_CHUNK];
    let mut remaining = n;
    while remaining > 0 {
        let chunk = remaining.min(SKIP_CHUNK as u64) as usize;
        match reader.read(&mut buf[..chunk]) {
            Ok(0) => break,
            Ok(read) => remaining -= read as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
}
