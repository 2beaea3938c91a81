//! Raw USTAR/GNU tar header parsing.
//!
//! This crate reads tar archives (plain, gzip-compressed, or
//! bzip2-compressed) without extracting them to disk. This module is the
//! bottom layer: a zerocopy view of the 512-byte header block with strict
//! checksum verification and octal field decoding. The [`archive`] module
//! builds entry enumeration and on-demand content reads on top of it.
//!
//! # Header Field Layout
//!
//! Every tar header occupies one 512-byte block:
//!
//! | Offset | Size | Field    | Encoding                          |
//! |--------|------|----------|-----------------------------------|
//! | 0      | 100  | name     | NUL-padded string                 |
//! | 100    | 8    | mode     | octal ASCII                       |
//! | 108    | 8    | uid      | octal ASCII                       |
//! | 116    | 8    | gid      | octal ASCII                       |
//! | 124    | 12   | size     | octal ASCII                       |
//! | 136    | 12   | mtime    | octal ASCII (Unix timestamp)      |
//! | 148    | 8    | checksum | octal ASCII                       |
//! | 156    | 1    | typeflag | single byte (see [`EntryType`])   |
//! | 157    | 100  | linkname | NUL-padded string                 |
//! | 257    | 6    | magic    | "ustar\0" (unused here)           |
//! | 263    | 2    | version  | "00" (unused here)                |
//! | 265    | 32   | uname    | NUL-padded string                 |
//! | 297    | 32   | gname    | NUL-padded string                 |
//! | 329    | 8    | devmajor | octal ASCII (unused here)         |
//! | 337    | 8    | devminor | octal ASCII (unused here)         |
//! | 345    | 155  | prefix   | NUL-padded string (POSIX paths)   |
//!
//! The checksum is the unsigned byte sum of the whole block with the
//! checksum field itself counted as eight spaces (8 x 0x20 = 256).
//!
//! # Example
//!
//! ```
//! use tar_reader::{UstarHeader, EntryType};
//!
//! let block = [0u8; 512];
//! let header = UstarHeader::from_block(&block).unwrap();
//! assert_eq!(header.entry_type(), EntryType::Regular);
//! ```

pub mod archive;

use std::fmt;

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of a tar header block in bytes.
pub const BLOCK_SIZE: usize = 512;

/// Errors produced while decoding a 512-byte header block.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The supplied block is not exactly 512 bytes long.
    #[error("header block must be {BLOCK_SIZE} bytes, got {0}")]
    BlockSize(usize),

    /// A numeric field contains something other than octal ASCII digits.
    #[error("invalid octal field: {0:?}")]
    InvalidOctal(Vec<u8>),

    /// The stored checksum does not match the computed byte sum.
    #[error("checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch {
        /// Value decoded from the checksum field.
        stored: u64,
        /// Value computed from the block bytes.
        computed: u64,
    },
}

/// Result type for header decoding.
pub type Result<T> = std::result::Result<T, HeaderError>;

/// Tar entry type, decoded from the typeflag byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file (type '0', or '\0' for pre-POSIX archives).
    Regular,
    /// Hard link (type '1').
    Link,
    /// Symbolic link (type '2').
    Symlink,
    /// Character device (type '3').
    Char,
    /// Block device (type '4').
    Block,
    /// Directory (type '5').
    Directory,
    /// FIFO (type '6').
    Fifo,
    /// Contiguous file (type '7').
    Continuous,
    /// GNU long-name record (type 'L'); its content is the next entry's name.
    GnuLongName,
    /// GNU long-link record (type 'K').
    GnuLongLink,
    /// Any other typeflag byte.
    Other(u8),
}

impl EntryType {
    /// Decode a typeflag byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' | b'\0' => EntryType::Regular,
            b'1' => EntryType::Link,
            b'2' => EntryType::Symlink,
            b'3' => EntryType::Char,
            b'4' => EntryType::Block,
            b'5' => EntryType::Directory,
            b'6' => EntryType::Fifo,
            b'7' => EntryType::Continuous,
            b'L' => EntryType::GnuLongName,
            b'K' => EntryType::GnuLongLink,
            other => EntryType::Other(other),
        }
    }

    /// Encode back to a typeflag byte. `Regular` encodes as '0'.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Link => b'1',
            EntryType::Symlink => b'2',
            EntryType::Char => b'3',
            EntryType::Block => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::Continuous => b'7',
            EntryType::GnuLongName => b'L',
            EntryType::GnuLongLink => b'K',
            EntryType::Other(b) => b,
        }
    }

    /// Returns true for regular (and contiguous) files.
    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, EntryType::Regular | EntryType::Continuous)
    }

    /// Returns true for directories.
    #[must_use]
    pub fn is_dir(self) -> bool {
        self == EntryType::Directory
    }

    /// Returns true for symbolic links.
    #[must_use]
    pub fn is_symlink(self) -> bool {
        self == EntryType::Symlink
    }

    /// Returns true for hard links.
    #[must_use]
    pub fn is_hard_link(self) -> bool {
        self == EntryType::Link
    }
}

impl From<u8> for EntryType {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

/// USTAR header block with named fields.
///
/// The struct maps the 512-byte block directly; accessor methods decode the
/// octal and NUL-padded string fields. Obtain a reference with
/// [`UstarHeader::from_block`].
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct UstarHeader {
    /// File path (NUL-padded).
    pub name: [u8; 100],
    /// Permissions in octal ASCII.
    pub mode: [u8; 8],
    /// Owner user ID in octal ASCII.
    pub uid: [u8; 8],
    /// Owner group ID in octal ASCII.
    pub gid: [u8; 8],
    /// Content length in octal ASCII.
    pub size: [u8; 12],
    /// Modification time (Unix timestamp) in octal ASCII.
    pub mtime: [u8; 12],
    /// Header checksum in octal ASCII.
    pub checksum: [u8; 8],
    /// Entry type flag.
    pub typeflag: u8,
    /// Link target (NUL-padded).
    pub linkname: [u8; 100],
    /// Format magic ("ustar\0" for USTAR).
    pub magic: [u8; 6],
    /// Format version.
    pub version: [u8; 2],
    /// Owner user name (NUL-padded).
    pub uname: [u8; 32],
    /// Owner group name (NUL-padded).
    pub gname: [u8; 32],
    /// Device major number in octal ASCII.
    pub devmajor: [u8; 8],
    /// Device minor number in octal ASCII.
    pub devminor: [u8; 8],
    /// Path prefix for names longer than 100 bytes (NUL-padded).
    pub prefix: [u8; 155],
    /// Padding to fill the block.
    pub pad: [u8; 12],
}

impl UstarHeader {
    /// View a 512-byte block as a header.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::BlockSize`] unless `block` is exactly 512
    /// bytes long.
    pub fn from_block(block: &[u8]) -> Result<&UstarHeader> {
        if block.len() != BLOCK_SIZE {
            return Err(HeaderError::BlockSize(block.len()));
        }
        UstarHeader::ref_from_bytes(block).map_err(|_| HeaderError::BlockSize(block.len()))
    }

    /// Get the whole block as raw bytes.
    #[must_use]
    pub fn as_block(&self) -> &[u8] {
        self.as_bytes()
    }

    /// Get the entry type.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.typeflag)
    }

    /// Decode the content length field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the field is not octal.
    pub fn entry_size(&self) -> Result<u64> {
        parse_octal(&self.size)
    }

    /// Decode the permissions field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the field is not octal.
    pub fn entry_mode(&self) -> Result<u32> {
        parse_octal(&self.mode).map(|v| v as u32)
    }

    /// Decode the owner user ID field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the field is not octal.
    pub fn entry_uid(&self) -> Result<u64> {
        parse_octal(&self.uid)
    }

    /// Decode the owner group ID field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the field is not octal.
    pub fn entry_gid(&self) -> Result<u64> {
        parse_octal(&self.gid)
    }

    /// Decode the modification time field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the field is not octal.
    pub fn entry_mtime(&self) -> Result<u64> {
        parse_octal(&self.mtime)
    }

    /// The file name with the POSIX prefix field applied.
    ///
    /// A non-empty trimmed prefix is joined as `prefix + "/" + name`.
    #[must_use]
    pub fn full_name(&self) -> Vec<u8> {
        let name = trim_field(&self.name);
        let prefix = trim_field(&self.prefix);
        if prefix.is_empty() {
            name.to_vec()
        } else {
            let mut full = Vec::with_capacity(prefix.len() + 1 + name.len());
            full.extend_from_slice(prefix);
            full.push(b'/');
            full.extend_from_slice(name);
            full
        }
    }

    /// The link target field, trimmed of padding.
    #[must_use]
    pub fn link_target(&self) -> &[u8] {
        trim_field(&self.linkname)
    }

    /// The owner user name field, trimmed of padding.
    #[must_use]
    pub fn user_name(&self) -> &[u8] {
        trim_field(&self.uname)
    }

    /// The owner group name field, trimmed of padding.
    #[must_use]
    pub fn group_name(&self) -> &[u8] {
        trim_field(&self.gname)
    }

    /// Verify the stored checksum against the computed byte sum.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::ChecksumMismatch`] on mismatch, or
    /// [`HeaderError::InvalidOctal`] if the checksum field itself cannot be
    /// decoded.
    pub fn verify_checksum(&self) -> Result<()> {
        let stored = parse_octal(&self.checksum)?;
        let computed = compute_checksum(self.as_bytes());
        if stored == computed {
            Ok(())
        } else {
            Err(HeaderError::ChecksumMismatch { stored, computed })
        }
    }
}

impl fmt::Debug for UstarHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UstarHeader")
            .field("name", &String::from_utf8_lossy(trim_field(&self.name)))
            .field("typeflag", &self.entry_type())
            .field("size", &self.entry_size().ok())
            .finish_non_exhaustive()
    }
}

/// Compute the checksum of a header block.
///
/// Sums the unsigned byte values of bytes `[0, 148)` and `[156, 512)`, plus
/// 256 for the checksum field itself (eight spaces).
#[must_use]
pub fn compute_checksum(block: &[u8]) -> u64 {
    let head: u64 = block[..148].iter().map(|&b| u64::from(b)).sum();
    let tail: u64 = block[156..].iter().map(|&b| u64::from(b)).sum();
    head + 256 + tail
}

/// Check whether a block is entirely NUL/whitespace bytes.
///
/// Such a block is tar's logical end-of-archive marker and carries no entry.
#[must_use]
pub fn is_blank_block(block: &[u8]) -> bool {
    block.iter().all(|&b| is_padding(b))
}

/// Parse an octal ASCII field, tolerating NUL/space padding on both sides.
///
/// An empty (all-padding) field decodes to 0, matching how tar writers pad
/// unused numeric fields.
///
/// # Errors
///
/// Returns [`HeaderError::InvalidOctal`] on non-octal digits or overflow.
pub fn parse_octal(field: &[u8]) -> Result<u64> {
    let trimmed = trim_field(field);
    let mut value: u64 = 0;
    for &byte in trimmed {
        if !(b'0'..=b'7').contains(&byte) {
            return Err(HeaderError::InvalidOctal(field.to_vec()));
        }
        value = value
            .checked_mul(8)
            .and_then(|v| v.checked_add(u64::from(byte - b'0')))
            .ok_or_else(|| HeaderError::InvalidOctal(field.to_vec()))?;
    }
    Ok(value)
}

/// Trim NUL and ASCII whitespace padding from both ends of a field.
#[must_use]
pub fn trim_field(field: &[u8]) -> &[u8] {
    let start = field
        .iter()
        .position(|&b| !is_padding(b))
        .unwrap_or(field.len());
    let end = field
        .iter()
        .rposition(|&b| !is_padding(b))
        .map_or(start, |i| i + 1);
    &field[start..end]
}

fn is_padding(byte: u8) -> bool {
    byte == 0 || byte == 0x0b || byte.is_ascii_whitespace()
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    /// Build a header block with the checksum filled in.
    fn make_block(name: &[u8], mode: u32, size: u64, typeflag: u8) -> [u8; 512] {
        let mut block = [0u8; 512];
        block[..name.len()].copy_from_slice(name);
        block[100..107].copy_from_slice(format!("{mode:07o}").as_bytes());
        block[124..135].copy_from_slice(format!("{size:011o}").as_bytes());
        block[156] = typeflag;
        let sum = compute_checksum(&block);
        block[148..154].copy_from_slice(format!("{sum:06o}").as_bytes());
        block[154] = 0;
        block[155] = b' ';
        block
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"0000644\0").unwrap(), 0o644);
        assert_eq!(parse_octal(b"     123 ").unwrap(), 0o123);
        assert_eq!(parse_octal(b"\0\0\0\0").unwrap(), 0);
        assert_eq!(parse_octal(b"").unwrap(), 0);
        assert!(matches!(
            parse_octal(b"0008\0\0\0\0"),
            Err(HeaderError::InvalidOctal(_))
        ));
        assert!(matches!(
            parse_octal(b"xxxxxxxx"),
            Err(HeaderError::InvalidOctal(_))
        ));
    }

    #[test]
    fn test_trim_field() {
        assert_eq!(trim_field(b"hello\0\0\0"), b"hello");
        assert_eq!(trim_field(b"  spaced  "), b"spaced");
        assert_eq!(trim_field(b"\0\0\0"), b"");
        assert_eq!(trim_field(b"mid\0gap\0"), b"mid\0gap");
    }

    #[test]
    fn test_blank_block() {
        assert!(is_blank_block(&[0u8; 512]));
        assert!(is_blank_block(&[b' '; 512]));
        let mut block = [0u8; 512];
        block[77] = b'x';
        assert!(!is_blank_block(&block));
    }

    #[test]
    fn test_block_size_check() {
        assert!(matches!(
            UstarHeader::from_block(&[0u8; 511]),
            Err(HeaderError::BlockSize(511))
        ));
        assert!(matches!(
            UstarHeader::from_block(&[0u8; 513]),
            Err(HeaderError::BlockSize(513))
        ));
        assert!(UstarHeader::from_block(&[0u8; 512]).is_ok());
    }

    #[test]
    fn test_checksum_roundtrip() {
        let block = make_block(b"etc/passwd", 0o644, 1234, b'0');
        let header = UstarHeader::from_block(&block).unwrap();
        header.verify_checksum().unwrap();
        assert_eq!(header.full_name(), b"etc/passwd");
        assert_eq!(header.entry_mode().unwrap(), 0o644);
        assert_eq!(header.entry_size().unwrap(), 1234);
        assert_eq!(header.entry_type(), EntryType::Regular);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut block = make_block(b"file.txt", 0o644, 0, b'0');
        // Corrupt a name byte without touching the checksum field.
        block[0] ^= 0x01;
        let header = UstarHeader::from_block(&block).unwrap();
        assert!(matches!(
            header.verify_checksum(),
            Err(HeaderError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_prefix_join() {
        let mut block = make_block(b"leaf.txt", 0o644, 0, b'0');
        block[345..345 + 8].copy_from_slice(b"some/dir");
        let sum = compute_checksum(&block);
        block[148..154].copy_from_slice(format!("{sum:06o}").as_bytes());
        let header = UstarHeader::from_block(&block).unwrap();
        assert_eq!(header.full_name(), b"some/dir/leaf.txt");
    }

    #[test]
    fn test_entry_type_roundtrip() {
        for byte in [b'0', b'1', b'2', b'5', b'L', b'K', b'x'] {
            assert_eq!(EntryType::from_byte(byte).to_byte(), byte);
        }
        assert_eq!(EntryType::from_byte(b'\0'), EntryType::Regular);
        assert_eq!(EntryType::Regular.to_byte(), b'0');
    }
}
