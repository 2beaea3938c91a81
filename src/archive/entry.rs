//! Archive entry descriptors.

use std::borrow::Cow;

use crate::EntryType;

/// One archive member, as recorded during enumeration.
///
/// Entries are immutable snapshots: re-reading one member's content never
/// mutates another descriptor. Name fields are byte strings because tar
/// makes no UTF-8 guarantee; use [`ArchiveEntry::name_lossy`] for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// POSIX path of the member, with the USTAR prefix joined or a GNU
    /// long-name substituted, trimmed of padding.
    pub name: Vec<u8>,

    /// Permission bits.
    pub mode: u32,

    /// Owner user ID.
    pub uid: u64,

    /// Owner group ID.
    pub gid: u64,

    /// Content length in bytes. Zero for directories and markers.
    pub size: u64,

    /// Modification time as a Unix timestamp.
    pub mtime: u64,

    /// Entry type decoded from the typeflag byte.
    pub entry_type: EntryType,

    /// Link target for hard/symbolic links; empty otherwise.
    pub link_target: Vec<u8>,

    /// Owner user name; may be empty.
    pub uname: Vec<u8>,

    /// Owner group name; may be empty.
    pub gname: Vec<u8>,

    /// Byte offset from the archive start to the first content byte, just
    /// past this entry's header block. Always a multiple of 512 once
    /// assigned; 0 before enumeration assigns it.
    pub offset: u64,
}

impl ArchiveEntry {
    /// The entry name as a lossy UTF-8 string.
    #[must_use]
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// The link target as a lossy UTF-8 string.
    #[must_use]
    pub fn link_target_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.link_target)
    }

    /// Returns true for regular file entries.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// Returns true for directory entries.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// Returns true for symbolic link entries.
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.entry_type.is_symlink()
    }

    /// Returns true for hard link entries.
    #[must_use]
    pub fn is_hard_link(&self) -> bool {
        self.entry_type.is_hard_link()
    }

    /// Content length rounded up to the 512-byte block boundary.
    ///
    /// This is how many bytes the content occupies in the archive stream.
    #[must_use]
    pub fn padded_size(&self) -> u64 {
        self.size.next_multiple_of(512)
    }
}
