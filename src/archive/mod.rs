//! Archive enumeration and on-demand content reads.
//!
//! [`TarReader`] opens a tar archive (plain, gzip, or bzip2), enumerates all
//! member entries in one sequential pass, and can then retrieve any single
//! entry's raw content by re-seeking to its recorded byte offset.
//!
//! # Overview
//!
//! The three on-disk formats are unified behind one internal byte source
//! with four capabilities: read, skip, rewind, close. Plain archives seek
//! natively; the gzip and bzip2 decoders cannot seek, so skipping reads and
//! discards, and rewinding reopens the compressed stream from the start.
//! [`TarReader`] never special-cases a format beyond that.
//!
//! Enumeration is eager: [`TarReader::entries`] walks every header block
//! from offset 0 to the end of the archive and returns the full entry list
//! without buffering any content. Each [`ArchiveEntry`] records the byte
//! offset of its content, so [`TarReader::read_entry`] can later reposition
//! the stream and read exactly `size` bytes.
//!
//! # Example
//!
//! ```no_run
//! use tar_reader::archive::TarReader;
//!
//! let mut reader = TarReader::open("backup.tar.gz").unwrap();
//! for entry in reader.entries().unwrap() {
//!     if entry.is_file() {
//!         let content = reader.read_entry(&entry).unwrap();
//!         println!("{}: {} bytes", entry.name_lossy(), content.len());
//!     }
//! }
//! reader.close();
//! ```

mod entry;
mod error;
mod limits;
mod reader;
mod source;

pub use entry::ArchiveEntry;
pub use error::{ReadError, Result};
pub use limits::Limits;
pub use reader::TarReader;
pub use source::Format;
