//! ata: single-file archives with per-file compression, SHA-256 integrity
//! checks and timestamp preservation.
//!
//! An archive is a 9-byte header (magic `ATA1`, version, file count) followed
//! by one record per file: a 66-byte fixed prefix, the file's base name, and
//! the (possibly zstd-compressed) payload. There is no index; archives are
//! written and read in a single sequential pass.
//!
//! # Example
//!
//! ```no_run
//! use ata::{ArchiveConfig, Archiver, CompressionMethod};
//!
//! let archiver = Archiver::new(ArchiveConfig::new(CompressionMethod::Zstd, 3));
//! archiver.create("backup.ata", &["notes.txt", "photo.jpg"])?;
//!
//! for entry in archiver.list("backup.ata")? {
//!     println!("{} ({} bytes)", entry.name, entry.original_size);
//! }
//!
//! let dir = archiver.extract("backup.ata")?;
//! # let _ = dir;
//! # Ok::<(), ata::AtaError>(())
//! ```

pub mod archive;
pub mod archiver;
pub mod codec;
pub mod config;
pub mod digest;
pub mod error;

pub use archive::{
    ArchiveHeader, ArchiveReader, ArchiveWriter, EntryInfo, RecordHeader, ARCHIVE_EXTENSION,
    FORMAT_VERSION, HEADER_SIZE, MAGIC, MAX_NAME_LENGTH, RECORD_PREFIX_SIZE,
};
pub use archiver::Archiver;
pub use codec::{Codec, CompressionMethod, IdentityCodec, ZstdCodec, DEFAULT_LEVEL};
pub use config::ArchiveConfig;
pub use digest::{content_digest, ContentDigest, DIGEST_SIZE};
pub use error::{AtaError, Result};
