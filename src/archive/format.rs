use crate::digest::{ContentDigest, DIGEST_SIZE};
use crate::error::{AtaError, Result};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Magic token at offset 0 of every archive
pub const MAGIC: [u8; 4] = *b"ATA1";

/// Current (and only) format version
pub const FORMAT_VERSION: u8 = 1;

/// Archive header size in bytes: magic + version + file count
pub const HEADER_SIZE: usize = 4 + 1 + 4;

/// Fixed part of a record, before the name and payload
pub const RECORD_PREFIX_SIZE: usize = 2 + 8 + 8 + 8 + 8 + DIGEST_SIZE;

/// Maximum entry name length in bytes (UTF-8)
pub const MAX_NAME_LENGTH: usize = u16::MAX as usize;

/// Default file extension for archives
pub const ARCHIVE_EXTENSION: &str = "ata";

/// Global header at the beginning of the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub version: u8,
    pub file_count: u32,
}

impl ArchiveHeader {
    pub fn new(file_count: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            file_count,
        }
    }

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&[self.version])?;
        writer.write_all(&self.file_count.to_le_bytes())?;
        Ok(())
    }

    /// Read and validate the header. Magic and version are checked before
    /// anything else is trusted.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut buf)
            .map_err(|e| truncated(e, "archive header"))?;

        if buf[0..4] != MAGIC {
            return Err(AtaError::Format(format!(
                "Invalid magic token: expected {:02x?}, found {:02x?}",
                MAGIC,
                &buf[0..4]
            )));
        }

        let version = buf[4];
        if version != FORMAT_VERSION {
            return Err(AtaError::Format(format!(
                "Unsupported archive version: {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let file_count = u32::from_le_bytes([buf[5], buf[6], buf[7], buf[8]]);

        Ok(Self {
            version,
            file_count,
        })
    }
}

/// Per-file record header: fixed prefix followed by the UTF-8 name.
///
/// Layout (all integers little-endian, no padding):
/// - Name length: uint16 (2 bytes)
/// - Created: int64 seconds since epoch (8 bytes)
/// - Modified: int64 seconds since epoch (8 bytes)
/// - Original size: uint64 (8 bytes)
/// - Compressed size: uint64 (8 bytes)
/// - SHA-256 of uncompressed content (32 bytes)
/// - Name: variable
///
/// The payload (`compressed_size` bytes) follows immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub name: String,
    pub created: i64,
    pub modified: i64,
    pub original_size: u64,
    pub compressed_size: u64,
    pub digest: ContentDigest,
}

impl RecordHeader {
    /// Build a record header, rejecting names that do not fit the length field
    pub fn new(
        name: impl Into<String>,
        created: i64,
        modified: i64,
        original_size: u64,
        compressed_size: u64,
        digest: ContentDigest,
    ) -> Result<Self> {
        let name = name.into();
        if name.len() > MAX_NAME_LENGTH {
            return Err(AtaError::Input(format!(
                "Name too long: {} bytes (max {})",
                name.len(),
                MAX_NAME_LENGTH
            )));
        }

        Ok(Self {
            name,
            created,
            modified,
            original_size,
            compressed_size,
            digest,
        })
    }

    /// Write prefix and name. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let name_bytes = self.name.as_bytes();
        let name_len = u16::try_from(name_bytes.len()).map_err(|_| {
            AtaError::Input(format!(
                "Name too long: {} bytes (max {})",
                name_bytes.len(),
                MAX_NAME_LENGTH
            ))
        })?;

        writer.write_all(&name_len.to_le_bytes())?;
        writer.write_all(&self.created.to_le_bytes())?;
        writer.write_all(&self.modified.to_le_bytes())?;
        writer.write_all(&self.original_size.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        writer.write_all(&self.digest)?;
        writer.write_all(name_bytes)?;

        Ok(RECORD_PREFIX_SIZE + name_bytes.len())
    }

    /// Read prefix and name. The payload is left unread.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut prefix = [0u8; RECORD_PREFIX_SIZE];
        reader
            .read_exact(&mut prefix)
            .map_err(|e| truncated(e, "record header"))?;

        let name_len = u16::from_le_bytes(le_bytes(&prefix, 0)) as usize;
        let created = i64::from_le_bytes(le_bytes(&prefix, 2));
        let modified = i64::from_le_bytes(le_bytes(&prefix, 10));
        let original_size = u64::from_le_bytes(le_bytes(&prefix, 18));
        let compressed_size = u64::from_le_bytes(le_bytes(&prefix, 26));
        let digest: ContentDigest = le_bytes(&prefix, 34);

        let mut name_buf = vec![0u8; name_len];
        reader
            .read_exact(&mut name_buf)
            .map_err(|e| truncated(e, "record name"))?;

        let name = String::from_utf8(name_buf)
            .map_err(|e| AtaError::Format(format!("Invalid UTF-8 in entry name: {}", e)))?;

        Ok(Self {
            name,
            created,
            modified,
            original_size,
            compressed_size,
            digest,
        })
    }

    /// Total size of this record in the container, payload included.
    /// Saturates for hostile sizes near `u64::MAX`.
    pub fn record_size(&self) -> u64 {
        ((RECORD_PREFIX_SIZE + self.name.len()) as u64).saturating_add(self.compressed_size)
    }

    pub fn entry_info(&self) -> EntryInfo {
        EntryInfo {
            name: self.name.clone(),
            created: self.created,
            modified: self.modified,
            original_size: self.original_size,
            compressed_size: self.compressed_size,
        }
    }
}

/// Record metadata as reported by listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub created: i64,
    pub modified: i64,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl EntryInfo {
    /// Space saved by compression, in percent. Zero for empty files.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
    }
}

/// Entry names must be bare file names so extraction stays inside the
/// destination directory.
pub fn validate_entry_name(name: &str) -> Result<()> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if unsafe_name {
        return Err(AtaError::Format(format!("Unsafe entry name: {:?}", name)));
    }
    Ok(())
}

/// Whole seconds since the epoch, truncated toward zero
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}

/// Inverse of [`unix_seconds`]
pub fn system_time(seconds: i64) -> SystemTime {
    if seconds >= 0 {
        UNIX_EPOCH + Duration::from_secs(seconds as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(seconds.unsigned_abs())
    }
}

fn le_bytes<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

fn truncated(err: io::Error, what: &str) -> AtaError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        AtaError::Format(format!("Truncated {}", what))
    } else {
        AtaError::Io(err)
    }
}
