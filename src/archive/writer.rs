use crate::archive::format::{unix_seconds, ArchiveHeader, EntryInfo, RecordHeader, HEADER_SIZE};
use crate::codec::Codec;
use crate::digest::content_digest;
use crate::error::{AtaError, Result};
use std::fs::{File, Metadata};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sequential archive writer.
///
/// The header is written up front with the final file count, then each record
/// is appended in one go once its payload, digest and name are known. Nothing
/// already written is ever revisited.
pub struct ArchiveWriter<W: Write> {
    writer: W,
    codec: Box<dyn Codec>,
    declared: u32,
    written: u32,
    offset: u64,
}

impl ArchiveWriter<BufWriter<File>> {
    /// Create (or truncate) an archive file that will hold `file_count` records
    pub fn create<P: AsRef<Path>>(path: P, file_count: u32, codec: Box<dyn Codec>) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), file_count, codec)
    }
}

impl<W: Write> ArchiveWriter<W> {
    /// Start an archive on an arbitrary writer
    pub fn new(mut writer: W, file_count: u32, codec: Box<dyn Codec>) -> Result<Self> {
        ArchiveHeader::new(file_count).write_to(&mut writer)?;

        Ok(Self {
            writer,
            codec,
            declared: file_count,
            written: 0,
            offset: HEADER_SIZE as u64,
        })
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u32 {
        self.written
    }

    /// Append one record built from in-memory content
    pub fn add_file(
        &mut self,
        name: &str,
        data: &[u8],
        created: i64,
        modified: i64,
    ) -> Result<EntryInfo> {
        if self.written >= self.declared {
            return Err(AtaError::Input(format!(
                "Archive header declares {} files, cannot add {}",
                self.declared, name
            )));
        }

        let payload = self.codec.encode(data)?;
        let digest = content_digest(data);

        // Validates the name before any byte of the record goes out
        let header = RecordHeader::new(
            name,
            created,
            modified,
            data.len() as u64,
            payload.len() as u64,
            digest,
        )?;

        tracing::trace!(
            name = %header.name,
            offset = self.offset,
            original = header.original_size,
            compressed = header.compressed_size,
            "writing record"
        );

        header.write_to(&mut self.writer)?;
        self.writer.write_all(&payload)?;

        self.offset += header.record_size();
        self.written += 1;

        Ok(header.entry_info())
    }

    /// Append a file from disk, stored under its base name with its timestamps
    pub fn add_file_from_disk(&mut self, disk_path: &Path) -> Result<EntryInfo> {
        let name = entry_name(disk_path)?;
        let data = std::fs::read(disk_path)?;
        let metadata = std::fs::metadata(disk_path)?;
        let (created, modified) = file_times(&metadata)?;

        self.add_file(name, &data, created, modified)
    }

    /// Flush and hand back the underlying writer. Fails if fewer records were
    /// written than the header declared.
    pub fn finish(mut self) -> Result<W> {
        if self.written != self.declared {
            return Err(AtaError::Input(format!(
                "Archive header declares {} files but {} were written",
                self.declared, self.written
            )));
        }

        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Base name of an input path as stored in the archive
pub fn entry_name(path: &Path) -> Result<&str> {
    let name = path
        .file_name()
        .ok_or_else(|| AtaError::Input(format!("No file name in path: {}", path.display())))?;

    name.to_str().ok_or_else(|| {
        AtaError::Input(format!("File name is not valid UTF-8: {}", path.display()))
    })
}

/// (created, modified) in whole seconds since the epoch
pub fn file_times(metadata: &Metadata) -> Result<(i64, i64)> {
    let modified = unix_seconds(metadata.modified()?);
    let created = creation_seconds(metadata).unwrap_or(modified);
    Ok((created, modified))
}

#[cfg(unix)]
fn creation_seconds(metadata: &Metadata) -> Option<i64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ctime())
}

#[cfg(not(unix))]
fn creation_seconds(metadata: &Metadata) -> Option<i64> {
    metadata.created().ok().map(unix_seconds)
}
