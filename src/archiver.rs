//! Archive facade: the entry point the command line (or any embedding code)
//! uses to create, list, extract and verify archives.

use crate::archive::{system_time, ArchiveReader, ArchiveWriter, EntryInfo, RecordHeader};
use crate::codec::ZstdCodec;
use crate::config::ArchiveConfig;
use crate::error::{AtaError, Result};
use std::fmt;
use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Orchestrates [`ArchiveWriter`] and [`ArchiveReader`] for one configuration.
///
/// Each call is independent: the archive is opened, processed in a single
/// pass, and closed before returning.
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    config: ArchiveConfig,
}

impl Archiver {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Create `output` from `inputs`, in order.
    ///
    /// Inputs that do not exist are skipped. If none remain this fails with
    /// [`AtaError::Input`] before `output` is opened. A failure after that
    /// point leaves a partially written archive on disk.
    pub fn create<P, I>(&self, output: P, inputs: &[I]) -> Result<()>
    where
        P: AsRef<Path>,
        I: AsRef<Path>,
    {
        let output = output.as_ref();

        let mut valid: Vec<&Path> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let input = input.as_ref();
            if input.exists() {
                valid.push(input);
            } else {
                tracing::warn!("Skipping missing input: {}", input.display());
            }
        }

        if valid.is_empty() {
            return Err(AtaError::Input("No files to archive".to_string()));
        }
        let count = u32::try_from(valid.len())
            .map_err(|_| AtaError::Input(format!("Too many files: {}", valid.len())))?;

        self.report(format_args!(
            "Creating archive: {} ({} files, {} level {})",
            output.display(),
            count,
            self.config.compression,
            self.config.level
        ));

        let mut writer = ArchiveWriter::create(output, count, self.config.codec())?;
        for path in valid {
            self.report(format_args!("Adding: {}", path.display()));
            let info = writer.add_file_from_disk(path)?;
            tracing::debug!(
                name = %info.name,
                original = info.original_size,
                compressed = info.compressed_size,
                "record written"
            );
        }
        writer.finish()?;

        Ok(())
    }

    /// Metadata of every record, in archive order. Payloads are skipped.
    pub fn list<P: AsRef<Path>>(&self, archive: P) -> Result<Vec<EntryInfo>> {
        ArchiveReader::open(archive)?.entries()
    }

    /// Extract into the default directory: the archive path with its
    /// extension stripped. Returns that directory.
    pub fn extract<P: AsRef<Path>>(&self, archive: P) -> Result<PathBuf> {
        let archive = archive.as_ref();
        let dest = default_extract_dir(archive)?;
        self.extract_to(archive, &dest)?;
        Ok(dest)
    }

    /// Extract every record into `dest`, creating it if needed.
    ///
    /// Records are written in archive order. The first digest mismatch aborts
    /// the operation: files extracted before it stay on disk and the
    /// mismatching file is not written. Returns the number of files written.
    pub fn extract_to<P, D>(&self, archive: P, dest: D) -> Result<usize>
    where
        P: AsRef<Path>,
        D: AsRef<Path>,
    {
        let dest = dest.as_ref();
        let mut reader = ArchiveReader::open(archive)?;

        fs::create_dir_all(dest)?;
        self.report(format_args!("Extracting to: {}", dest.display()));

        let codec = ZstdCodec::default();
        let mut extracted = 0;
        while let Some(record) = reader.next_record()? {
            self.report(format_args!("Extracting: {}", record.name));
            let data = reader.read_verified(&record, &codec)?;
            write_entry(&dest.join(&record.name), &data, &record)?;
            extracted += 1;
        }

        Ok(extracted)
    }

    /// Decode and digest-check every record without writing anything.
    /// Returns the number of verified records.
    pub fn verify<P: AsRef<Path>>(&self, archive: P) -> Result<usize> {
        let mut reader = ArchiveReader::open(archive)?;
        let codec = ZstdCodec::default();

        let mut verified = 0;
        while let Some(record) = reader.next_record()? {
            reader.read_verified(&record, &codec)?;
            self.report(format_args!("OK: {}", record.name));
            verified += 1;
        }

        Ok(verified)
    }

    fn report(&self, message: fmt::Arguments<'_>) {
        if self.config.verbose {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }
}

/// `backup.ata` extracts into `backup/`
pub fn default_extract_dir(archive: &Path) -> Result<PathBuf> {
    if archive.extension().is_none() {
        return Err(AtaError::Input(format!(
            "Cannot derive extraction directory from {} (no extension)",
            archive.display()
        )));
    }
    Ok(archive.with_extension(""))
}

fn write_entry(path: &Path, data: &[u8], record: &RecordHeader) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;

    // Stored creation time goes to atime, as utime() does
    let times = FileTimes::new()
        .set_accessed(system_time(record.created))
        .set_modified(system_time(record.modified));
    file.set_times(times)?;

    Ok(())
}
