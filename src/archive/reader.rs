use crate::archive::format::{
    validate_entry_name, ArchiveHeader, EntryInfo, RecordHeader, HEADER_SIZE,
    RECORD_PREFIX_SIZE,
};
use crate::codec::Codec;
use crate::digest::{content_digest, to_hex};
use crate::error::{AtaError, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Single-pass archive reader.
///
/// There is no index: a record's position is only known once the previous
/// record has been consumed, so records are visited strictly in order with
/// [`next_record`](Self::next_record). After each record header the caller
/// either reads the payload or lets the reader skip it.
pub struct ArchiveReader<R> {
    reader: R,
    header: ArchiveHeader,
    archive_len: u64,
    position: u64,
    next_index: u32,
    pending_payload: u64,
}

impl ArchiveReader<BufReader<File>> {
    /// Open an archive file and validate its header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Validate the header of an archive held by `reader`. No record is
    /// touched if the magic token or version is wrong.
    pub fn new(mut reader: R) -> Result<Self> {
        let archive_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = ArchiveHeader::read_from(&mut reader)?;
        tracing::debug!(files = header.file_count, bytes = archive_len, "archive header ok");

        Ok(Self {
            reader,
            header,
            archive_len,
            position: HEADER_SIZE as u64,
            next_index: 0,
            pending_payload: 0,
        })
    }

    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Number of records declared by the header
    pub fn file_count(&self) -> u32 {
        self.header.file_count
    }

    /// Advance to the next record header, skipping the previous payload if it
    /// was not read. Returns `None` once every declared record was visited.
    pub fn next_record(&mut self) -> Result<Option<RecordHeader>> {
        self.skip_payload()?;

        if self.next_index >= self.header.file_count {
            return Ok(None);
        }

        let index = self.next_index;
        let record = RecordHeader::read_from(&mut self.reader)
            .map_err(|e| with_record_index(e, index))?;
        validate_entry_name(&record.name)?;

        self.position += (RECORD_PREFIX_SIZE + record.name.len()) as u64;
        let remaining = self.archive_len.saturating_sub(self.position);
        if record.compressed_size > remaining {
            return Err(AtaError::Format(format!(
                "Payload of {} extends past end of archive ({} bytes declared, {} available)",
                record.name, record.compressed_size, remaining
            )));
        }

        self.pending_payload = record.compressed_size;
        self.next_index += 1;

        Ok(Some(record))
    }

    /// Read the raw payload of the current record
    pub fn read_payload(&mut self) -> Result<Vec<u8>> {
        let len = usize::try_from(self.pending_payload).map_err(|_| {
            AtaError::Format(format!("Payload too large: {} bytes", self.pending_payload))
        })?;

        let mut payload = vec![0u8; len];
        self.reader.read_exact(&mut payload)?;

        self.position += self.pending_payload;
        self.pending_payload = 0;
        Ok(payload)
    }

    /// Read, decode and digest-check the payload of `record`. Decoding never
    /// produces more than the record's declared original size.
    pub fn read_verified(&mut self, record: &RecordHeader, codec: &dyn Codec) -> Result<Vec<u8>> {
        let payload = self.read_payload()?;
        let data = codec.decode_limited(&payload, record.original_size);

        let actual = content_digest(&data);
        if actual != record.digest {
            return Err(AtaError::Integrity {
                path: record.name.clone(),
                expected: to_hex(&record.digest),
                actual: to_hex(&actual),
            });
        }

        Ok(data)
    }

    /// Collect metadata of every record without decoding payloads
    pub fn entries(mut self) -> Result<Vec<EntryInfo>> {
        let mut entries = Vec::with_capacity(self.header.file_count.min(4096) as usize);
        while let Some(record) = self.next_record()? {
            entries.push(record.entry_info());
        }
        Ok(entries)
    }

    fn skip_payload(&mut self) -> Result<()> {
        if self.pending_payload == 0 {
            return Ok(());
        }

        let skip = i64::try_from(self.pending_payload).map_err(|_| {
            AtaError::Format(format!("Payload too large: {} bytes", self.pending_payload))
        })?;
        self.reader.seek(SeekFrom::Current(skip))?;

        self.position += self.pending_payload;
        self.pending_payload = 0;
        Ok(())
    }
}

fn with_record_index(err: AtaError, index: u32) -> AtaError {
    match err {
        AtaError::Format(msg) => AtaError::Format(format!("{} (record {})", msg, index)),
        other => other,
    }
}
