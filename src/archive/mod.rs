mod format;
mod reader;
mod writer;

pub use format::{
    system_time, unix_seconds, validate_entry_name, ArchiveHeader, EntryInfo, RecordHeader,
    ARCHIVE_EXTENSION, FORMAT_VERSION, HEADER_SIZE, MAGIC, MAX_NAME_LENGTH, RECORD_PREFIX_SIZE,
};
pub use reader::ArchiveReader;
pub use writer::{entry_name, file_times, ArchiveWriter};
