#![no_main]

use ata::{ArchiveReader, ZstdCodec};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Header validation must never panic
    let mut reader = match ArchiveReader::new(Cursor::new(data)) {
        Ok(r) => r,
        Err(_) => return,
    };

    let codec = ZstdCodec::default();

    // Walk every record, decoding and digest-checking payloads - should never panic
    loop {
        match reader.next_record() {
            Ok(Some(record)) => {
                let _ = record.entry_info().compression_ratio();
                if reader.read_verified(&record, &codec).is_err() {
                    return;
                }
            }
            Ok(None) | Err(_) => return,
        }
    }
});
