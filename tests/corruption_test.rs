//! Corruption detection suite
//!
//! Damaged headers must be rejected before any record is read, and damaged
//! payloads must fail extraction with an integrity error naming the file.

use ata::{ArchiveConfig, Archiver, AtaError, CompressionMethod, HEADER_SIZE, RECORD_PREFIX_SIZE};
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FILES: [(&str, &[u8]); 3] = [
    ("first.txt", b"first file content"),
    ("second.txt", b"second file content, the one that gets damaged"),
    ("third.txt", b"third file content"),
];

/// Helper: Create a valid test archive with the given codec
fn create_test_archive(dir: &Path, compression: CompressionMethod) -> PathBuf {
    let inputs: Vec<PathBuf> = FILES
        .iter()
        .map(|(name, data)| {
            let path = dir.join(name);
            fs::write(&path, data).unwrap();
            path
        })
        .collect();

    let archive = dir.join("test.ata");
    Archiver::new(ArchiveConfig::new(compression, 3))
        .create(&archive, &inputs)
        .unwrap();
    archive
}

/// Helper: XOR a byte at a specific offset
fn flip_bits_at(path: &Path, offset: u64, mask: u8) {
    let mut bytes = fs::read(path).unwrap();
    bytes[offset as usize] ^= mask;
    fs::write(path, bytes).unwrap();
}

/// Helper: Overwrite a byte at a specific offset
fn corrupt_byte_at(path: &Path, offset: u64, new_value: u8) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(&[new_value]).unwrap();
}

/// Offset of the payload of record `index`, computed from the listing
fn payload_offset(archive: &Path, index: usize) -> u64 {
    let entries = Archiver::default().list(archive).unwrap();
    let mut offset = HEADER_SIZE as u64;
    for entry in &entries[..index] {
        offset += (RECORD_PREFIX_SIZE + entry.name.len()) as u64 + entry.compressed_size;
    }
    offset + (RECORD_PREFIX_SIZE + entries[index].name.len()) as u64
}

fn assert_format_error<T: std::fmt::Debug>(result: Result<T, AtaError>) {
    match result {
        Err(AtaError::Format(_)) => {}
        other => panic!("Expected Format error, got: {:?}", other),
    }
}

#[test]
fn test_corrupted_magic_token() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::Zstd);
    corrupt_byte_at(&archive, 0, b'Z');

    let archiver = Archiver::default();
    assert_format_error(archiver.list(&archive));

    let dest = dir.path().join("out");
    assert_format_error(archiver.extract_to(&archive, &dest));
    assert!(!dest.exists(), "nothing may be created for a rejected archive");
}

#[test]
fn test_unsupported_version() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::Zstd);
    corrupt_byte_at(&archive, 4, 2);

    let archiver = Archiver::default();
    assert_format_error(archiver.list(&archive));
    assert_format_error(archiver.extract(&archive));
    assert!(!dir.path().join("test").exists());
}

#[test]
fn test_not_an_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.ata");
    fs::write(&path, b"PK\x03\x04 definitely a zip").unwrap();
    assert_format_error(Archiver::default().list(&path));

    fs::write(&path, b"ATA").unwrap();
    assert_format_error(Archiver::default().list(&path));
}

#[test]
fn test_flipped_payload_bit_names_file() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::None);
    let offset = payload_offset(&archive, 1) + 7;
    flip_bits_at(&archive, offset, 0x01);

    let dest = dir.path().join("out");
    match Archiver::default().extract_to(&archive, &dest) {
        Err(AtaError::Integrity { path, expected, actual }) => {
            assert_eq!(path, "second.txt");
            assert_ne!(expected, actual);
        }
        other => panic!("Expected Integrity error, got: {:?}", other),
    }

    // Records before the damaged one stay extracted; nothing after it is written
    assert_eq!(fs::read(dest.join("first.txt")).unwrap(), FILES[0].1);
    assert!(!dest.join("second.txt").exists());
    assert!(!dest.join("third.txt").exists());
}

#[test]
fn test_flipped_compressed_payload_is_detected() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::Zstd);
    let entries = Archiver::default().list(&archive).unwrap();
    let middle = payload_offset(&archive, 2) + entries[2].compressed_size / 2;
    flip_bits_at(&archive, middle, 0x10);

    let err = Archiver::default()
        .extract_to(&archive, dir.path().join("out"))
        .unwrap_err();
    match err {
        AtaError::Integrity { path, .. } => assert_eq!(path, "third.txt"),
        other => panic!("Expected Integrity error, got: {:?}", other),
    }
}

#[test]
fn test_verify_detects_corruption() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::None);
    flip_bits_at(&archive, payload_offset(&archive, 0), 0x80);

    let err = Archiver::default().verify(&archive).unwrap_err();
    assert!(err.to_string().contains("first.txt"));
}

#[test]
fn test_listing_ignores_payload_damage() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::None);
    flip_bits_at(&archive, payload_offset(&archive, 1), 0xFF);

    assert_eq!(Archiver::default().list(&archive).unwrap().len(), 3);
}

#[test]
fn test_truncated_archive() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::None);
    let len = fs::metadata(&archive).unwrap().len();

    let file = OpenOptions::new().write(true).open(&archive).unwrap();
    file.set_len(len - 5).unwrap();
    drop(file);

    assert_format_error(Archiver::default().list(&archive));
    assert_format_error(Archiver::default().verify(&archive));
}

#[test]
fn test_inflated_file_count() {
    let dir = TempDir::new().unwrap();
    let archive = create_test_archive(dir.path(), CompressionMethod::Zstd);
    corrupt_byte_at(&archive, 5, 200);

    assert_format_error(Archiver::default().list(&archive));
}
