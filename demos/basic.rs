/// Basic example demonstrating archive creation, listing and extraction
///
/// Run with: cargo run --example basic
use ata::{ArchiveConfig, Archiver, CompressionMethod};
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== ata Basic Example ===\n");

    let workdir = std::env::temp_dir().join("ata_basic_example");
    fs::create_dir_all(&workdir)?;

    let readme = workdir.join("readme.txt");
    let data = workdir.join("data.json");
    fs::write(&readme, "This is a readme file for the basic example.\n".repeat(50))?;
    fs::write(&data, br#"{"name": "Basic Example", "version": "1.0.0"}"#)?;

    let archive = workdir.join("example_basic.ata");
    let archiver =
        Archiver::new(ArchiveConfig::new(CompressionMethod::Zstd, 9).with_verbose(true));

    println!("1. Creating archive...");
    archiver.create(&archive, &[&readme, &data])?;
    println!("   Archive created: {}", archive.display());

    println!("\n2. Listing archive...");
    for entry in archiver.list(&archive)? {
        println!(
            "   - {} ({} -> {} bytes, {:.1}% saved)",
            entry.name,
            entry.original_size,
            entry.compressed_size,
            entry.compression_ratio()
        );
    }

    println!("\n3. Extracting archive...");
    let dest = archiver.extract(&archive)?;
    println!("   Extracted to: {}", dest.display());
    println!("   readme.txt round-trips: {}", fs::read(dest.join("readme.txt"))? == fs::read(&readme)?);

    println!("\nExample complete!");
    Ok(())
}
