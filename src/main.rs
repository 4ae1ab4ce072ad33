//! ata - create, list, extract and verify .ata archives

use anyhow::{Context, Result};
use ata::{ArchiveConfig, Archiver, EntryInfo};
use clap::Parser;
use std::process::ExitCode;
use tracing::Level;

mod cli;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => ArchiveConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ArchiveConfig::default(),
    };

    match cli.command {
        Commands::Create {
            archive,
            files,
            compression,
            level,
            verbose,
        } => {
            let config = ArchiveConfig {
                compression: compression.map(Into::into).unwrap_or(base.compression),
                level: level.unwrap_or(base.level),
                verbose: verbose || base.verbose,
            };
            Archiver::new(config)
                .create(&archive, &files)
                .with_context(|| format!("creating {}", archive.display()))?;
        }

        Commands::Extract {
            archive,
            dest,
            verbose,
        } => {
            let archiver = Archiver::new(base.clone().with_verbose(verbose || base.verbose));
            let result = match dest {
                Some(dir) => archiver.extract_to(&archive, &dir).map(|_| ()),
                None => archiver.extract(&archive).map(|_| ()),
            };
            result.with_context(|| format!("extracting {}", archive.display()))?;
        }

        Commands::List {
            archive,
            verbose,
            json,
        } => {
            let entries = Archiver::new(base)
                .list(&archive)
                .with_context(|| format!("listing {}", archive.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_listing(&entries, verbose);
            }
        }

        Commands::Verify { archive, verbose } => {
            let archiver = Archiver::new(base.clone().with_verbose(verbose || base.verbose));
            let count = archiver
                .verify(&archive)
                .with_context(|| format!("verifying {}", archive.display()))?;
            println!("{}: {} files OK", archive.display(), count);
        }
    }

    Ok(())
}

fn print_listing(entries: &[EntryInfo], verbose: bool) {
    println!("Files in archive: {}", entries.len());
    for entry in entries {
        if !verbose {
            println!("{}", entry.name);
            continue;
        }

        println!("{}:", entry.name);
        println!("  Created: {}", format_timestamp(entry.created));
        println!("  Modified: {}", format_timestamp(entry.modified));
        println!("  Size: {} bytes", entry.original_size);
        println!("  Compressed size: {} bytes", entry.compressed_size);
        println!("  Compression ratio: {:.1}%", entry.compression_ratio());
    }
}

/// `YYYY-MM-DD HH:MM:SS UTC` for seconds since the epoch
fn format_timestamp(seconds: i64) -> String {
    let days = seconds.div_euclid(86_400);
    let secs_of_day = seconds.rem_euclid(86_400);

    // days -> civil date, proleptic Gregorian
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year,
        month,
        day,
        secs_of_day / 3_600,
        secs_of_day % 3_600 / 60,
        secs_of_day % 60
    )
}
