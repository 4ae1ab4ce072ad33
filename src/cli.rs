//! Command-line interface for ata

use ata::CompressionMethod;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ata")]
#[command(version)]
#[command(about = "AnmiTali Archive - terminal archiver with zstd compression and SHA-256 checks", long_about = None)]
pub struct Cli {
    /// TOML file with default settings (compression, level, verbose)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new archive
    Create {
        /// Archive file to write
        archive: PathBuf,

        /// Files to add, in order (missing paths are skipped)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Compression method
        #[arg(short, long, value_enum)]
        compression: Option<CompressionArg>,

        /// Compression level (zstd: 1-22, higher = smaller and slower)
        #[arg(short, long, allow_negative_numbers = true)]
        level: Option<i32>,

        /// Report each file as it is added
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract an archive into a directory named after it
    Extract {
        /// Archive file
        archive: PathBuf,

        /// Extract into DIR instead of the archive name without extension
        #[arg(short = 'd', long = "dest", value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Report each file as it is extracted
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show archive contents
    List {
        /// Archive file
        archive: PathBuf,

        /// Show timestamps, sizes and compression ratio
        #[arg(short, long)]
        verbose: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check every file's checksum without extracting
    Verify {
        /// Archive file
        archive: PathBuf,

        /// Report each verified file
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    Zstd,
    None,
}

impl From<CompressionArg> for CompressionMethod {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Zstd => CompressionMethod::Zstd,
            CompressionArg::None => CompressionMethod::None,
        }
    }
}
