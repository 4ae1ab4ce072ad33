use crate::codec::{Codec, CompressionMethod, DEFAULT_LEVEL};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one archive invocation.
///
/// Built once by the caller (CLI flags, a TOML file, or code) and handed to
/// [`crate::Archiver::new`]. Nothing here is process-global.
///
/// ```toml
/// compression = "zstd"
/// level = 9
/// verbose = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Codec used when creating archives
    pub compression: CompressionMethod,
    /// Compression effort passed to the codec
    pub level: i32,
    /// Report per-file progress at info level instead of debug
    pub verbose: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Zstd,
            level: DEFAULT_LEVEL,
            verbose: false,
        }
    }
}

impl ArchiveConfig {
    pub fn new(compression: CompressionMethod, level: i32) -> Self {
        Self {
            compression,
            level,
            ..Self::default()
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Codec selected by this configuration
    pub fn codec(&self) -> Box<dyn Codec> {
        self.compression.codec(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtaError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ArchiveConfig::default();
        assert_eq!(config.compression, CompressionMethod::Zstd);
        assert_eq!(config.level, 3);
        assert!(!config.verbose);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ArchiveConfig::from_toml_str("level = 12\n").unwrap();
        assert_eq!(config.level, 12);
        assert_eq!(config.compression, CompressionMethod::Zstd);
    }

    #[test]
    fn test_full_toml() {
        let config =
            ArchiveConfig::from_toml_str("compression = \"none\"\nlevel = 1\nverbose = true\n")
                .unwrap();
        assert_eq!(
            config,
            ArchiveConfig::new(CompressionMethod::None, 1).with_verbose(true)
        );
    }

    #[test]
    fn test_unknown_method_is_config_error() {
        let result = ArchiveConfig::from_toml_str("compression = \"brotli\"\n");
        assert!(matches!(result, Err(AtaError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "compression = \"zstd\"").unwrap();
        writeln!(file, "level = 19").unwrap();

        let config = ArchiveConfig::load(file.path()).unwrap();
        assert_eq!(config.level, 19);
    }
}
