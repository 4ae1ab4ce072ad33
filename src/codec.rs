use crate::error::{AtaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// Default zstd compression level
pub const DEFAULT_LEVEL: i32 = 3;

/// Compression backends selectable when creating an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    #[default]
    Zstd,
    None,
}

impl CompressionMethod {
    /// Build the codec for this method. `level` is ignored by the identity codec.
    pub fn codec(self, level: i32) -> Box<dyn Codec> {
        match self {
            Self::Zstd => Box::new(ZstdCodec::new(level)),
            Self::None => Box::new(IdentityCodec),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zstd => "zstd",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMethod {
    type Err = AtaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zstd" => Ok(Self::Zstd),
            "none" => Ok(Self::None),
            other => Err(AtaError::Input(format!(
                "Unknown compression method: {} (expected zstd or none)",
                other
            ))),
        }
    }
}

/// Pluggable compression backend.
///
/// `decode` never fails: input it does not recognize as its own output is
/// returned unchanged. Records carry no codec tag, so this is what lets an
/// archive written with any codec be read back with the zstd decoder.
pub trait Codec {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> Vec<u8>;

    /// Like `decode`, but output longer than `limit` bytes counts as
    /// unrecognized and the input comes back unchanged.
    fn decode_limited(&self, data: &[u8], limit: u64) -> Vec<u8> {
        let decoded = self.decode(data);
        if decoded.len() as u64 > limit {
            return data.to_vec();
        }
        decoded
    }
}

/// zstd single-frame codec
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Codec for ZstdCodec {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let range = zstd::compression_level_range();
        if !range.contains(&self.level) {
            return Err(AtaError::Compression(format!(
                "zstd level {} out of range ({}..={})",
                self.level,
                range.start(),
                range.end()
            )));
        }

        // Single-shot compression records the content size in the frame header
        zstd::bulk::compress(data, self.level)
            .map_err(|e| AtaError::Compression(format!("Zstd compression failed: {}", e)))
    }

    fn decode(&self, data: &[u8]) -> Vec<u8> {
        self.decode_limited(data, u64::MAX)
    }

    fn decode_limited(&self, data: &[u8], limit: u64) -> Vec<u8> {
        let mut decoded = Vec::new();
        let result = zstd::stream::read::Decoder::new(data)
            .and_then(|decoder| decoder.take(limit.saturating_add(1)).read_to_end(&mut decoded));

        match result {
            Ok(_) if decoded.len() as u64 <= limit => decoded,
            Ok(_) => {
                tracing::trace!(len = data.len(), limit, "zstd output exceeds limit, passing through");
                data.to_vec()
            }
            Err(e) => {
                tracing::trace!(len = data.len(), error = %e, "payload is not zstd, passing through");
                data.to_vec()
            }
        }
    }
}

/// Pass-through codec used for `--compression none`
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("zstd".parse::<CompressionMethod>().unwrap(), CompressionMethod::Zstd);
        assert_eq!("NONE".parse::<CompressionMethod>().unwrap(), CompressionMethod::None);
        assert!(matches!(
            "lz4".parse::<CompressionMethod>(),
            Err(AtaError::Input(_))
        ));
        assert_eq!(CompressionMethod::default(), CompressionMethod::Zstd);
        assert_eq!(CompressionMethod::None.to_string(), "none");
    }

    #[test]
    fn test_zstd_roundtrip_shrinks_repetitive_data() {
        let codec = ZstdCodec::default();
        let data = b"repetitive payload ".repeat(200);

        let encoded = codec.encode(&data).unwrap();
        assert!(encoded.len() < data.len());
        assert_eq!(codec.decode(&encoded), data);
    }

    #[test]
    fn test_zstd_frame_records_content_size() {
        let data = b"frame header must carry the content size ".repeat(70);
        let encoded = ZstdCodec::default().encode(&data).unwrap();

        let size = zstd::zstd_safe::get_frame_content_size(&encoded);
        assert!(
            matches!(size, Ok(Some(n)) if n == data.len() as u64),
            "content size missing from frame header: {:?}",
            size
        );

        let empty = ZstdCodec::default().encode(b"").unwrap();
        assert!(matches!(
            zstd::zstd_safe::get_frame_content_size(&empty),
            Ok(Some(0))
        ));
    }

    #[test]
    fn test_zstd_decode_respects_limit() {
        let codec = ZstdCodec::default();
        let data = vec![0u8; 1 << 20];
        let encoded = codec.encode(&data).unwrap();
        assert!(encoded.len() < 1024);

        assert_eq!(codec.decode_limited(&encoded, data.len() as u64), data);
        assert_eq!(codec.decode_limited(&encoded, 4096), encoded);
    }

    #[test]
    fn test_identity_decode_respects_limit() {
        assert_eq!(IdentityCodec.decode_limited(b"abcdef", 6), b"abcdef");
        assert_eq!(IdentityCodec.decode_limited(b"abcdef", 3), b"abcdef");
    }

    #[test]
    fn test_zstd_decode_passes_through_raw_data() {
        let codec = ZstdCodec::default();
        let raw = b"plain text that was never compressed";
        assert_eq!(codec.decode(raw), raw.to_vec());
    }

    #[test]
    fn test_zstd_decode_reads_identity_output() {
        let data = b"stored without compression".to_vec();
        let stored = IdentityCodec.encode(&data).unwrap();
        assert_eq!(stored, data);
        assert_eq!(ZstdCodec::default().decode(&stored), data);
    }

    #[test]
    fn test_zstd_rejects_out_of_range_level() {
        let codec = ZstdCodec::new(10_000);
        assert!(matches!(codec.encode(b"data"), Err(AtaError::Compression(_))));
    }

    #[test]
    fn test_codec_factory() {
        let data = b"abcabcabcabcabcabcabcabcabcabc".repeat(10);
        let none = CompressionMethod::None.codec(19);
        assert_eq!(none.encode(&data).unwrap(), data);

        let zstd = CompressionMethod::Zstd.codec(19);
        let encoded = zstd.encode(&data).unwrap();
        assert_ne!(encoded, data);
        assert_eq!(zstd.decode(&encoded), data);
    }
}
