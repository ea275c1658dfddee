// Compression backends for the cache container

use crate::core::constants::CompressionType;
use crate::core::error::{ProfilerError, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

pub fn compress(data: &[u8], compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),

        CompressionType::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => Ok(lz4::block::compress(data, None, true)?),

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(ProfilerError::UnsupportedCompression(2)),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => Ok(zstd::encode_all(data, 0)?),

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(ProfilerError::UnsupportedCompression(3)),
    }
}

pub fn decompress(data: &[u8], compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),

        CompressionType::Zlib => {
            let mut decoder = ZlibDecoder::new(data);
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| ProfilerError::DecompressionFailed(format!("Zlib: {}", e)))?;
            Ok(decompressed)
        }

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => lz4::block::decompress(data, None)
            .map_err(|e| ProfilerError::DecompressionFailed(format!("LZ4: {}", e))),

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(ProfilerError::UnsupportedCompression(2)),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => zstd::decode_all(data)
            .map_err(|e| ProfilerError::DecompressionFailed(format!("Zstd: {}", e))),

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(ProfilerError::UnsupportedCompression(3)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_passthrough() {
        let data = b"1 2 3 NaN";
        assert_eq!(compress(data, CompressionType::None).unwrap(), data);
        assert_eq!(decompress(data, CompressionType::None).unwrap(), data);
    }

    #[test]
    fn test_zlib_restores_payload() {
        let original = br#"{"PID":"1","RunID":"ADL1"}"#.repeat(20);
        let packed = compress(&original, CompressionType::Zlib).unwrap();
        assert!(packed.len() < original.len());
        assert_eq!(decompress(&packed, CompressionType::Zlib).unwrap(), original);
    }

    #[test]
    fn test_garbage_zlib_fails() {
        let result = decompress(b"not zlib at all", CompressionType::Zlib);
        assert!(matches!(result, Err(ProfilerError::DecompressionFailed(_))));
    }
}
