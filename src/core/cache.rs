// Compressed JSON cache for corpora and profiling results
//
// Layout: MAGIC(4) version(u8) comp(u8) created(f64) payload_len(u64) payload

use crate::core::compression::{compress, decompress};
use crate::core::constants::*;
use crate::core::error::{ProfilerError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct CacheHeader {
    pub version: u8,
    pub compression: CompressionType,
    /// Seconds since the Unix epoch.
    pub created: f64,
    pub payload_len: u64,
}

impl CacheHeader {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.created * 1000.0) as i64)
    }
}

pub fn encode<T: Serialize>(value: &T, compression: CompressionType) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let payload = compress(&json, compression)?;
    let created = Utc::now().timestamp_millis() as f64 / 1000.0;

    let mut out = Vec::with_capacity(CACHE_HEADER_SIZE + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(CACHE_VERSION);
    out.push(compression as u8);
    out.extend_from_slice(&created.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);

    debug!(
        "Encoded cache payload: {} bytes json, {} bytes stored",
        json.len(),
        payload.len()
    );
    Ok(out)
}

fn read_header<R: Read>(reader: &mut R) -> Result<CacheHeader> {
    let mut prefix = [0u8; CACHE_HEADER_SIZE];
    reader.read_exact(&mut prefix)?;

    let magic = &prefix[0..4];
    if magic != MAGIC {
        return Err(ProfilerError::InvalidMagic {
            expected: MAGIC.to_vec(),
            got: magic.to_vec(),
        });
    }

    let version = prefix[4];
    if version != CACHE_VERSION {
        return Err(ProfilerError::UnsupportedVersion(version));
    }

    let compression = CompressionType::from_u8(prefix[5])
        .ok_or(ProfilerError::UnsupportedCompression(prefix[5]))?;

    let mut created = [0u8; 8];
    created.copy_from_slice(&prefix[6..14]);
    let mut payload_len = [0u8; 8];
    payload_len.copy_from_slice(&prefix[14..22]);

    Ok(CacheHeader {
        version,
        compression,
        created: f64::from_le_bytes(created),
        payload_len: u64::from_le_bytes(payload_len),
    })
}

pub fn decode_from<T: DeserializeOwned, R: Read>(reader: &mut R) -> Result<(CacheHeader, T)> {
    let header = read_header(reader)?;

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() as u64 != header.payload_len {
        return Err(ProfilerError::CorruptedData(format!(
            "Expected {} payload bytes, got {}",
            header.payload_len,
            payload.len()
        )));
    }

    let json = decompress(&payload, header.compression)?;
    let value = serde_json::from_slice(&json)?;
    Ok((header, value))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<(CacheHeader, T)> {
    let mut reader = bytes;
    decode_from(&mut reader)
}

pub fn write_cache<T: Serialize, P: AsRef<Path>>(
    path: P,
    value: &T,
    compression: CompressionType,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = encode(value, compression)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;

    info!("Cache written: {} ({} bytes, {:?})", path.display(), bytes.len(), compression);
    Ok(())
}

pub fn read_cache<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<(CacheHeader, T)> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let (header, value) = decode_from(&mut reader)?;

    info!(
        "Cache read: {} (created {:?})",
        path.display(),
        header.created_at()
    );
    Ok((header, value))
}
