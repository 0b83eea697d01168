//! Framed bincode encoding for part files.
//!
//! Every non-Arrow part of a stored graph (manifest, topology segment) is a
//! single frame: a little-endian `u32` length prefix, the bincode payload,
//! and a CRC32 of the payload. Decoding verifies the checksum, rejects
//! trailing bytes, and requires the payload to be fully consumed.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use plegma_common::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Encodes `value` into a framed part file at `path`, replacing any existing
/// file. With `sync`, the file is fsynced before returning.
pub fn write_part<T: Serialize>(path: &Path, value: &T, sync: bool) -> Result<()> {
    let data = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| Error::Serialization(e.to_string()))?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_u32::<LittleEndian>(data.len() as u32)?;
    writer.write_all(&data)?;
    writer.write_u32::<LittleEndian>(crc32fast::hash(&data))?;
    writer.flush()?;

    if sync {
        writer.get_ref().sync_all()?;
    }
    Ok(())
}

/// Decodes a framed part file written by [`write_part`].
pub fn read_part<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let len = reader.read_u32::<LittleEndian>()? as usize;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    let expected = reader.read_u32::<LittleEndian>()?;
    let actual = crc32fast::hash(&data);
    if actual != expected {
        return Err(Error::Serialization(format!(
            "checksum mismatch in {}: expected {expected:#010x}, got {actual:#010x}",
            path.display()
        )));
    }

    let mut rest = [0u8; 1];
    if reader.read(&mut rest)? != 0 {
        return Err(Error::Serialization(format!(
            "trailing bytes after frame in {}",
            path.display()
        )));
    }

    let (value, consumed) =
        bincode::serde::decode_from_slice(&data, bincode::config::standard())
            .map_err(|e| Error::Serialization(e.to_string()))?;
    if consumed != data.len() {
        return Err(Error::Serialization(format!(
            "frame in {} not fully consumed: {consumed} of {len} bytes",
            path.display()
        )));
    }
    Ok(value)
}
