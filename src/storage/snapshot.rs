use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Value;

pub const MAGIC: &[u8; 4] = b"FTCS";
pub const VERSION: u16 = 1;

/// Upper bound for one framed record; anything larger is treated as corruption.
const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Binary,  // framed bincode with per-record crc32
    Json,    // human readable
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub version: u16,
    pub created_at: DateTime<Utc>,
    pub entry_count: u64,
}

/// One cache entry as persisted. Full-text entries carry their stored text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub key: String,
    pub value: Value,
    pub full_text: bool,
}

#[derive(Serialize, Deserialize)]
struct JsonSnapshot {
    header: SnapshotHeader,
    records: Vec<SnapshotRecord>,
}

/// Writes `records` to `path`, creating or truncating the file.
///
/// JSON has no encoding for NaN or infinities, so a JSON snapshot holding a
/// non-finite float is rejected before the file is touched.
pub fn write(path: &Path, format: SnapshotFormat, records: &[SnapshotRecord]) -> Result<()> {
    if format == SnapshotFormat::Json {
        check_json_floats(records)?;
    }

    let header = SnapshotHeader {
        version: VERSION,
        created_at: Utc::now(),
        entry_count: records.len() as u64,
    };

    let mut out = BufWriter::new(File::create(path)?);
    match format {
        SnapshotFormat::Binary => {
            out.write_all(MAGIC)?;
            out.write_all(&VERSION.to_le_bytes())?;
            write_frame(&mut out, &bincode::serialize(&header)?)?;
            for record in records {
                write_frame(&mut out, &bincode::serialize(record)?)?;
            }
        }
        SnapshotFormat::Json => {
            let snapshot = JsonSnapshot {
                header,
                records: records.to_vec(),
            };
            serde_json::to_writer_pretty(&mut out, &snapshot)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Reads a snapshot written by `write`, detecting its format.
///
/// Binary records whose checksum does not match are skipped with a warning.
pub fn read(path: &Path) -> Result<Vec<SnapshotRecord>> {
    let data = std::fs::read(path)?;

    if data.starts_with(MAGIC) {
        read_binary(&data[MAGIC.len()..])
    } else {
        let snapshot: JsonSnapshot = serde_json::from_slice(&data)?;
        check_version(snapshot.header.version)?;
        Ok(snapshot.records)
    }
}

fn write_frame<W: Write>(out: &mut W, data: &[u8]) -> Result<()> {
    let len = data.len() as u32;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(&crc32fast::hash(data).to_le_bytes())?;
    out.write_all(data)?;
    Ok(())
}

fn check_json_floats(records: &[SnapshotRecord]) -> Result<()> {
    for record in records {
        if let Value::Float(f) = record.value {
            if !f.is_finite() {
                return Err(Error::new(
                    ErrorKind::Parse,
                    format!("key {:?} holds {} which JSON cannot represent", record.key, f),
                ));
            }
        }
    }
    Ok(())
}

fn check_version(version: u16) -> Result<()> {
    if version != VERSION {
        return Err(Error::new(
            ErrorKind::Parse,
            format!("unsupported snapshot version {}", version),
        ));
    }
    Ok(())
}

fn read_binary(data: &[u8]) -> Result<Vec<SnapshotRecord>> {
    let mut reader = FrameReader { data, offset: 0 };

    let version = u16::from_le_bytes(reader.take_array::<2>()?);
    check_version(version)?;

    let header_frame = reader
        .next_frame()?
        .ok_or_else(|| Error::new(ErrorKind::Corrupted, "snapshot has no header".to_string()))?;
    if !header_frame.checksum_ok {
        return Err(Error::new(ErrorKind::Corrupted, "snapshot header checksum mismatch".to_string()));
    }
    let header: SnapshotHeader = bincode::deserialize(header_frame.payload)?;

    let mut records = Vec::with_capacity((header.entry_count as usize).min(1 << 16));
    let mut skipped = 0usize;
    while let Some(frame) = reader.next_frame()? {
        if !frame.checksum_ok {
            warn!(offset = frame.offset, "skipping snapshot record with bad checksum");
            skipped += 1;
            continue;
        }
        match bincode::deserialize::<SnapshotRecord>(frame.payload) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(offset = frame.offset, error = %e, "skipping undecodable snapshot record");
                skipped += 1;
            }
        }
    }

    if (records.len() + skipped) as u64 != header.entry_count {
        warn!(
            expected = header.entry_count,
            found = records.len() + skipped,
            "snapshot record count differs from header"
        );
    }
    Ok(records)
}

struct Frame<'a> {
    offset: usize,
    payload: &'a [u8],
    checksum_ok: bool,
}

struct FrameReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FrameReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.offset..end];
                self.offset = end;
                Ok(slice)
            }
            None => Err(Error::new(
                ErrorKind::Corrupted,
                format!("snapshot truncated at byte {}", self.offset),
            )),
        }
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    /// `Ok(None)` at a clean end of input.
    fn next_frame(&mut self) -> Result<Option<Frame<'a>>> {
        if self.offset == self.data.len() {
            return Ok(None);
        }
        let offset = self.offset;
        let len = u32::from_le_bytes(self.take_array::<4>()?) as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::new(
                ErrorKind::Corrupted,
                format!("snapshot record at byte {} too large ({} bytes)", offset, len),
            ));
        }
        let crc = u32::from_le_bytes(self.take_array::<4>()?);
        let payload = self.take(len)?;

        Ok(Some(Frame {
            offset,
            payload,
            checksum_ok: crc32fast::hash(payload) == crc,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_records() -> Vec<SnapshotRecord> {
        vec![
            SnapshotRecord {
                key: "k1".to_string(),
                value: Value::from("hello world"),
                full_text: true,
            },
            SnapshotRecord {
                key: "k2".to_string(),
                value: Value::from(42),
                full_text: false,
            },
            SnapshotRecord {
                key: "k:3".to_string(),
                value: Value::from(&b"\x00\x01"[..]),
                full_text: false,
            },
        ]
    }

    #[test]
    fn test_binary_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.snap");
        write(&path, SnapshotFormat::Binary, &sample_records()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(MAGIC));
        assert_eq!(read(&path).unwrap(), sample_records());
    }

    #[test]
    fn test_json_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        write(&path, SnapshotFormat::Json, &sample_records()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("hello world"));
        assert_eq!(read(&path).unwrap(), sample_records());
    }

    #[test]
    fn test_corrupt_record_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.snap");
        write(&path, SnapshotFormat::Binary, &sample_records()).unwrap();

        // flip the last payload byte, which belongs to the final record
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let records = read(&path).unwrap();
        assert_eq!(records, sample_records()[..2].to_vec());
    }

    #[test]
    fn test_truncated_snapshot_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.snap");
        write(&path, SnapshotFormat::Binary, &sample_records()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let err = read(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Corrupted);
    }

    #[test]
    fn test_json_rejects_non_finite_float_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let mut records = sample_records();
        records.push(SnapshotRecord {
            key: "ratio".to_string(),
            value: Value::Float(f64::NAN),
            full_text: false,
        });

        let err = write(&path, SnapshotFormat::Json, &records).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.context.contains("ratio"));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read(&dir.path().join("absent.snap")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
