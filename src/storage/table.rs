use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::error::{Error, ErrorKind, Result};
use crate::mmap::mmap_file::MmapFile;
use crate::schema::schema::{FieldValue, RowSchema};

/// Unique identifier of a table's row file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(pub Uuid);

impl TableId {
    pub fn new() -> Self {
        TableId(Uuid::new_v4())
    }
}

impl Default for TableId {
    fn default() -> Self {
        Self::new()
    }
}

/// Table file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    pub version: u32,
    pub record_size: u32,
    pub schema_crc: u32,    // CRC32 of the row schema
}

impl TableHeader {
    pub const MAGIC: &'static [u8; 4] = b"MWSE";
    pub const VERSION: u32 = 1;
    pub const SIZE: usize = 32; // Fixed header size

    pub fn for_schema(schema: &RowSchema) -> Result<Self> {
        Ok(TableHeader {
            version: Self::VERSION,
            record_size: schema.record_size() as u32,
            schema_crc: schema.checksum()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.put_slice(Self::MAGIC);
        buf.put_u32_le(self.version);
        buf.put_u32_le(self.record_size);
        buf.put_u32_le(self.schema_crc);
        buf.put_bytes(0, Self::SIZE - buf.len());
        buf
    }

    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[..4] != Self::MAGIC {
            return Err(Error::new(ErrorKind::Corrupted, "missing table header"));
        }
        data.advance(4);
        let header = TableHeader {
            version: data.get_u32_le(),
            record_size: data.get_u32_le(),
            schema_crc: data.get_u32_le(),
        };
        if header.version != Self::VERSION {
            return Err(Error::new(
                ErrorKind::Corrupted,
                format!("incompatible table version {}", header.version),
            ));
        }
        Ok(header)
    }
}

/// Append handle for one table file. The file is created with its header
/// on first use.
pub struct TableWriter {
    pub file: File,
    pub record_size: usize,
}

impl TableWriter {
    pub fn open(path: &Path, schema: &RowSchema) -> Result<Self> {
        let header = TableHeader::for_schema(schema)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        if file.metadata()?.len() == 0 {
            file.write_all(&header.encode())?;
        } else {
            let existing = read_header(path)?;
            if existing != header {
                return Err(Error::new(
                    ErrorKind::Corrupted,
                    format!("{} was written with a different row schema", path.display()),
                ));
            }
        }

        Ok(TableWriter {
            file,
            record_size: schema.record_size(),
        })
    }

    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        debug_assert_eq!(record.len(), self.record_size);
        self.file.write_all(record)?;
        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }
}

fn read_header(path: &Path) -> Result<TableHeader> {
    let mmap = MmapFile::open_read_only(path)?;
    TableHeader::decode(mmap.data())
}

/// Number of rows in a table file. A file that was never written holds none.
pub fn row_count(path: &Path, schema: &RowSchema) -> Result<u64> {
    if !path.exists() {
        return Ok(0);
    }
    let len = std::fs::metadata(path)?.len();
    let body = len.saturating_sub(TableHeader::SIZE as u64);
    Ok(body / schema.record_size() as u64)
}

/// Decode every row of a table file.
pub fn read_rows(path: &Path, schema: &RowSchema) -> Result<Vec<Vec<FieldValue>>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mmap = MmapFile::open_read_only(path)?;
    let data = mmap.data();
    let header = TableHeader::decode(data)?;
    if header != TableHeader::for_schema(schema)? {
        return Err(Error::new(
            ErrorKind::Corrupted,
            format!("{} does not match its catalog schema", path.display()),
        ));
    }

    mmap.records(TableHeader::SIZE, schema.record_size())
        .map_err(|e| Error::new(e.kind, format!("{}: {}", path.display(), e.context)))?
        .map(|record| schema.decode(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema::PeptideQuery;

    #[test]
    fn header_layout_is_fixed() {
        let schema = PeptideQuery::schema(8, 10);
        let header = TableHeader::for_schema(&schema).unwrap();
        let encoded = header.encode();
        assert_eq!(encoded.len(), TableHeader::SIZE);
        assert_eq!(TableHeader::decode(&encoded).unwrap(), header);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let schema = PeptideQuery::schema(8, 10);
        let path = dir.path().join("absent.tbl");
        assert_eq!(row_count(&path, &schema).unwrap(), 0);
        assert!(read_rows(&path, &schema).unwrap().is_empty());
    }

    #[test]
    fn truncated_row_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tbl");
        let schema = PeptideQuery::schema(8, 10);
        let mut writer = TableWriter::open(&path, &schema).unwrap();
        writer.append(&vec![0u8; schema.record_size()]).unwrap();
        writer.file.write_all(&[1, 2, 3]).unwrap();

        assert_eq!(row_count(&path, &schema).unwrap(), 1);
        let err = read_rows(&path, &schema).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Corrupted);
    }

    #[test]
    fn reopening_with_other_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tbl");
        let schema = PeptideQuery::schema(8, 10);
        TableWriter::open(&path, &schema).unwrap();

        let other = PeptideQuery::schema(8, 11);
        let err = TableWriter::open(&path, &other).err().unwrap();
        assert_eq!(err.kind, ErrorKind::Corrupted);
    }
}
