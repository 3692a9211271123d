use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;
use crate::core::error::{Error, ErrorKind, Result};

/// Memory-mapped table file for zero-copy row scans
pub struct MmapFile {
    pub mmap: Mmap,
    pub len: usize,
}

impl MmapFile {
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let len = file.metadata()?.len() as usize;

        // Only the lock holder appends, and it never truncates.
        let mmap = unsafe { MmapOptions::new().len(len).map(&file)? };

        Ok(MmapFile { mmap, len })
    }

    pub fn data(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Fixed-width records following a `header_size` byte prefix.
    pub fn records(&self, header_size: usize, record_size: usize) -> Result<std::slice::ChunksExact<'_, u8>> {
        if record_size == 0 || self.len < header_size {
            return Err(Error::new(ErrorKind::Corrupted, "mapping is shorter than its header"));
        }
        let body = &self.data()[header_size..];
        if body.len() % record_size != 0 {
            return Err(Error::new(
                ErrorKind::Corrupted,
                format!("{} trailing bytes after the last record", body.len() % record_size),
            ));
        }
        Ok(body.chunks_exact(record_size))
    }
}
