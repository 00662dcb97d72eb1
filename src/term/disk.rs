use crate::store::{bounds, Region};
use std::fs::{File, OpenOptions};
use std::io::{Read, Result, Seek, SeekFrom, Write};
use std::path::Path;

/// Backing region kept in a host file so programs survive the shell.
pub struct FileRegion {
    file: File,
    len: usize,
}

impl FileRegion {
    pub fn open<P: AsRef<Path>>(path: P, len: usize) -> Result<FileRegion> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        if file.metadata()?.len() < len as u64 {
            file.set_len(len as u64)?;
        }
        Ok(FileRegion { file, len })
    }
}

impl Region for FileRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        bounds(self.len, offset, buf.len())?;
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset as u64))?;
        file.read_exact(buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        bounds(self.len, offset, data.len())?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        self.file.sync_data()
    }
}
