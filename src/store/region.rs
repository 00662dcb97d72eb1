use std::io::{Error, ErrorKind, Result};

/// ## Backing region
///
/// A flat, byte-addressed area the program store persists into. Reads and
/// writes outside `0..len()` fail with `UnexpectedEof`.

pub trait Region {
    fn len(&self) -> usize;
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()>;
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Region + ?Sized> Region for Box<R> {
    fn len(&self) -> usize {
        (**self).len()
    }
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        (**self).read(offset, buf)
    }
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        (**self).write(offset, data)
    }
}

pub(crate) fn bounds(region_len: usize, offset: usize, len: usize) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= region_len => Ok(offset..end),
        _ => Err(Error::new(ErrorKind::UnexpectedEof, "access past end of region")),
    }
}

/// Region held in memory. Survives a store being dropped and reopened
/// through `Store::into_region`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    bytes: Vec<u8>,
}

impl MemoryRegion {
    pub fn new(len: usize) -> MemoryRegion {
        MemoryRegion {
            bytes: vec![0; len],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> MemoryRegion {
        MemoryRegion { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl Region for MemoryRegion {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        let range = bounds(self.bytes.len(), offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let range = bounds(self.bytes.len(), offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}
