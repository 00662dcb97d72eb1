/*!
## Rust Store Module

A flat program store: named byte blobs in a bump-allocated data area,
described by a fixed entry table that is rewritten after every mutation.

Saving a name always allocates fresh bytes at the bump cursor. The bytes the
name owned before stay behind, unreachable, until `compact` runs.

*/

mod meta;
mod region;
mod seed;

pub use meta::{Entry, Header, ENTRY_LEN, HEADER_LEN, MAGIC, NAME_LEN, VERSION};
pub use region::{MemoryRegion, Region};
pub(crate) use region::bounds;
pub use seed::SEEDS;

use crate::config::Config;
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// Outcome of a bounded load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub copied: usize,
    pub total: usize,
}

impl Transfer {
    pub fn is_truncated(&self) -> bool {
        self.copied < self.total
    }
}

pub struct Store<R: Region> {
    region: R,
    entries: Vec<Entry>,
    next_free: usize,
    data_start: usize,
    data_capacity: usize,
    max_file_size: usize,
}

impl<R: Region> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.list())
            .field("next_free", &self.next_free)
            .finish()
    }
}

fn io_error(error: std::io::Error) -> Error {
    tracing::warn!(%error, "backing region failed");
    error!(DiskIoError)
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > NAME_LEN {
        return Err(error!(BadName; "NAME MUST BE 1 TO 12 CHARACTERS"));
    }
    if !name.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(error!(BadName; "NAME MUST BE PRINTABLE ASCII"));
    }
    Ok(())
}

impl<R: Region> Store<R> {
    /// Open the store persisted in `region`. A region without an intact
    /// metadata block is treated as empty and reinitialized. A block written
    /// for a different `max_entries` is refused rather than wiped.
    pub fn open(region: R, config: &Config) -> Result<Store<R>> {
        config.validate()?;
        if region.len() < config.region_size {
            return Err(error!(InternalError; "REGION SMALLER THAN CONFIGURED"));
        }
        let mut store = Store {
            region,
            entries: vec![Entry::default(); config.max_entries],
            next_free: 0,
            data_start: config.metadata_size,
            data_capacity: config.data_capacity(),
            max_file_size: config.max_file_size,
        };
        let mut buf = vec![0u8; meta::block_len(config.max_entries)];
        store.region.read(0, &mut buf).map_err(io_error)?;
        if let Some(header) = meta::peek(&buf) {
            if header.slots as usize != config.max_entries {
                tracing::error!(
                    stored = header.slots,
                    configured = config.max_entries,
                    "store was written with another entry table size"
                );
                return Err(error!(InternalError; "STORE TABLE SIZE DIFFERS FROM CONFIG"));
            }
        }
        match meta::decode(&buf, config.max_entries) {
            Some((header, entries)) if store.consistent(&header, &entries) => {
                store.entries = entries;
                store.next_free = header.next_free_offset as usize;
                tracing::debug!(count = store.count(), next_free = store.next_free, "store opened");
            }
            _ => {
                tracing::warn!("no valid store metadata; reinitializing");
                store.persist()?;
            }
        }
        Ok(store)
    }

    /// Open, then install any missing built-in programs.
    pub fn open_seeded(region: R, config: &Config) -> Result<Store<R>> {
        let mut store = Store::open(region, config)?;
        store.install_seeds()?;
        Ok(store)
    }

    pub fn install_seeds(&mut self) -> Result<()> {
        for (name, content, read_only) in SEEDS.iter() {
            if self.find(name).is_none() {
                self.create(name, content.as_bytes(), *read_only)?;
            }
        }
        Ok(())
    }

    fn consistent(&self, header: &Header, entries: &[Entry]) -> bool {
        let next_free = header.next_free_offset as usize;
        next_free <= self.data_capacity
            && entries
                .iter()
                .filter(|e| e.used)
                .all(|e| e.end() <= next_free && check_name(&e.name).is_ok())
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn into_region(self) -> R {
        self.region
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.used && e.name == name)
    }

    fn free_slot(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.used)
    }

    fn persist(&mut self) -> Result<()> {
        let block = meta::encode(self.next_free as u32, &self.entries);
        self.region.write(0, &block).map_err(io_error)
    }

    /// Persist the table, restoring the in-memory state on failure so the
    /// store keeps describing what the region holds.
    fn commit(&mut self, saved: (Vec<Entry>, usize)) -> Result<()> {
        if let Err(error) = self.persist() {
            let (entries, next_free) = saved;
            self.entries = entries;
            self.next_free = next_free;
            return Err(error);
        }
        Ok(())
    }

    fn snapshot(&self) -> (Vec<Entry>, usize) {
        (self.entries.clone(), self.next_free)
    }

    fn place(&mut self, slot: usize, name: &str, content: &[u8], read_only: bool) -> Result<()> {
        if content.len() > self.max_file_size {
            return Err(error!(CapacityExceeded; "FILE TOO LARGE"));
        }
        let offset = self.next_free;
        if offset + content.len() > self.data_capacity {
            return Err(error!(CapacityExceeded));
        }
        self.region
            .write(self.data_start + offset, content)
            .map_err(io_error)?;
        let saved = self.snapshot();
        self.entries[slot] = Entry {
            name: name.to_string(),
            size: content.len() as u32,
            data_offset: offset as u32,
            used: true,
            read_only,
        };
        self.next_free += content.len();
        self.commit(saved)?;
        tracing::debug!(name, size = content.len(), offset, "program stored");
        Ok(())
    }

    /// Store a new program. Fails if the name is taken.
    pub fn create(&mut self, name: &str, content: &[u8], read_only: bool) -> Result<()> {
        check_name(name)?;
        if self.find(name).is_some() {
            return Err(error!(NameCollision));
        }
        let slot = self
            .free_slot()
            .ok_or_else(|| error!(CapacityExceeded; "ENTRY TABLE FULL"))?;
        self.place(slot, name, content, read_only)
    }

    /// Store `content` under `name`, replacing any writable program of that
    /// name. The replacement always lands at fresh bytes.
    pub fn save(&mut self, name: &str, content: &[u8]) -> Result<()> {
        check_name(name)?;
        let slot = match self.find(name) {
            Some(slot) if self.entries[slot].read_only => return Err(error!(ReadOnlyViolation)),
            Some(slot) => slot,
            None => self
                .free_slot()
                .ok_or_else(|| error!(CapacityExceeded; "ENTRY TABLE FULL"))?,
        };
        self.place(slot, name, content, false)
    }

    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.get(name).ok_or_else(|| error!(NotFound))?;
        let mut buf = vec![0u8; entry.size()];
        self.region
            .read(self.data_start + entry.data_offset(), &mut buf)
            .map_err(io_error)?;
        Ok(buf)
    }

    /// Copy as much of `name` as fits into `buf`.
    pub fn load_into(&self, name: &str, buf: &mut [u8]) -> Result<Transfer> {
        let entry = self.get(name).ok_or_else(|| error!(NotFound))?;
        let copied = entry.size().min(buf.len());
        self.region
            .read(self.data_start + entry.data_offset(), &mut buf[..copied])
            .map_err(io_error)?;
        Ok(Transfer {
            copied,
            total: entry.size(),
        })
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        let slot = self.find(name).ok_or_else(|| error!(NotFound))?;
        if self.entries[slot].read_only {
            return Err(error!(ReadOnlyViolation));
        }
        let saved = self.snapshot();
        self.entries[slot].used = false;
        self.commit(saved)?;
        tracing::debug!(name, "program deleted");
        Ok(())
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let slot = self.find(old).ok_or_else(|| error!(NotFound))?;
        if self.entries[slot].read_only {
            return Err(error!(ReadOnlyViolation));
        }
        check_name(new)?;
        if self.find(new).is_some() {
            return Err(error!(NameCollision));
        }
        let saved = self.snapshot();
        self.entries[slot].name = new.to_string();
        self.commit(saved)?;
        tracing::debug!(old, new, "program renamed");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.find(name).map(|slot| &self.entries[slot])
    }

    /// Used entries in slot order.
    pub fn list(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.used).collect()
    }

    pub fn count(&self) -> usize {
        self.entries.iter().filter(|e| e.used).count()
    }

    pub fn capacity(&self) -> usize {
        self.data_capacity
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().filter(|e| e.used).map(Entry::size).sum()
    }

    pub fn free_bytes(&self) -> usize {
        self.data_capacity - self.used_bytes()
    }

    /// Bytes behind the bump cursor that no used entry owns.
    pub fn orphaned_bytes(&self) -> usize {
        self.next_free - self.used_bytes()
    }

    /// Bytes a save can still claim without compaction.
    pub fn allocatable_bytes(&self) -> usize {
        self.data_capacity - self.next_free
    }

    /// Rewrite every used program contiguously from the start of the data
    /// area and pull the bump cursor back. Returns the bytes reclaimed.
    ///
    /// When the space past the cursor can hold every used program, they are
    /// first copied there and the table committed, then moved down and
    /// committed again. A failure at either step rolls back to a table whose
    /// bytes were not touched. Without that room programs slide down in
    /// offset order and the in-memory table follows each completed write, so
    /// a failed table write leaves this session correct but the persisted
    /// table stale.
    pub fn compact(&mut self) -> Result<usize> {
        let mut live = vec![];
        for (slot, entry) in self.entries.iter().enumerate().filter(|(_, e)| e.used) {
            let mut buf = vec![0u8; entry.size()];
            self.region
                .read(self.data_start + entry.data_offset(), &mut buf)
                .map_err(io_error)?;
            live.push((slot, buf));
        }
        live.sort_by_key(|(slot, _)| self.entries[*slot].data_offset);
        let used: usize = live.iter().map(|(_, bytes)| bytes.len()).sum();
        let reclaimed = self.next_free - used;
        if reclaimed == 0 {
            return Ok(0);
        }
        if self.allocatable_bytes() >= used {
            let staged = self.next_free;
            self.relocate(&live, staged)?;
            self.relocate(&live, 0)?;
        } else {
            self.slide(&live)?;
        }
        tracing::info!(reclaimed, "store compacted");
        Ok(reclaimed)
    }

    /// Copy `live` contiguously from `base` and commit. The caller picks a
    /// `base` clear of every byte the current table names.
    fn relocate(&mut self, live: &[(usize, Vec<u8>)], base: usize) -> Result<()> {
        let saved = self.snapshot();
        let mut offset = base;
        for (slot, bytes) in live {
            if let Err(error) = self.region.write(self.data_start + offset, bytes) {
                self.entries = saved.0;
                self.next_free = saved.1;
                return Err(io_error(error));
            }
            self.entries[*slot].data_offset = offset as u32;
            offset += bytes.len();
        }
        self.next_free = offset;
        self.commit(saved)
    }

    /// Move `live` down in place. Each program lands at or below its old
    /// offset and ends at or below its old end, so programs not yet moved
    /// stay readable.
    fn slide(&mut self, live: &[(usize, Vec<u8>)]) -> Result<()> {
        let mut offset = 0;
        for (slot, bytes) in live {
            self.region
                .write(self.data_start + offset, bytes)
                .map_err(io_error)?;
            self.entries[*slot].data_offset = offset as u32;
            offset += bytes.len();
        }
        self.next_free = offset;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use std::cell::Cell;
    use std::rc::Rc;

    fn small() -> Config {
        Config {
            max_entries: 4,
            metadata_size: 256,
            region_size: 256 + 64,
            max_file_size: 48,
            ..Config::default()
        }
    }

    fn store() -> Store<MemoryRegion> {
        let config = small();
        Store::open(MemoryRegion::new(config.region_size), &config).unwrap()
    }

    #[test]
    fn test_fresh_region_is_empty() {
        let s = store();
        assert_eq!(s.count(), 0);
        assert_eq!(s.free_bytes(), 64);
        assert_eq!(&s.region().as_bytes()[0..4], &MAGIC.to_le_bytes());
    }

    #[test]
    fn test_overwrite_abandons_old_bytes() {
        let mut s = store();
        s.save("A", b"1234").unwrap();
        let first = s.get("A").unwrap().data_offset();
        s.save("A", b"xy").unwrap();
        assert_eq!(s.get("A").unwrap().data_offset(), first + 4);
        assert_eq!(s.load("A").unwrap(), b"xy");
        assert_eq!(s.orphaned_bytes(), 4);
        assert_eq!(s.used_bytes(), 2);
    }

    #[test]
    fn test_capacity_check_precedes_write() {
        let mut s = store();
        s.save("A", &[1; 40]).unwrap();
        let before = s.region().clone();
        let err = s.save("B", &[2; 30]).unwrap_err();
        assert!(err.is(ErrorCode::CapacityExceeded));
        assert_eq!(s.region(), &before);
        assert!(s.get("B").is_none());
    }

    #[test]
    fn test_file_size_limit() {
        let mut s = store();
        assert!(s.save("BIG", &[0; 49]).unwrap_err().is(ErrorCode::CapacityExceeded));
    }

    #[test]
    fn test_table_full() {
        let mut s = store();
        for name in ["A", "B", "C", "D"].iter() {
            s.create(name, b"", false).unwrap();
        }
        let err = s.create("E", b"", false).unwrap_err();
        assert!(err.is(ErrorCode::CapacityExceeded));
        assert_eq!(s.count(), 4);
    }

    #[test]
    fn test_bad_names() {
        let mut s = store();
        assert!(s.save("", b"").unwrap_err().is(ErrorCode::BadName));
        assert!(s.save("THIRTEEN.CHRS", b"").unwrap_err().is(ErrorCode::BadName));
        assert!(s.save("TAB\tNAME", b"").unwrap_err().is(ErrorCode::BadName));
        assert!(s.save("TWELVE.CHARS", b"").is_ok());
    }

    #[test]
    fn test_compact_reclaims() {
        let mut s = store();
        s.save("A", &[1; 20]).unwrap();
        s.save("B", &[2; 10]).unwrap();
        s.save("A", &[3; 20]).unwrap();
        s.delete("B").unwrap();
        assert_eq!(s.allocatable_bytes(), 14);
        assert_eq!(s.compact().unwrap(), 30);
        assert_eq!(s.get("A").unwrap().data_offset(), 0);
        assert_eq!(s.load("A").unwrap(), vec![3; 20]);
        assert_eq!(s.allocatable_bytes(), 44);
    }

    /// Region whose table writes can be made to fail.
    struct Flaky {
        inner: MemoryRegion,
        table_fails: Rc<Cell<bool>>,
    }

    impl Region for Flaky {
        fn len(&self) -> usize {
            self.inner.len()
        }
        fn read(&self, offset: usize, buf: &mut [u8]) -> std::io::Result<()> {
            self.inner.read(offset, buf)
        }
        fn write(&mut self, offset: usize, data: &[u8]) -> std::io::Result<()> {
            if offset == 0 && self.table_fails.get() {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "table write refused"));
            }
            self.inner.write(offset, data)
        }
    }

    fn flaky() -> (Store<Flaky>, Rc<Cell<bool>>) {
        let config = small();
        let table_fails = Rc::new(Cell::new(false));
        let region = Flaky {
            inner: MemoryRegion::new(config.region_size),
            table_fails: table_fails.clone(),
        };
        (Store::open(region, &config).unwrap(), table_fails)
    }

    #[test]
    fn test_compact_with_room_is_atomic() {
        let (mut s, table_fails) = flaky();
        s.save("A", b"aa").unwrap();
        s.save("B", b"bbbb").unwrap();
        s.save("A", b"AAAAAAAA").unwrap();
        let before = s.get("B").unwrap().data_offset();
        table_fails.set(true);
        assert!(s.compact().unwrap_err().is(ErrorCode::DiskIoError));
        assert_eq!(s.load("A").unwrap(), b"AAAAAAAA");
        assert_eq!(s.load("B").unwrap(), b"bbbb");
        assert_eq!(s.get("B").unwrap().data_offset(), before);
        assert_eq!(s.orphaned_bytes(), 2);

        let s = Store::open(s.into_region().inner, &small()).unwrap();
        assert_eq!(s.load("A").unwrap(), b"AAAAAAAA");
        assert_eq!(s.load("B").unwrap(), b"bbbb");
    }

    #[test]
    fn test_compact_with_room_survives_reopen() {
        let (mut s, _) = flaky();
        s.save("A", b"aa").unwrap();
        s.save("B", b"bbbb").unwrap();
        s.save("A", b"AAAAAAAA").unwrap();
        assert_eq!(s.compact().unwrap(), 2);
        assert_eq!(s.allocatable_bytes(), 64 - 12);
        let s = Store::open(s.into_region().inner, &small()).unwrap();
        assert_eq!(s.load("A").unwrap(), b"AAAAAAAA");
        assert_eq!(s.load("B").unwrap(), b"bbbb");
        assert_eq!(s.orphaned_bytes(), 0);
    }

    #[test]
    fn test_compact_in_place_keeps_session_readable() {
        let (mut s, table_fails) = flaky();
        s.save("A", &[1; 20]).unwrap();
        s.save("B", &[2; 10]).unwrap();
        s.save("A", &[3; 30]).unwrap();
        assert!(s.allocatable_bytes() < s.used_bytes());
        table_fails.set(true);
        assert!(s.compact().unwrap_err().is(ErrorCode::DiskIoError));
        assert_eq!(s.load("A").unwrap(), vec![3; 30]);
        assert_eq!(s.load("B").unwrap(), vec![2; 10]);
        assert_eq!(s.orphaned_bytes(), 0);
    }

    #[test]
    fn test_compact_nothing_to_reclaim() {
        let mut s = store();
        s.save("A", b"abc").unwrap();
        assert_eq!(s.compact().unwrap(), 0);
        assert_eq!(s.get("A").unwrap().data_offset(), 0);
    }

    #[test]
    fn test_other_table_size_is_refused() {
        let mut s = store();
        s.save("KEEP", b"+.").unwrap();
        let region = s.into_region();
        let wider = Config {
            max_entries: 5,
            ..small()
        };
        let err = Store::open(region.clone(), &wider).unwrap_err();
        assert!(err.is(ErrorCode::InternalError));
        let s = Store::open(region, &small()).unwrap();
        assert_eq!(s.load("KEEP").unwrap(), b"+.");
    }

    #[test]
    fn test_inconsistent_table_reinitializes() {
        let config = small();
        let mut entries = vec![Entry::default(); 4];
        entries[0] = Entry {
            name: "X".to_string(),
            size: 10,
            data_offset: 60,
            used: true,
            read_only: false,
        };
        let mut region = MemoryRegion::new(config.region_size);
        region.write(0, &meta::encode(70, &entries)).unwrap();
        let s = Store::open(region, &config).unwrap();
        assert_eq!(s.count(), 0);
    }
}
