//! On-region layout of the metadata block.
//!
//! ```text
//! Header   magic u32, version u32, next_free_offset u32, entry_count u32, slots u32
//! Entries  name [u8; 13], size u32, data_offset u32, used u8, read_only u8  (x capacity)
//! Check    crc32 of header and entries
//! ```
//!
//! All integers are little-endian. The whole block is written in one call so
//! a torn write shows up as a checksum mismatch on the next open.

use crc::crc32;

pub const MAGIC: u32 = 0xE4F5_D3B2;
pub const VERSION: u32 = 4;
pub const HEADER_LEN: usize = 20;
pub const ENTRY_LEN: usize = NAME_FIELD + 10;
pub const NAME_LEN: usize = 12;
const NAME_FIELD: usize = NAME_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: u32,
    pub version: u32,
    pub next_free_offset: u32,
    pub entry_count: u32,
    /// Capacity of the entry table that follows.
    pub slots: u32,
}

/// One slot of the entry table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub(crate) name: String,
    pub(crate) size: u32,
    pub(crate) data_offset: u32,
    pub(crate) used: bool,
    pub(crate) read_only: bool,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn size(&self) -> usize {
        self.size as usize
    }
    pub fn data_offset(&self) -> usize {
        self.data_offset as usize
    }
    pub fn is_used(&self) -> bool {
        self.used
    }
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
    pub(crate) fn end(&self) -> usize {
        self.data_offset() + self.size()
    }
}

pub fn block_len(capacity: usize) -> usize {
    HEADER_LEN + capacity * ENTRY_LEN + 4
}

pub fn encode(next_free_offset: u32, entries: &[Entry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(block_len(entries.len()));
    let entry_count = entries.iter().filter(|e| e.used).count() as u32;
    let slots = entries.len() as u32;
    for value in [MAGIC, VERSION, next_free_offset, entry_count, slots].iter() {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    for entry in entries {
        let mut name = [0u8; NAME_FIELD];
        let bytes = entry.name.as_bytes();
        let len = bytes.len().min(NAME_LEN);
        name[..len].copy_from_slice(&bytes[..len]);
        buf.extend_from_slice(&name);
        buf.extend_from_slice(&entry.size.to_le_bytes());
        buf.extend_from_slice(&entry.data_offset.to_le_bytes());
        buf.push(entry.used as u8);
        buf.push(entry.read_only as u8);
    }
    let check = crc32::checksum_ieee(&buf);
    buf.extend_from_slice(&check.to_le_bytes());
    buf
}

fn word(buf: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(bytes)
}

/// The header alone, if it carries this version's magic. Nothing past the
/// header is checked.
pub fn peek(buf: &[u8]) -> Option<Header> {
    if buf.len() < HEADER_LEN {
        return None;
    }
    let header = Header {
        magic: word(buf, 0),
        version: word(buf, 4),
        next_free_offset: word(buf, 8),
        entry_count: word(buf, 12),
        slots: word(buf, 16),
    };
    if header.magic != MAGIC || header.version != VERSION {
        return None;
    }
    Some(header)
}

/// Parse a metadata block. `None` for anything that is not a block this
/// version wrote intact for a table of `capacity` slots: wrong magic or
/// version, bad checksum, or an entry count that disagrees with the table.
pub fn decode(buf: &[u8], capacity: usize) -> Option<(Header, Vec<Entry>)> {
    if buf.len() < block_len(capacity) {
        return None;
    }
    let header = peek(buf)?;
    if header.slots as usize != capacity {
        return None;
    }
    let body = block_len(capacity) - 4;
    if crc32::checksum_ieee(&buf[..body]) != word(buf, body) {
        return None;
    }
    let mut entries = Vec::with_capacity(capacity);
    for slot in 0..capacity {
        let at = HEADER_LEN + slot * ENTRY_LEN;
        let raw = &buf[at..at + ENTRY_LEN];
        let name_len = raw[..NAME_LEN].iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
        entries.push(Entry {
            name: String::from_utf8_lossy(&raw[..name_len]).into_owned(),
            size: word(raw, NAME_FIELD),
            data_offset: word(raw, NAME_FIELD + 4),
            used: raw[NAME_FIELD + 8] != 0,
            read_only: raw[NAME_FIELD + 9] != 0,
        });
    }
    if entries.iter().filter(|e| e.used).count() != header.entry_count as usize {
        return None;
    }
    Some((header, entries))
}
