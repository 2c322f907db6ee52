//! Indexed dictionary tables
//!
//! SNP records address their strings through small integer indices into
//! de-duplicated dictionaries. Two dictionary kinds exist:
//!
//! * [`IndexedStrings`] - unique strings addressed by position
//! * [`IndexedOctetStrings`] - fixed-size binary blobs stored back to back
//!
//! ```text
//! strings: [varsize count][varsize len][bytes]...[varsize len][bytes]
//! octets:  [u32 element_size]([varsize total_size][bytes])?
//! ```
//!
//! All loaders check untrusted counts and sizes before allocating storage for them.

use std::collections::HashMap;
use std::io::{Read, Write};

use super::primitive::{
    read_fixed_u32, read_length_prefixed_string, read_varsize, truncated, write_fixed_u32,
    write_length_prefixed_bytes, write_varsize,
};
use crate::error::{CodecError, Result, TableError, WriteError};

/// Number of entries addressable by indices `0..=max_index`
fn max_count(max_index: usize) -> usize {
    max_index.saturating_add(1)
}

/// An ordered table of unique strings addressed by index
#[derive(Debug, Clone, Default)]
pub struct IndexedStrings {
    strings: Vec<String>,

    /// Reverse lookup, populated on first insertion
    lookup: HashMap<String, usize>,

    /// Number of entries reflected in `lookup`
    synced: usize,
}
impl IndexedStrings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Indexes entries added since the last sync; duplicates resolve to their first position
    fn sync_lookup(&mut self) {
        for (i, value) in self.strings.iter().enumerate().skip(self.synced) {
            self.lookup.entry(value.clone()).or_insert(i);
        }
        self.synced = self.strings.len();
    }

    /// Returns whether `value` already has an index or there is room for a new one
    pub fn can_index(&mut self, value: &str, max_index: usize) -> bool {
        self.sync_lookup();
        self.lookup.contains_key(value) || self.strings.len() < max_count(max_index)
    }

    /// Returns whether every value in `values` can be indexed at once
    pub fn can_index_all<'a, I>(&mut self, values: I, max_index: usize) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.sync_lookup();
        let mut new_values: Vec<&str> = values
            .into_iter()
            .filter(|value| !self.lookup.contains_key(*value))
            .collect();
        new_values.sort_unstable();
        new_values.dedup();
        self.strings.len() + new_values.len() <= max_count(max_index)
    }

    /// Returns the index of `value`, inserting it if needed
    ///
    /// Returns `None` if the value is new and the table already holds `max_index + 1` entries.
    pub fn get_index(&mut self, value: &str, max_index: usize) -> Option<usize> {
        self.sync_lookup();
        if let Some(&index) = self.lookup.get(value) {
            return Some(index);
        }
        if self.strings.len() >= max_count(max_index) {
            return None;
        }
        let index = self.strings.len();
        self.strings.push(value.to_string());
        self.lookup.insert(value.to_string(), index);
        self.synced = self.strings.len();
        Some(index)
    }
}
impl PartialEq for IndexedStrings {
    fn eq(&self, other: &Self) -> bool {
        self.strings == other.strings
    }
}
impl Eq for IndexedStrings {}
impl<S: Into<String>> FromIterator<S> for IndexedStrings {
    /// Collects strings in order; duplicates keep their own positions
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            strings: iter.into_iter().map(Into::into).collect(),
            lookup: HashMap::new(),
            synced: 0,
        }
    }
}

/// A table of fixed-size binary blobs stored as one concatenated buffer
///
/// An element size of zero means the table is unused.
#[derive(Debug, Clone, Default)]
pub struct IndexedOctetStrings {
    element_size: usize,
    data: Vec<u8>,

    /// Reverse lookup, populated on first insertion
    lookup: HashMap<Vec<u8>, usize>,

    /// Number of entries reflected in `lookup`
    synced: usize,
}
impl IndexedOctetStrings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from its element size and concatenated contents
    pub fn from_bytes(element_size: usize, data: Vec<u8>) -> Result<Self> {
        let aligned = if element_size == 0 {
            data.is_empty()
        } else {
            data.len() % element_size == 0
        };
        if !aligned {
            return Err(TableError::MisalignedOctets {
                field: "octet strings",
                total_size: data.len(),
                element_size,
            }
            .into());
        }
        Ok(Self {
            element_size,
            data,
            lookup: HashMap::new(),
            synced: 0,
        })
    }

    #[must_use]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Returns the concatenated contents of all entries
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        if self.element_size == 0 {
            0
        } else {
            self.data.len() / self.element_size
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.element_size;
        Some(&self.data[start..start + self.element_size])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    /// Returns whether `value` has the size of this table's elements
    ///
    /// An unused table accepts any non-empty value and adopts its size.
    #[must_use]
    pub fn accepts(&self, value: &[u8]) -> bool {
        if self.element_size == 0 {
            !value.is_empty()
        } else {
            value.len() == self.element_size
        }
    }

    /// Indexes entries added since the last sync; duplicates resolve to their first position
    fn sync_lookup(&mut self) {
        let len = self.len();
        for i in self.synced..len {
            let start = i * self.element_size;
            let value = &self.data[start..start + self.element_size];
            if !self.lookup.contains_key(value) {
                self.lookup.insert(value.to_vec(), i);
            }
        }
        self.synced = len;
    }

    /// Returns whether `value` already has an index or there is room for a new one
    pub fn can_index(&mut self, value: &[u8], max_index: usize) -> bool {
        if !self.accepts(value) {
            return false;
        }
        self.sync_lookup();
        self.lookup.contains_key(value) || self.len() < max_count(max_index)
    }

    /// Returns the index of `value`, inserting it if needed
    ///
    /// Returns `None` if the value does not match the element size, or if it is new
    /// and the table already holds `max_index + 1` entries.
    pub fn get_index(&mut self, value: &[u8], max_index: usize) -> Option<usize> {
        if !self.can_index(value, max_index) {
            return None;
        }
        if let Some(&index) = self.lookup.get(value) {
            return Some(index);
        }
        self.element_size = value.len();
        let index = self.len();
        self.data.extend_from_slice(value);
        self.lookup.insert(value.to_vec(), index);
        self.synced = self.len();
        Some(index)
    }
}
impl PartialEq for IndexedOctetStrings {
    fn eq(&self, other: &Self) -> bool {
        self.element_size == other.element_size && self.data == other.data
    }
}
impl Eq for IndexedOctetStrings {}

/// Rejects an entry that a reader limited to `max_length` bytes would refuse
fn check_entry_length(length: usize, max_length: usize, field: &'static str) -> Result<()> {
    if length > max_length {
        return Err(WriteError::EntryTooLong {
            field,
            length,
            max_length,
        }
        .into());
    }
    Ok(())
}

/// Writes `varsize(count)` followed by each string, length-prefixed, in index order
///
/// A table larger than `max_index + 1` entries, or holding an entry longer than
/// `max_length` bytes, is rejected before anything is written.
pub fn store_indexed_strings<W: Write>(
    writer: &mut W,
    table: &IndexedStrings,
    max_index: usize,
    max_length: usize,
    field: &'static str,
) -> Result<()> {
    if table.len() > max_count(max_index) {
        return Err(WriteError::TableOverflow {
            field,
            count: table.len(),
            max_count: max_count(max_index),
        }
        .into());
    }
    for value in table.iter() {
        check_entry_length(value.len(), max_length, field)?;
    }
    write_varsize(writer, table.len(), field)?;
    for value in table.iter() {
        write_length_prefixed_bytes(writer, value.as_bytes(), field)?;
    }
    Ok(())
}

/// Reads a table written by [`store_indexed_strings`]
///
/// The count must not exceed `max_index + 1` and each entry must not exceed `max_length` bytes.
pub fn load_indexed_strings<R: Read>(
    reader: &mut R,
    max_index: usize,
    max_length: usize,
    field: &'static str,
) -> Result<IndexedStrings> {
    let count = read_varsize(reader, field)?;
    if count > max_count(max_index) {
        return Err(TableError::CountTooLarge {
            field,
            count,
            max_count: max_count(max_index),
        }
        .into());
    }
    let mut strings = Vec::with_capacity(count);
    for _ in 0..count {
        strings.push(read_length_prefixed_string(reader, max_length, field)?);
    }
    Ok(IndexedStrings::from_iter(strings))
}

/// Writes the element size and, if nonzero, the varsize-prefixed concatenated contents
///
/// The element size must not exceed `max_length` bytes.
pub fn store_indexed_octet_strings<W: Write>(
    writer: &mut W,
    table: &IndexedOctetStrings,
    max_index: usize,
    max_length: usize,
    field: &'static str,
) -> Result<()> {
    if table.len() > max_count(max_index) {
        return Err(WriteError::TableOverflow {
            field,
            count: table.len(),
            max_count: max_count(max_index),
        }
        .into());
    }
    check_entry_length(table.element_size(), max_length, field)?;
    write_fixed_u32(writer, table.element_size() as u64, field)?;
    if table.element_size() != 0 {
        write_varsize(writer, table.as_bytes().len(), field)?;
        writer.write_all(table.as_bytes())?;
    }
    Ok(())
}

/// Reads a table written by [`store_indexed_octet_strings`]
///
/// The total size must be a multiple of the element size and hold at most
/// `max_index + 1` elements, each no longer than `max_length` bytes.
pub fn load_indexed_octet_strings<R: Read>(
    reader: &mut R,
    max_index: usize,
    max_length: usize,
    field: &'static str,
) -> Result<IndexedOctetStrings> {
    let element_size = read_fixed_u32(reader, field)? as usize;
    if element_size == 0 {
        return Ok(IndexedOctetStrings::new());
    }
    if element_size > max_length {
        return Err(CodecError::LengthTooLarge {
            field,
            length: element_size,
            max_length,
        }
        .into());
    }

    let total_size = read_varsize(reader, field)?;
    if total_size % element_size != 0 {
        return Err(TableError::MisalignedOctets {
            field,
            total_size,
            element_size,
        }
        .into());
    }
    if total_size / element_size > max_count(max_index) {
        return Err(TableError::CountTooLarge {
            field,
            count: total_size / element_size,
            max_count: max_count(max_index),
        }
        .into());
    }

    let mut data = vec![0; total_size];
    reader.read_exact(&mut data).map_err(truncated(field))?;
    IndexedOctetStrings::from_bytes(element_size, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn stored_strings(values: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varsize(&mut buf, values.len(), "test").unwrap();
        for value in values {
            write_length_prefixed_bytes(&mut buf, value.as_bytes(), "test").unwrap();
        }
        buf
    }

    // ==================== IndexedStrings Tests ====================

    #[test]
    fn test_get_index_deduplicates() {
        let mut table = IndexedStrings::new();
        assert_eq!(table.get_index("A", 10), Some(0));
        assert_eq!(table.get_index("G", 10), Some(1));
        assert_eq!(table.get_index("A", 10), Some(0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("G"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_get_index_overflow() {
        let mut table = IndexedStrings::new();
        assert_eq!(table.get_index("a", 1), Some(0));
        assert_eq!(table.get_index("b", 1), Some(1));
        assert!(!table.can_index("c", 1));
        assert_eq!(table.get_index("c", 1), None);
        // existing values still resolve in a full table
        assert!(table.can_index("b", 1));
        assert_eq!(table.get_index("b", 1), Some(1));
    }

    #[test]
    fn test_can_index_all() {
        let mut table: IndexedStrings = ["A"].into_iter().collect();
        assert!(table.can_index_all(["A", "G", "G"], 1));
        assert!(!table.can_index_all(["G", "T"], 1));
        assert!(table.can_index_all([], 0));
    }

    #[test]
    fn test_duplicates_sync_once() {
        let mut table: IndexedStrings = ["A", "G", "A"].into_iter().collect();
        assert_eq!(table.get_index("A", 10), Some(0));
        assert_eq!(table.synced, 3);
        assert_eq!(table.lookup.len(), 2);

        // later lookups see the table as synced despite the duplicate
        assert_eq!(table.get_index("T", 10), Some(3));
        assert_eq!(table.synced, table.len());
        assert!(table.can_index("G", 3));
    }

    #[test]
    fn test_get_index_after_collect() {
        let mut table: IndexedStrings = ["het", "rare"].into_iter().collect();
        assert_eq!(table.get_index("rare", 10), Some(1));
        assert_eq!(table.get_index("common", 10), Some(2));
    }

    #[test]
    fn test_store_load_strings() -> Result<()> {
        let table: IndexedStrings = ["het", "rare", ""].into_iter().collect();
        let mut buf = Vec::new();
        store_indexed_strings(&mut buf, &table, 10, 16, "comments")?;
        assert_eq!(buf, stored_strings(&["het", "rare", ""]));

        let loaded = load_indexed_strings(&mut buf.as_slice(), 10, 16, "comments")?;
        assert_eq!(loaded, table);
        Ok(())
    }

    #[test]
    fn test_store_strings_entry_length_limit() -> Result<()> {
        let at_limit: IndexedStrings = ["x".repeat(16)].into_iter().collect();
        let mut buf = Vec::new();
        store_indexed_strings(&mut buf, &at_limit, 10, 16, "comments")?;
        assert_eq!(load_indexed_strings(&mut buf.as_slice(), 10, 16, "comments")?, at_limit);

        let over: IndexedStrings = ["ok".to_string(), "x".repeat(17)].into_iter().collect();
        let mut buf = Vec::new();
        assert!(matches!(
            store_indexed_strings(&mut buf, &over, 10, 16, "comments"),
            Err(Error::WriteError(WriteError::EntryTooLong {
                field: "comments",
                length: 17,
                max_length: 16,
            }))
        ));
        assert!(buf.is_empty());
        Ok(())
    }

    #[test]
    fn test_store_strings_overflow() {
        let table: IndexedStrings = ["a", "b", "c"].into_iter().collect();
        let mut buf = Vec::new();
        assert!(matches!(
            store_indexed_strings(&mut buf, &table, 1, 16, "alleles"),
            Err(Error::WriteError(WriteError::TableOverflow { count: 3, max_count: 2, .. }))
        ));
    }

    #[test]
    fn test_load_strings_count_too_large() {
        // three well-formed entries but only two addressable
        let buf = stored_strings(&["a", "b", "c"]);
        assert!(matches!(
            load_indexed_strings(&mut buf.as_slice(), 1, 16, "alleles"),
            Err(Error::TableError(TableError::CountTooLarge {
                field: "alleles",
                count: 3,
                max_count: 2
            }))
        ));
        assert!(load_indexed_strings(&mut buf.as_slice(), 2, 16, "alleles").is_ok());
    }

    #[test]
    fn test_load_strings_entry_too_long() {
        let buf = stored_strings(&["short", "much longer"]);
        assert!(matches!(
            load_indexed_strings(&mut buf.as_slice(), 10, 8, "extra"),
            Err(Error::CodecError(CodecError::LengthTooLarge { length: 11, .. }))
        ));
    }

    #[test]
    fn test_load_strings_truncated() {
        let mut buf = stored_strings(&["het", "rare"]);
        buf.truncate(buf.len() - 1);
        let err = load_indexed_strings(&mut buf.as_slice(), 10, 16, "comments").unwrap_err();
        assert!(err.is_truncated());
    }

    // ==================== IndexedOctetStrings Tests ====================

    #[test]
    fn test_octet_get_index() {
        let mut table = IndexedOctetStrings::new();
        assert_eq!(table.get_index(&[1, 2], 10), Some(0));
        assert_eq!(table.element_size(), 2);
        assert_eq!(table.get_index(&[3, 4], 10), Some(1));
        assert_eq!(table.get_index(&[1, 2], 10), Some(0));
        assert_eq!(table.get_index(&[1, 2, 3], 10), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(&[3u8, 4][..]));
        assert_eq!(table.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_octet_empty_value_rejected() {
        let mut table = IndexedOctetStrings::new();
        assert!(!table.accepts(&[]));
        assert_eq!(table.get_index(&[], 10), None);
    }

    #[test]
    fn test_octet_from_bytes_misaligned() {
        assert!(IndexedOctetStrings::from_bytes(3, vec![0; 7]).is_err());
        assert!(IndexedOctetStrings::from_bytes(0, vec![0; 1]).is_err());
        let table = IndexedOctetStrings::from_bytes(3, vec![0; 6]).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_store_load_octets() -> Result<()> {
        let table = IndexedOctetStrings::from_bytes(4, (0..12).collect())?;
        let mut buf = Vec::new();
        store_indexed_octet_strings(&mut buf, &table, 10, 16, "quality codes")?;
        assert_eq!(&buf[..5], &[0, 0, 0, 4, 12]);

        let loaded = load_indexed_octet_strings(&mut buf.as_slice(), 10, 16, "quality codes")?;
        assert_eq!(loaded, table);
        assert_eq!(loaded.get(2), Some(&[8u8, 9, 10, 11][..]));
        Ok(())
    }

    #[test]
    fn test_store_octets_element_length_limit() -> Result<()> {
        let at_limit = IndexedOctetStrings::from_bytes(16, vec![7; 32])?;
        let mut buf = Vec::new();
        store_indexed_octet_strings(&mut buf, &at_limit, 10, 16, "quality codes")?;
        assert_eq!(
            load_indexed_octet_strings(&mut buf.as_slice(), 10, 16, "quality codes")?,
            at_limit
        );

        let over = IndexedOctetStrings::from_bytes(17, vec![7; 17])?;
        assert!(matches!(
            store_indexed_octet_strings(&mut Vec::new(), &over, 10, 16, "quality codes"),
            Err(Error::WriteError(WriteError::EntryTooLong { length: 17, .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_store_load_unused_octets() -> Result<()> {
        let mut buf = Vec::new();
        store_indexed_octet_strings(&mut buf, &IndexedOctetStrings::new(), 10, 16, "quality codes")?;
        assert_eq!(buf, [0, 0, 0, 0]);
        let loaded = load_indexed_octet_strings(&mut buf.as_slice(), 10, 16, "quality codes")?;
        assert!(loaded.is_empty());
        assert_eq!(loaded.element_size(), 0);
        Ok(())
    }

    #[test]
    fn test_load_octets_misaligned() {
        let mut buf = Vec::new();
        write_fixed_u32(&mut buf, 4, "test").unwrap();
        write_varsize(&mut buf, 10, "test").unwrap();
        buf.extend_from_slice(&[0; 10]);
        assert!(matches!(
            load_indexed_octet_strings(&mut buf.as_slice(), 10, 16, "quality codes"),
            Err(Error::TableError(TableError::MisalignedOctets {
                total_size: 10,
                element_size: 4,
                ..
            }))
        ));
    }

    #[test]
    fn test_load_octets_too_many_elements() {
        // 3 elements of 2 bytes with max_index 1: rejected before reading the payload
        let mut buf = Vec::new();
        write_fixed_u32(&mut buf, 2, "test").unwrap();
        write_varsize(&mut buf, 6, "test").unwrap();
        assert!(matches!(
            load_indexed_octet_strings(&mut buf.as_slice(), 1, 16, "quality codes"),
            Err(Error::TableError(TableError::CountTooLarge { count: 3, .. }))
        ));
    }

    #[test]
    fn test_load_octets_fewer_elements_than_max() -> Result<()> {
        let mut buf = Vec::new();
        write_fixed_u32(&mut buf, 2, "test")?;
        write_varsize(&mut buf, 2, "test")?;
        buf.extend_from_slice(&[7, 8]);
        let loaded = load_indexed_octet_strings(&mut buf.as_slice(), 255, 16, "quality codes")?;
        assert_eq!(loaded.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_octets_element_too_long() {
        let mut buf = Vec::new();
        write_fixed_u32(&mut buf, 1 << 20, "test").unwrap();
        assert!(matches!(
            load_indexed_octet_strings(&mut buf.as_slice(), 10, 65536, "quality codes"),
            Err(Error::CodecError(CodecError::LengthTooLarge { .. }))
        ));
    }

    #[test]
    fn test_load_octets_truncated_payload() {
        let mut buf = Vec::new();
        write_fixed_u32(&mut buf, 2, "test").unwrap();
        write_varsize(&mut buf, 4, "test").unwrap();
        buf.extend_from_slice(&[1, 2, 3]);
        let err =
            load_indexed_octet_strings(&mut buf.as_slice(), 10, 16, "quality codes").unwrap_err();
        assert!(err.is_truncated());
    }
}
