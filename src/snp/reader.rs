//! SNP table reader
//!
//! Reads a stream written by [`crate::write_snp_table`] in the exact mirrored order.
//! Every size is validated before it is trusted, and after the records are read every
//! record index is checked against its table. Any failure discards the whole table.
//!
//! ```text
//! magic -> seq-id -> strings (x4) -> octets -> records -> index validation -> table
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use super::SNP_MAGIC;
use super::record::{
    MAX_ALLELE_INDEX, MAX_COMMENT_INDEX, MAX_EXTRA_INDEX, MAX_QUALITY_CODES_INDEX,
    SNP_RECORD_SIZE, SnpInfo,
};
use crate::{
    Result, SeqId, SnpTable, SnpTableParts,
    codec::{
        GiWidth, load_indexed_octet_strings, load_indexed_strings, read_fixed_u32, read_gi,
        read_seq_id, read_varsize,
    },
    error::ReadError,
};

/// Default maximum length of one string or octet-string entry
pub const DEFAULT_MAX_ENTRY_LENGTH: usize = 65536;

/// Default maximum encoded length of one complex feature
pub const DEFAULT_MAX_FEATURE_LENGTH: usize = 1 << 24;

/// Default maximum size of a decompressed annotation blob
pub const DEFAULT_MAX_DECOMPRESSED_LENGTH: usize = 1 << 30;

/// Upper bound on records preallocated before any of them has been read
const MAX_PREALLOCATED_RECORDS: usize = (1 << 20) / SNP_RECORD_SIZE;

/// A configured SNP table reader
///
/// Readers hold only configuration, so one reader can decode any number of
/// independent streams, from any number of threads.
///
/// # Examples
///
/// ```
/// use binsnp::{GiWidth, ReaderBuilder, Result, SeqId, SnpTable, SnpTableParts};
///
/// fn main() -> Result<()> {
///     let table = SnpTable::from_parts(SnpTableParts::new(SeqId::Gi(12345)))?;
///     let bytes = table.to_bytes()?;
///
///     let reader = ReaderBuilder::default().gi_width(GiWidth::Bits32).build();
///     assert_eq!(reader.read_bytes(&bytes)?, table);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SnpTableReader {
    pub(crate) gi_width: GiWidth,
    pub(crate) max_entry_length: usize,
    pub(crate) max_feature_length: usize,
    pub(crate) max_decompressed_length: usize,
}
impl Default for SnpTableReader {
    fn default() -> Self {
        Self {
            gi_width: GiWidth::default(),
            max_entry_length: DEFAULT_MAX_ENTRY_LENGTH,
            max_feature_length: DEFAULT_MAX_FEATURE_LENGTH,
            max_decompressed_length: DEFAULT_MAX_DECOMPRESSED_LENGTH,
        }
    }
}
impl SnpTableReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn gi_width(&self) -> GiWidth {
        self.gi_width
    }

    #[must_use]
    pub fn max_entry_length(&self) -> usize {
        self.max_entry_length
    }

    #[must_use]
    pub fn max_feature_length(&self) -> usize {
        self.max_feature_length
    }

    #[must_use]
    pub fn max_decompressed_length(&self) -> usize {
        self.max_decompressed_length
    }

    /// Reads the sequence identifier: a nonzero gi, or gi 0 followed by its text form
    pub(crate) fn read_table_seq_id<R: Read>(&self, reader: &mut R) -> Result<SeqId> {
        match read_gi(reader, self.gi_width, "gi")? {
            0 => Ok(SeqId::Text(read_seq_id(reader, self.max_entry_length)?)),
            gi => Ok(SeqId::Gi(gi)),
        }
    }

    /// Reads one SNP table from `reader`
    pub fn read<R: Read>(&self, reader: &mut R) -> Result<SnpTable> {
        let magic = read_fixed_u32(reader, "magic")?;
        if magic != SNP_MAGIC {
            return Err(ReadError::InvalidMagicNumber(magic).into());
        }

        let mut parts = SnpTableParts::new(self.read_table_seq_id(reader)?);
        let max_length = self.max_entry_length;
        parts.comments =
            load_indexed_strings(reader, MAX_COMMENT_INDEX.into(), max_length, "comments")?;
        parts.alleles =
            load_indexed_strings(reader, MAX_ALLELE_INDEX.into(), max_length, "alleles")?;
        parts.extra = load_indexed_strings(reader, MAX_EXTRA_INDEX.into(), max_length, "extra")?;
        parts.quality_codes_str = load_indexed_strings(
            reader,
            MAX_QUALITY_CODES_INDEX.into(),
            max_length,
            "quality codes str",
        )?;
        parts.quality_codes_os = load_indexed_octet_strings(
            reader,
            MAX_QUALITY_CODES_INDEX.into(),
            max_length,
            "quality codes os",
        )?;

        // the count is untrusted: grow with the records actually read
        let count = read_varsize(reader, "snp count")?;
        parts.snps = Vec::with_capacity(count.min(MAX_PREALLOCATED_RECORDS));
        for _ in 0..count {
            parts.snps.push(SnpInfo::read(reader)?);
        }

        let table = SnpTable::from_parts(parts)?;
        tracing::debug!(
            seq_id = %table.seq_id(),
            snps = table.len(),
            comments = table.comments().len(),
            alleles = table.alleles().len(),
            "read SNP table"
        );
        Ok(table)
    }

    /// Reads one SNP table from an in-memory buffer
    pub fn read_bytes(&self, mut bytes: &[u8]) -> Result<SnpTable> {
        self.read(&mut bytes)
    }

    /// Reads one SNP table from a file by memory mapping it
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<SnpTable> {
        let mmap = map_file(path)?;
        self.read_bytes(&mmap)
    }
}

/// Memory maps a regular file for reading
pub(crate) fn map_file<P: AsRef<Path>>(path: P) -> Result<Mmap> {
    let file = File::open(path)?;
    if !file.metadata()?.is_file() {
        return Err(ReadError::IncompatibleFile.into());
    }

    // Safety: the file is open and won't be modified while mapped
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// A builder for [`SnpTableReader`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderBuilder {
    reader: SnpTableReader,
}
impl ReaderBuilder {
    /// Native gi width of the host the table will be used on
    #[must_use]
    pub fn gi_width(mut self, gi_width: GiWidth) -> Self {
        self.reader.gi_width = gi_width;
        self
    }

    /// Maximum length of one string or octet-string entry
    #[must_use]
    pub fn max_entry_length(mut self, max_entry_length: usize) -> Self {
        self.reader.max_entry_length = max_entry_length;
        self
    }

    /// Maximum encoded length of one complex feature in an annotation blob
    #[must_use]
    pub fn max_feature_length(mut self, max_feature_length: usize) -> Self {
        self.reader.max_feature_length = max_feature_length;
        self
    }

    /// Maximum size a compressed annotation blob may expand to
    #[must_use]
    pub fn max_decompressed_length(mut self, max_decompressed_length: usize) -> Self {
        self.reader.max_decompressed_length = max_decompressed_length;
        self
    }

    #[must_use]
    pub fn build(self) -> SnpTableReader {
        self.reader
    }
}
