//! Fixed-layout SNP record
//!
//! Every simple SNP is stored as one constant-size record. Records are encoded
//! field by field, so the layout does not depend on in-memory struct padding.
//!
//! ```text
//! offset  size  field
//!      0     4  to_position          (u32, big-endian)
//!      4     4  feat_id              (u32, big-endian)
//!      8     1  position_delta
//!      9     1  flags
//!     10     1  weight
//!     11     1  quality_codes_index
//!     12     2  comment_index        (u16, big-endian)
//!     14     2  extra_index          (u16, big-endian)
//!     16     4  allele indices       (u8 each)
//! ```

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder};

use crate::codec::truncated;
use crate::parse::Strand;
use crate::Result;

/// Size of one encoded record in bytes
pub const SNP_RECORD_SIZE: usize = 20;

/// Comment index of a record without a comment
pub const NO_COMMENT_INDEX: u16 = 0xFFFF;
/// Largest addressable comment index
pub const MAX_COMMENT_INDEX: u16 = 0x7FFF;

/// Extra index of a record without extra data
pub const NO_EXTRA_INDEX: u16 = 0xFFFF;
/// Largest addressable extra index
pub const MAX_EXTRA_INDEX: u16 = 0x7FFF;

/// Allele slot that holds no allele
pub const NO_ALLELE_INDEX: u8 = 0xFF;
/// Largest addressable allele index
pub const MAX_ALLELE_INDEX: u8 = 0xFE;
/// Number of allele slots per record
pub const MAX_ALLELES_COUNT: usize = 4;

/// Largest addressable quality-codes index (in either table)
pub const MAX_QUALITY_CODES_INDEX: u8 = 0xFF;

/// Largest distance between the first and last base of a record
pub const MAX_POSITION_DELTA: u8 = 0xFF;

pub const FLAG_MINUS_STRAND: u8 = 1 << 0;
pub const FLAG_QUALITY_CODES_STR: u8 = 1 << 1;
pub const FLAG_QUALITY_CODES_OS: u8 = 1 << 2;
pub const FLAG_QUALITY_CODES_MASK: u8 = FLAG_QUALITY_CODES_STR | FLAG_QUALITY_CODES_OS;
pub const FLAG_HAS_WEIGHT: u8 = 1 << 3;
pub const FLAG_PLUS_STRAND: u8 = 1 << 4;

/// Which quality-codes table a record refers to, as selected by its 2-bit tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityCodesIndex {
    Absent,
    Str(usize),
    Os(usize),
    /// Both tag bits set
    Malformed(u8),
}

/// A compact simple SNP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnpInfo {
    /// Position of the last base
    pub to_position: u32,
    /// dbSNP id of the variation
    pub feat_id: u32,
    /// Distance from the first base to the last base
    pub position_delta: u8,
    pub flags: u8,
    /// Meaningful only with [`FLAG_HAS_WEIGHT`]
    pub weight: u8,
    /// Meaningful only with a quality-codes tag
    pub quality_codes_index: u8,
    pub comment_index: u16,
    pub extra_index: u16,
    pub allele_indices: [u8; MAX_ALLELES_COUNT],
}
impl Default for SnpInfo {
    fn default() -> Self {
        Self {
            to_position: 0,
            feat_id: 0,
            position_delta: 0,
            flags: 0,
            weight: 0,
            quality_codes_index: 0,
            comment_index: NO_COMMENT_INDEX,
            extra_index: NO_EXTRA_INDEX,
            allele_indices: [NO_ALLELE_INDEX; MAX_ALLELES_COUNT],
        }
    }
}
impl SnpInfo {
    /// Creates a record at `to_position` with no comment, extra, alleles or quality codes
    #[must_use]
    pub fn new(to_position: u32, feat_id: u32) -> Self {
        Self {
            to_position,
            feat_id,
            ..Self::default()
        }
    }

    /// Position of the first base
    #[must_use]
    pub fn from_position(&self) -> u32 {
        self.to_position.saturating_sub(u32::from(self.position_delta))
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        match (
            self.flags & FLAG_PLUS_STRAND != 0,
            self.flags & FLAG_MINUS_STRAND != 0,
        ) {
            (false, false) => Strand::Unknown,
            (true, false) => Strand::Plus,
            (false, true) => Strand::Minus,
            (true, true) => Strand::Both,
        }
    }

    #[must_use]
    pub fn weight(&self) -> Option<u8> {
        (self.flags & FLAG_HAS_WEIGHT != 0).then_some(self.weight)
    }

    #[must_use]
    pub fn comment_index(&self) -> Option<usize> {
        (self.comment_index != NO_COMMENT_INDEX).then_some(usize::from(self.comment_index))
    }

    #[must_use]
    pub fn extra_index(&self) -> Option<usize> {
        (self.extra_index != NO_EXTRA_INDEX).then_some(usize::from(self.extra_index))
    }

    /// Iterates over the occupied allele slots
    pub fn allele_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.allele_indices
            .iter()
            .filter(|&&index| index != NO_ALLELE_INDEX)
            .map(|&index| usize::from(index))
    }

    #[must_use]
    pub fn quality_codes_index(&self) -> QualityCodesIndex {
        let index = usize::from(self.quality_codes_index);
        match self.flags & FLAG_QUALITY_CODES_MASK {
            0 => QualityCodesIndex::Absent,
            FLAG_QUALITY_CODES_STR => QualityCodesIndex::Str(index),
            FLAG_QUALITY_CODES_OS => QualityCodesIndex::Os(index),
            tag => QualityCodesIndex::Malformed(tag),
        }
    }

    /// Encodes the record into exactly [`SNP_RECORD_SIZE`] bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SNP_RECORD_SIZE] {
        let mut buf = [0; SNP_RECORD_SIZE];
        BigEndian::write_u32(&mut buf[0..4], self.to_position);
        BigEndian::write_u32(&mut buf[4..8], self.feat_id);
        buf[8] = self.position_delta;
        buf[9] = self.flags;
        buf[10] = self.weight;
        buf[11] = self.quality_codes_index;
        BigEndian::write_u16(&mut buf[12..14], self.comment_index);
        BigEndian::write_u16(&mut buf[14..16], self.extra_index);
        buf[16..20].copy_from_slice(&self.allele_indices);
        buf
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8; SNP_RECORD_SIZE]) -> Self {
        let mut allele_indices = [NO_ALLELE_INDEX; MAX_ALLELES_COUNT];
        allele_indices.copy_from_slice(&buf[16..20]);
        Self {
            to_position: BigEndian::read_u32(&buf[0..4]),
            feat_id: BigEndian::read_u32(&buf[4..8]),
            position_delta: buf[8],
            flags: buf[9],
            weight: buf[10],
            quality_codes_index: buf[11],
            comment_index: BigEndian::read_u16(&buf[12..14]),
            extra_index: BigEndian::read_u16(&buf[14..16]),
            allele_indices,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0; SNP_RECORD_SIZE];
        reader.read_exact(&mut buf).map_err(truncated("snp record"))?;
        Ok(Self::from_bytes(&buf))
    }

    /// Sort key used for position lookups
    pub(crate) fn position_key(&self) -> (u32, u8) {
        (self.to_position, self.position_delta)
    }
}
