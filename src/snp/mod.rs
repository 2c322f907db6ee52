//! # SNP table format
//!
//! A SNP table is a memory-compact representation of the simple variations on one
//! sequence. Strings shared between records are de-duplicated into indexed tables
//! and every variation is stored as one fixed-size record addressing them.
//!
//! ## Stream layout
//!
//! All multi-byte integers are big-endian.
//!
//! ```text
//! ┌──────────────────────────┐
//! │ magic                    │ 4 bytes
//! ├──────────────────────────┤
//! │ gi                       │ 8 bytes (0 = textual seq-id follows)
//! │ seq-id text              │ varsize len + bytes, only if gi == 0
//! ├──────────────────────────┤
//! │ comments                 │ varsize count + count x (varsize len + bytes)
//! │ alleles                  │
//! │ extra                    │
//! │ quality codes (strings)  │
//! ├──────────────────────────┤
//! │ quality codes (octets)   │ 4 byte element size [+ varsize total + bytes]
//! ├──────────────────────────┤
//! │ records                  │ varsize count + count x 20 bytes
//! └──────────────────────────┘
//! ```
//!
//! Compatibility is controlled only by the magic number. Any change to this layout
//! requires a new magic number, and streams with any other magic are rejected.

mod annot;
mod reader;
mod record;
mod seq_id;
mod table;
mod writer;

pub use annot::write_annot;
pub(crate) use reader::map_file;
pub use reader::{
    DEFAULT_MAX_DECOMPRESSED_LENGTH, DEFAULT_MAX_ENTRY_LENGTH, DEFAULT_MAX_FEATURE_LENGTH,
    ReaderBuilder, SnpTableReader,
};
pub use record::{
    FLAG_HAS_WEIGHT, FLAG_MINUS_STRAND, FLAG_PLUS_STRAND, FLAG_QUALITY_CODES_MASK,
    FLAG_QUALITY_CODES_OS, FLAG_QUALITY_CODES_STR, MAX_ALLELE_INDEX, MAX_ALLELES_COUNT,
    MAX_COMMENT_INDEX, MAX_EXTRA_INDEX, MAX_POSITION_DELTA, MAX_QUALITY_CODES_INDEX,
    NO_ALLELE_INDEX, NO_COMMENT_INDEX, NO_EXTRA_INDEX, QualityCodesIndex, SNP_RECORD_SIZE,
    SnpInfo,
};
pub use seq_id::SeqId;
pub use table::{QualityCodesValue, SnpTable, SnpTableParts};
pub use writer::write_snp_table;

/// The magic number opening every SNP table stream
pub const SNP_MAGIC: u32 = 0x1234_0008;
