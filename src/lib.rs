//! # binsnp
//!
//! A compact binary codec for per-sequence SNP annotation tables.
//!
//! Simple variations are stored as fixed-size records whose strings live in
//! shared, de-duplicated dictionaries. Variations that do not fit that layout are
//! kept in their verbose form as complex features.
//!
//! - [`codec`]: primitive scalar and indexed table codecs
//! - [`snp`]: the table, its record layout, and the stream reader and writer
//! - [`parse`]: conversion of verbose features into tables
//! - [`compress`]: zstd-compressed annotation blobs
//!
//! ```
//! use binsnp::{Result, SeqId, SnpInfo, SnpTable, SnpTableParts, SnpTableReader};
//!
//! fn main() -> Result<()> {
//!     let mut parts = SnpTableParts::new(SeqId::Gi(12345));
//!     parts.comments = ["het"].into_iter().collect();
//!     let mut snp = SnpInfo::new(100, 6025);
//!     snp.comment_index = 0;
//!     parts.snps.push(snp);
//!
//!     let table = SnpTable::from_parts(parts)?;
//!     let read = SnpTableReader::new().read_bytes(&table.to_bytes()?)?;
//!     assert_eq!(read.comment(&read.snps()[0]), Some("het"));
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod compress;
pub mod error;
pub mod parse;
pub mod snp;

pub use codec::{GiWidth, IndexedOctetStrings, IndexedStrings};
pub use compress::write_compressed_annot;
pub use error::{
    BuilderError, CodecError, Error, IndexError, IntoBinsnpError, ReadError, Result, TableError,
    WriteError,
};
pub use parse::{
    ClassificationStats, DefaultClassifier, FeatureClassifier, SnpTableBuilder, SnpType,
    VariationFeature, parse_features,
};
pub use snp::{
    ReaderBuilder, SNP_MAGIC, SeqId, SnpInfo, SnpTable, SnpTableParts, SnpTableReader,
    write_annot, write_snp_table,
};
