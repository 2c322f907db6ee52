//! SNP table writer
//!
//! Serializes one [`SnpTable`] in a fixed field order:
//!
//! 1. magic number
//! 2. gi, or gi 0 followed by the textual sequence identifier
//! 3. comments, alleles, extra and string quality-codes tables
//! 4. octet quality-codes table
//! 5. `varsize(count)` followed by the fixed-size SNP records
//!
//! Every entry is limited to [`DEFAULT_MAX_ENTRY_LENGTH`] bytes, so anything written
//! here can be read back by a default reader.
//!
//! Complex features are not part of this stream, see [`crate::snp::write_annot`].

use std::io::Write;

use super::SNP_MAGIC;
use super::reader::DEFAULT_MAX_ENTRY_LENGTH;
use super::record::{MAX_ALLELE_INDEX, MAX_COMMENT_INDEX, MAX_EXTRA_INDEX, MAX_QUALITY_CODES_INDEX};
use crate::{
    Result, SeqId, SnpTable,
    codec::{
        store_indexed_octet_strings, store_indexed_strings, write_fixed_u32, write_gi,
        write_seq_id, write_varsize,
    },
    error::WriteError,
};

/// Writes the sequence identifier as a gi, or as gi 0 followed by its text form
pub(crate) fn write_table_seq_id<W: Write>(writer: &mut W, seq_id: &SeqId) -> Result<()> {
    match seq_id {
        SeqId::Gi(0) => Err(WriteError::ZeroGi.into()),
        SeqId::Gi(gi) => write_gi(writer, *gi),
        SeqId::Text(text) => {
            if text.len() > DEFAULT_MAX_ENTRY_LENGTH {
                return Err(WriteError::EntryTooLong {
                    field: "seq-id",
                    length: text.len(),
                    max_length: DEFAULT_MAX_ENTRY_LENGTH,
                }
                .into());
            }
            write_gi(writer, 0)?;
            write_seq_id(writer, text)
        }
    }
}

/// Writes the compact part of `table` to `writer`
pub fn write_snp_table<W: Write>(writer: &mut W, table: &SnpTable) -> Result<()> {
    write_fixed_u32(writer, u64::from(SNP_MAGIC), "magic")?;
    write_table_seq_id(writer, table.seq_id())?;

    let max_length = DEFAULT_MAX_ENTRY_LENGTH;
    store_indexed_strings(
        writer,
        table.comments(),
        MAX_COMMENT_INDEX.into(),
        max_length,
        "comments",
    )?;
    store_indexed_strings(
        writer,
        table.alleles(),
        MAX_ALLELE_INDEX.into(),
        max_length,
        "alleles",
    )?;
    store_indexed_strings(writer, table.extra(), MAX_EXTRA_INDEX.into(), max_length, "extra")?;
    store_indexed_strings(
        writer,
        table.quality_codes_str(),
        MAX_QUALITY_CODES_INDEX.into(),
        max_length,
        "quality codes str",
    )?;
    store_indexed_octet_strings(
        writer,
        table.quality_codes_os(),
        MAX_QUALITY_CODES_INDEX.into(),
        max_length,
        "quality codes os",
    )?;

    write_varsize(writer, table.snps().len(), "snp count")?;
    for snp in table.snps() {
        snp.write(writer)?;
    }

    tracing::debug!(
        seq_id = %table.seq_id(),
        snps = table.snps().len(),
        "wrote SNP table"
    );
    Ok(())
}

impl SnpTable {
    /// Serializes the compact part of the table into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_snp_table(&mut buf, self)?;
        Ok(buf)
    }
}
