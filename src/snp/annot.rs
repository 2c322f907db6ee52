//! Annotation blobs
//!
//! An annotation blob carries a whole annotation: the compact SNP table followed
//! by the complex features that could not be compacted, each in its verbose encoding.
//!
//! ```text
//! [SNP table stream][varsize count][varsize len][feature json]...
//! ```

use std::io::{Read, Write};
use std::path::Path;

use super::reader::{DEFAULT_MAX_FEATURE_LENGTH, map_file};
use crate::{
    Result, SnpTable, SnpTableReader,
    codec::{read_length_prefixed_bytes, read_varsize, write_length_prefixed_bytes, write_varsize},
    error::WriteError,
    parse::VariationFeature,
    write_snp_table,
};

/// Writes the compact table followed by its complex features
///
/// Each encoded feature is limited to [`DEFAULT_MAX_FEATURE_LENGTH`] bytes.
pub fn write_annot<W: Write>(writer: &mut W, table: &SnpTable) -> Result<()> {
    write_snp_table(writer, table)?;
    write_varsize(writer, table.complex_features().len(), "complex count")?;
    let mut buf = Vec::new();
    for feature in table.complex_features() {
        buf.clear();
        serde_json::to_writer(&mut buf, feature)?;
        if buf.len() > DEFAULT_MAX_FEATURE_LENGTH {
            return Err(WriteError::EntryTooLong {
                field: "complex feature",
                length: buf.len(),
                max_length: DEFAULT_MAX_FEATURE_LENGTH,
            }
            .into());
        }
        write_length_prefixed_bytes(writer, &buf, "complex feature")?;
    }
    Ok(())
}

impl SnpTable {
    /// Serializes the table and its complex features into a new buffer
    pub fn to_annot_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_annot(&mut buf, self)?;
        Ok(buf)
    }
}

impl SnpTableReader {
    /// Reads a blob written by [`write_annot`]
    pub fn read_annot<R: Read>(&self, reader: &mut R) -> Result<SnpTable> {
        let table = self.read(reader)?;

        let count = read_varsize(reader, "complex count")?;
        let mut complex = Vec::new();
        for _ in 0..count {
            let encoded =
                read_length_prefixed_bytes(reader, self.max_feature_length, "complex feature")?;
            complex.push(serde_json::from_slice::<VariationFeature>(&encoded)?);
        }
        tracing::debug!(complex = complex.len(), "read complex features");

        let mut parts = table.into_parts();
        parts.complex = complex;
        SnpTable::from_parts(parts)
    }

    /// Reads an annotation blob from an in-memory buffer
    pub fn read_annot_bytes(&self, mut bytes: &[u8]) -> Result<SnpTable> {
        self.read_annot(&mut bytes)
    }

    /// Reads an annotation blob from a file by memory mapping it
    pub fn read_annot_path<P: AsRef<Path>>(&self, path: P) -> Result<SnpTable> {
        let mmap = map_file(path)?;
        self.read_annot_bytes(&mmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CodecError, Error, ReaderBuilder, SeqId, SnpInfo, SnpTableParts,
        parse::{Location, Strand},
    };

    fn annot_table() -> Result<SnpTable> {
        let mut parts = SnpTableParts::new(SeqId::Gi(9));
        parts.snps.push(SnpInfo::new(4, 1));
        parts.complex.push(VariationFeature::new(Location::Mix(vec![
            Location::Point {
                id: SeqId::Gi(9),
                point: 1,
                strand: Strand::Plus,
            },
            Location::Point {
                id: SeqId::Gi(9),
                point: 7,
                strand: Strand::Plus,
            },
        ])));
        let mut long = VariationFeature::new(Location::Interval {
            id: SeqId::Gi(9),
            from: 10,
            to: 5000,
            strand: Strand::Unknown,
        });
        long.comment = Some("deletion".to_string());
        parts.complex.push(long);
        SnpTable::from_parts(parts)
    }

    #[test]
    fn test_annot_round_trip() -> Result<()> {
        let table = annot_table()?;
        let read = SnpTableReader::new().read_annot_bytes(&table.to_annot_bytes()?)?;
        assert_eq!(read, table);
        assert_eq!(read.complex_features().len(), 2);
        Ok(())
    }

    #[test]
    fn test_compact_stream_drops_complex() -> Result<()> {
        let table = annot_table()?;
        let read = SnpTableReader::new().read_bytes(&table.to_bytes()?)?;
        assert!(read.complex_features().is_empty());
        assert_eq!(read.snps(), table.snps());
        Ok(())
    }

    #[test]
    fn test_annot_feature_too_long() -> Result<()> {
        let bytes = annot_table()?.to_annot_bytes()?;
        let reader = ReaderBuilder::default().max_feature_length(16).build();
        assert!(matches!(
            reader.read_annot_bytes(&bytes),
            Err(Error::CodecError(CodecError::LengthTooLarge {
                field: "complex feature",
                ..
            }))
        ));
        Ok(())
    }

    #[test]
    fn test_annot_writer_feature_length_limit() -> Result<()> {
        let mut parts = SnpTableParts::new(SeqId::Gi(9));
        let mut feature = VariationFeature::new(Location::Point {
            id: SeqId::Gi(9),
            point: 1,
            strand: Strand::Plus,
        });
        feature.comment = Some("x".repeat(DEFAULT_MAX_FEATURE_LENGTH));
        parts.complex.push(feature);
        let table = SnpTable::from_parts(parts)?;

        let mut buf = Vec::new();
        assert!(matches!(
            write_annot(&mut buf, &table),
            Err(Error::WriteError(WriteError::EntryTooLong {
                field: "complex feature",
                max_length: DEFAULT_MAX_FEATURE_LENGTH,
                ..
            }))
        ));
        Ok(())
    }

    #[test]
    fn test_annot_missing_complex_section() -> Result<()> {
        let bytes = annot_table()?.to_bytes()?;
        let err = SnpTableReader::new().read_annot_bytes(&bytes).unwrap_err();
        assert!(err.is_truncated());
        Ok(())
    }

    #[test]
    fn test_annot_corrupt_feature() -> Result<()> {
        let table = SnpTable::from_parts(SnpTableParts::new(SeqId::Gi(9)))?;
        let mut bytes = table.to_bytes()?;
        write_varsize(&mut bytes, 1, "complex count")?;
        write_length_prefixed_bytes(&mut bytes, b"{not json", "complex feature")?;
        assert!(matches!(
            SnpTableReader::new().read_annot_bytes(&bytes),
            Err(Error::FeatureEncodingError(_))
        ));
        Ok(())
    }
}
