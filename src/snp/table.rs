use std::ops::Range;

use super::record::{
    MAX_ALLELE_INDEX, MAX_COMMENT_INDEX, MAX_EXTRA_INDEX, MAX_POSITION_DELTA,
    MAX_QUALITY_CODES_INDEX, QualityCodesIndex, SnpInfo,
};
use crate::{
    BuilderError, IndexedOctetStrings, IndexedStrings, Result, SeqId,
    error::{IndexError, TableError},
    parse::{DbXref, Location, QUAL_REPLACE, QUAL_WEIGHT, QualityCodes, Qualifier, VariationFeature},
};

/// Quality codes resolved from one of the two quality-codes tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityCodesValue<'a> {
    Text(&'a str),
    Octets(&'a [u8]),
}
impl QualityCodesValue<'_> {
    #[must_use]
    pub fn to_owned_codes(self) -> QualityCodes {
        match self {
            Self::Text(text) => QualityCodes::Text(text.to_string()),
            Self::Octets(octets) => QualityCodes::Octets(octets.to_vec()),
        }
    }
}

/// The raw components of a [`SnpTable`]
#[derive(Debug, Clone)]
pub struct SnpTableParts {
    pub seq_id: SeqId,
    pub comments: IndexedStrings,
    pub alleles: IndexedStrings,
    pub extra: IndexedStrings,
    pub quality_codes_str: IndexedStrings,
    pub quality_codes_os: IndexedOctetStrings,
    pub snps: Vec<SnpInfo>,
    pub complex: Vec<VariationFeature>,
}
impl SnpTableParts {
    /// Empty parts for `seq_id`
    #[must_use]
    pub fn new(seq_id: SeqId) -> Self {
        Self {
            seq_id,
            comments: IndexedStrings::new(),
            alleles: IndexedStrings::new(),
            extra: IndexedStrings::new(),
            quality_codes_str: IndexedStrings::new(),
            quality_codes_os: IndexedOctetStrings::new(),
            snps: Vec::new(),
            complex: Vec::new(),
        }
    }
}

/// A compacted table of simple SNPs on one sequence
///
/// The table is read-only once constructed. Simple SNPs are stored as fixed-size
/// [`SnpInfo`] records whose strings live in shared indexed tables; features that
/// could not be compacted are kept verbatim as complex features.
///
/// Records are kept sorted by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnpTable {
    seq_id: SeqId,
    comments: IndexedStrings,
    alleles: IndexedStrings,
    extra: IndexedStrings,
    quality_codes_str: IndexedStrings,
    quality_codes_os: IndexedOctetStrings,
    snps: Vec<SnpInfo>,
    complex: Vec<VariationFeature>,
}
impl SnpTable {
    /// Builds a table from raw parts
    ///
    /// Fails unless every table fits its index field and every record index
    /// resolves within its table.
    pub fn from_parts(parts: SnpTableParts) -> Result<Self> {
        check_count(&parts.comments, MAX_COMMENT_INDEX.into(), "comments")?;
        check_count(&parts.alleles, MAX_ALLELE_INDEX.into(), "alleles")?;
        check_count(&parts.extra, MAX_EXTRA_INDEX.into(), "extra")?;
        check_count(
            &parts.quality_codes_str,
            MAX_QUALITY_CODES_INDEX.into(),
            "quality codes str",
        )?;
        if parts.quality_codes_os.len() > usize::from(MAX_QUALITY_CODES_INDEX) + 1 {
            return Err(TableError::CountTooLarge {
                field: "quality codes os",
                count: parts.quality_codes_os.len(),
                max_count: usize::from(MAX_QUALITY_CODES_INDEX) + 1,
            }
            .into());
        }

        let mut table = Self {
            seq_id: parts.seq_id,
            comments: parts.comments,
            alleles: parts.alleles,
            extra: parts.extra,
            quality_codes_str: parts.quality_codes_str,
            quality_codes_os: parts.quality_codes_os,
            snps: parts.snps,
            complex: parts.complex,
        };
        table.validate_indices()?;
        if !table.snps.is_sorted_by_key(SnpInfo::position_key) {
            table.snps.sort_by_key(SnpInfo::position_key);
        }
        Ok(table)
    }

    #[must_use]
    pub fn into_parts(self) -> SnpTableParts {
        SnpTableParts {
            seq_id: self.seq_id,
            comments: self.comments,
            alleles: self.alleles,
            extra: self.extra,
            quality_codes_str: self.quality_codes_str,
            quality_codes_os: self.quality_codes_os,
            snps: self.snps,
            complex: self.complex,
        }
    }

    /// Checks every record index against the size of its table
    fn validate_indices(&self) -> Result<()> {
        for (record, snp) in self.snps.iter().enumerate() {
            if let Some(index) = snp.comment_index() {
                check_index(record, "comment", index, self.comments.len())?;
            }
            if let Some(index) = snp.extra_index() {
                check_index(record, "extra", index, self.extra.len())?;
            }
            match snp.quality_codes_index() {
                QualityCodesIndex::Absent => {}
                QualityCodesIndex::Str(index) => check_index(
                    record,
                    "quality codes str",
                    index,
                    self.quality_codes_str.len(),
                )?,
                QualityCodesIndex::Os(index) => check_index(
                    record,
                    "quality codes os",
                    index,
                    self.quality_codes_os.len(),
                )?,
                QualityCodesIndex::Malformed(tag) => {
                    return Err(IndexError::InvalidQualityCodesTag { record, tag }.into());
                }
            }
            for index in snp.allele_indices() {
                check_index(record, "allele", index, self.alleles.len())?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn seq_id(&self) -> &SeqId {
        &self.seq_id
    }

    #[must_use]
    pub fn comments(&self) -> &IndexedStrings {
        &self.comments
    }

    #[must_use]
    pub fn alleles(&self) -> &IndexedStrings {
        &self.alleles
    }

    #[must_use]
    pub fn extra(&self) -> &IndexedStrings {
        &self.extra
    }

    #[must_use]
    pub fn quality_codes_str(&self) -> &IndexedStrings {
        &self.quality_codes_str
    }

    #[must_use]
    pub fn quality_codes_os(&self) -> &IndexedOctetStrings {
        &self.quality_codes_os
    }

    /// All simple SNPs, sorted by position
    #[must_use]
    pub fn snps(&self) -> &[SnpInfo] {
        &self.snps
    }

    /// Features kept in their verbose form
    #[must_use]
    pub fn complex_features(&self) -> &[VariationFeature] {
        &self.complex
    }

    /// Number of simple SNPs
    #[must_use]
    pub fn len(&self) -> usize {
        self.snps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snps.is_empty()
    }

    #[must_use]
    pub fn comment(&self, snp: &SnpInfo) -> Option<&str> {
        snp.comment_index().and_then(|i| self.comments.get(i))
    }

    #[must_use]
    pub fn extra_of(&self, snp: &SnpInfo) -> Option<&str> {
        snp.extra_index().and_then(|i| self.extra.get(i))
    }

    pub fn alleles_of<'a>(&'a self, snp: &'a SnpInfo) -> impl Iterator<Item = &'a str> + 'a {
        snp.allele_indices().filter_map(|i| self.alleles.get(i))
    }

    #[must_use]
    pub fn quality_codes(&self, snp: &SnpInfo) -> Option<QualityCodesValue<'_>> {
        match snp.quality_codes_index() {
            QualityCodesIndex::Str(i) => self.quality_codes_str.get(i).map(QualityCodesValue::Text),
            QualityCodesIndex::Os(i) => self.quality_codes_os.get(i).map(QualityCodesValue::Octets),
            QualityCodesIndex::Absent | QualityCodesIndex::Malformed(_) => None,
        }
    }

    /// Iterates over the SNPs overlapping the half-open position range
    pub fn snps_in_range(&self, range: Range<u32>) -> impl Iterator<Item = &SnpInfo> + '_ {
        let first = self.snps.partition_point(|snp| snp.to_position < range.start);
        let last_to = u64::from(range.end) + u64::from(MAX_POSITION_DELTA);
        self.snps[first..]
            .iter()
            .take_while(move |snp| u64::from(snp.to_position) < last_to)
            .filter(move |snp| snp.from_position() < range.end)
    }

    /// Re-expands a simple SNP into its verbose feature form
    pub fn to_feature(&self, index: usize) -> Result<VariationFeature> {
        let snp = self.snps.get(index).ok_or(BuilderError::FeatureOutOfRange {
            index,
            count: self.snps.len(),
        })?;

        let location = if snp.position_delta == 0 {
            Location::Point {
                id: self.seq_id.clone(),
                point: snp.to_position,
                strand: snp.strand(),
            }
        } else {
            Location::Interval {
                id: self.seq_id.clone(),
                from: snp.from_position(),
                to: snp.to_position,
                strand: snp.strand(),
            }
        };

        let mut feature = VariationFeature::new(location);
        feature.comment = self.comment(snp).map(str::to_string);
        feature.extra = self.extra_of(snp).map(str::to_string);
        feature.qualifiers = self
            .alleles_of(snp)
            .map(|allele| Qualifier::new(QUAL_REPLACE, allele))
            .collect();
        if let Some(weight) = snp.weight() {
            feature
                .qualifiers
                .push(Qualifier::new(QUAL_WEIGHT, weight.to_string()));
        }
        feature.dbxrefs.push(DbXref::db_snp(i64::from(snp.feat_id)));
        feature.quality_codes = self.quality_codes(snp).map(QualityCodesValue::to_owned_codes);
        Ok(feature)
    }
}

fn check_count(table: &IndexedStrings, max_index: usize, field: &'static str) -> Result<()> {
    if table.len() > max_index + 1 {
        return Err(TableError::CountTooLarge {
            field,
            count: table.len(),
            max_count: max_index + 1,
        }
        .into());
    }
    Ok(())
}

fn check_index(record: usize, field: &'static str, index: usize, size: usize) -> Result<()> {
    if index >= size {
        return Err(IndexError::OutOfRange {
            record,
            field,
            index,
            size,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snp::record::{
        FLAG_HAS_WEIGHT, FLAG_MINUS_STRAND, FLAG_QUALITY_CODES_MASK, FLAG_QUALITY_CODES_OS,
        FLAG_QUALITY_CODES_STR, NO_ALLELE_INDEX,
    };
    use crate::{Error, parse::Strand};

    fn parts() -> SnpTableParts {
        let mut parts = SnpTableParts::new(SeqId::Gi(12345));
        parts.comments = ["het", "rare"].into_iter().collect();
        parts.alleles = ["A", "G"].into_iter().collect();
        parts
    }

    fn snp_with_comment(comment_index: u16) -> SnpInfo {
        let mut snp = SnpInfo::new(100, 1);
        snp.comment_index = comment_index;
        snp.allele_indices[0] = 0;
        snp.allele_indices[1] = 1;
        snp
    }

    #[test]
    fn test_lookup() -> Result<()> {
        let mut parts = parts();
        parts.snps.push(snp_with_comment(1));
        let table = SnpTable::from_parts(parts)?;
        let snp = &table.snps()[0];
        assert_eq!(table.comment(snp), Some("rare"));
        assert_eq!(table.alleles_of(snp).collect::<Vec<_>>(), ["A", "G"]);
        assert_eq!(table.extra_of(snp), None);
        assert_eq!(table.quality_codes(snp), None);
        Ok(())
    }

    #[test]
    fn test_comment_index_bounds() {
        let mut parts = parts();
        parts.snps.push(snp_with_comment(1));
        assert!(SnpTable::from_parts(parts).is_ok());

        let mut parts = self::parts();
        parts.snps.push(snp_with_comment(2));
        assert!(matches!(
            SnpTable::from_parts(parts),
            Err(Error::IndexError(IndexError::OutOfRange {
                field: "comment",
                index: 2,
                size: 2,
                ..
            }))
        ));
    }

    #[test]
    fn test_allele_index_bounds() {
        let mut parts = parts();
        let mut snp = SnpInfo::new(5, 1);
        snp.allele_indices = [0, NO_ALLELE_INDEX, 2, NO_ALLELE_INDEX];
        parts.snps.push(snp);
        assert!(matches!(
            SnpTable::from_parts(parts),
            Err(Error::IndexError(IndexError::OutOfRange {
                field: "allele",
                index: 2,
                ..
            }))
        ));
    }

    #[test]
    fn test_quality_codes_validation() -> Result<()> {
        let mut parts = parts();
        parts.quality_codes_str = ["q1"].into_iter().collect();
        parts.quality_codes_os = IndexedOctetStrings::from_bytes(2, vec![1, 2, 3, 4])?;

        let mut str_snp = SnpInfo::new(10, 1);
        str_snp.flags = FLAG_QUALITY_CODES_STR;
        let mut os_snp = SnpInfo::new(20, 2);
        os_snp.flags = FLAG_QUALITY_CODES_OS;
        os_snp.quality_codes_index = 1;
        parts.snps = vec![str_snp, os_snp];
        let table = SnpTable::from_parts(parts.clone())?;
        assert_eq!(
            table.quality_codes(&table.snps()[0]),
            Some(QualityCodesValue::Text("q1"))
        );
        assert_eq!(
            table.quality_codes(&table.snps()[1]),
            Some(QualityCodesValue::Octets(&[3, 4]))
        );

        // octet index 1 is out of range of the string table
        parts.snps[1].flags = FLAG_QUALITY_CODES_STR;
        assert!(matches!(
            SnpTable::from_parts(parts.clone()),
            Err(Error::IndexError(IndexError::OutOfRange {
                record: 1,
                field: "quality codes str",
                ..
            }))
        ));

        parts.snps[1].flags = FLAG_QUALITY_CODES_MASK;
        assert!(matches!(
            SnpTable::from_parts(parts),
            Err(Error::IndexError(IndexError::InvalidQualityCodesTag { record: 1, .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_sorted_by_position() -> Result<()> {
        let mut parts = parts();
        parts.snps = vec![SnpInfo::new(30, 3), SnpInfo::new(10, 1), SnpInfo::new(20, 2)];
        let table = SnpTable::from_parts(parts)?;
        let ids: Vec<_> = table.snps().iter().map(|snp| snp.feat_id).collect();
        assert_eq!(ids, [1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_snps_in_range() -> Result<()> {
        let mut parts = parts();
        let mut long = SnpInfo::new(60, 4);
        long.position_delta = 20;
        parts.snps = vec![
            SnpInfo::new(10, 1),
            SnpInfo::new(20, 2),
            SnpInfo::new(30, 3),
            long,
        ];
        let table = SnpTable::from_parts(parts)?;
        let ids = |range| {
            table
                .snps_in_range(range)
                .map(|snp| snp.feat_id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(0..10), Vec::<u32>::new());
        assert_eq!(ids(10..21), [1, 2]);
        assert_eq!(ids(35..45), [4]);
        assert_eq!(ids(61..100), Vec::<u32>::new());
        Ok(())
    }

    #[test]
    fn test_to_feature() -> Result<()> {
        let mut parts = parts();
        let mut snp = snp_with_comment(0);
        snp.position_delta = 1;
        snp.flags = FLAG_MINUS_STRAND | FLAG_HAS_WEIGHT;
        snp.weight = 2;
        parts.snps.push(snp);
        let table = SnpTable::from_parts(parts)?;

        let feature = table.to_feature(0)?;
        assert_eq!(
            feature.location,
            Location::Interval {
                id: SeqId::Gi(12345),
                from: 99,
                to: 100,
                strand: Strand::Minus,
            }
        );
        assert_eq!(feature.comment.as_deref(), Some("het"));
        assert_eq!(
            feature.qualifier_values(QUAL_REPLACE).collect::<Vec<_>>(),
            ["A", "G"]
        );
        assert_eq!(feature.qualifier_values(QUAL_WEIGHT).collect::<Vec<_>>(), ["2"]);
        assert_eq!(feature.dbxrefs, [DbXref::db_snp(1)]);

        assert!(matches!(
            table.to_feature(1),
            Err(Error::BuilderError(BuilderError::FeatureOutOfRange { index: 1, count: 1 }))
        ));
        Ok(())
    }

    #[test]
    fn test_too_many_alleles() {
        let mut parts = parts();
        parts.alleles = (0..=usize::from(MAX_ALLELE_INDEX) + 1)
            .map(|i| i.to_string())
            .collect();
        assert!(matches!(
            SnpTable::from_parts(parts),
            Err(Error::TableError(TableError::CountTooLarge { field: "alleles", .. }))
        ));
    }
}
