//! Two-pass table construction
//!
//! Verbose features are decoded completely first, then each one is classified
//! and either compacted into a [`SnpInfo`] record or kept as a complex feature.
//! A feature is only compacted once every table it needs has room for its values,
//! so a rejected feature never leaves entries behind.

use std::io::Read;

use super::classify::{Classification, DefaultClassifier, FeatureClassifier, SimpleSnp, SnpType};
use super::feature::{QualityCodes, Strand, VariationFeature, decode_features};
use super::stats::ClassificationStats;
use crate::snp::{
    DEFAULT_MAX_ENTRY_LENGTH, FLAG_HAS_WEIGHT, FLAG_MINUS_STRAND, FLAG_PLUS_STRAND,
    FLAG_QUALITY_CODES_OS, FLAG_QUALITY_CODES_STR, MAX_ALLELE_INDEX, MAX_ALLELES_COUNT,
    MAX_COMMENT_INDEX, MAX_EXTRA_INDEX, MAX_QUALITY_CODES_INDEX,
};
use crate::{
    BuilderError, IndexedOctetStrings, IndexedStrings, Result, SeqId, SnpInfo, SnpTable,
    SnpTableParts,
};

/// Accumulates features into a [`SnpTable`]
#[derive(Debug, Clone)]
pub struct SnpTableBuilder<C = DefaultClassifier> {
    classifier: C,
    seq_id: Option<SeqId>,
    comments: IndexedStrings,
    alleles: IndexedStrings,
    extra: IndexedStrings,
    quality_codes_str: IndexedStrings,
    quality_codes_os: IndexedOctetStrings,
    snps: Vec<SnpInfo>,
    complex: Vec<VariationFeature>,
}
impl SnpTableBuilder {
    /// A builder using the [`DefaultClassifier`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_classifier(DefaultClassifier::default())
    }
}
impl Default for SnpTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl<C: FeatureClassifier> SnpTableBuilder<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            seq_id: None,
            comments: IndexedStrings::new(),
            alleles: IndexedStrings::new(),
            extra: IndexedStrings::new(),
            quality_codes_str: IndexedStrings::new(),
            quality_codes_os: IndexedOctetStrings::new(),
            snps: Vec::new(),
            complex: Vec::new(),
        }
    }

    /// Fixes the sequence identifier of the table
    ///
    /// Simple features on any other sequence are kept as complex features.
    /// Without this, the first compacted feature decides the identifier.
    #[must_use]
    pub fn seq_id(mut self, seq_id: SeqId) -> Self {
        self.seq_id = Some(seq_id);
        self
    }

    /// Number of compacted records so far
    #[must_use]
    pub fn simple_count(&self) -> usize {
        self.snps.len()
    }

    /// Number of features kept verbatim so far
    #[must_use]
    pub fn complex_count(&self) -> usize {
        self.complex.len()
    }

    /// Classifies one feature and stores it in compact or verbose form
    ///
    /// Returns the bucket the feature fell into.
    pub fn push(&mut self, feature: VariationFeature) -> SnpType {
        let snp_type = match self.classifier.classify(&feature) {
            Classification::Simple(snp) => match self.compact(&snp) {
                Ok(info) => {
                    self.snps.push(info);
                    return SnpType::Simple;
                }
                Err(snp_type) => snp_type,
            },
            Classification::Complex(snp_type) => snp_type,
        };
        self.complex.push(feature);
        snp_type
    }

    /// Pushes every feature, tallying buckets into `stats` when given
    pub fn extend<I>(&mut self, features: I, mut stats: Option<&mut ClassificationStats>)
    where
        I: IntoIterator<Item = VariationFeature>,
    {
        for feature in features {
            let snp_type = self.push(feature);
            if let Some(stats) = stats.as_deref_mut() {
                stats.record(snp_type);
            }
        }
    }

    /// Rejects values no record can represent, whatever classifier produced them
    fn check_representable(snp: &SimpleSnp) -> std::result::Result<(), SnpType> {
        if !snp.seq_id.is_valid() {
            return Err(SnpType::LocationSeqIdMismatch);
        }
        if snp.strand == Strand::Both {
            return Err(SnpType::BadStrand);
        }
        if snp.alleles.len() > MAX_ALLELES_COUNT {
            return Err(SnpType::AlleleCountTooLarge);
        }
        if snp
            .alleles
            .iter()
            .any(|allele| allele.len() > DEFAULT_MAX_ENTRY_LENGTH)
        {
            return Err(SnpType::AlleleTooLong);
        }
        if snp
            .comment
            .as_ref()
            .is_some_and(|comment| comment.len() > DEFAULT_MAX_ENTRY_LENGTH)
        {
            return Err(SnpType::CommentTooLong);
        }
        if snp
            .extra
            .as_ref()
            .is_some_and(|extra| extra.len() > DEFAULT_MAX_ENTRY_LENGTH)
        {
            return Err(SnpType::ExtraTooLong);
        }
        let quality_codes_length = match &snp.quality_codes {
            None => 0,
            Some(QualityCodes::Text(text)) => text.len(),
            Some(QualityCodes::Octets(octets)) => octets.len(),
        };
        if quality_codes_length > DEFAULT_MAX_ENTRY_LENGTH {
            return Err(SnpType::QualityCodesSizeMismatch);
        }
        Ok(())
    }

    /// Checks that every value of `snp` has room in the tables, then indexes them
    fn compact(&mut self, snp: &SimpleSnp) -> std::result::Result<SnpInfo, SnpType> {
        Self::check_representable(snp)?;
        if self.seq_id.as_ref().is_some_and(|id| *id != snp.seq_id) {
            return Err(SnpType::LocationSeqIdMismatch);
        }
        if let Some(comment) = &snp.comment {
            if !self.comments.can_index(comment, MAX_COMMENT_INDEX.into()) {
                return Err(SnpType::CommentIndexOverflow);
            }
        }
        if let Some(extra) = &snp.extra {
            if !self.extra.can_index(extra, MAX_EXTRA_INDEX.into()) {
                return Err(SnpType::ExtraIndexOverflow);
            }
        }
        if !self.alleles.can_index_all(
            snp.alleles.iter().map(String::as_str),
            MAX_ALLELE_INDEX.into(),
        ) {
            return Err(SnpType::AlleleIndexOverflow);
        }
        match &snp.quality_codes {
            None => {}
            Some(QualityCodes::Text(text)) => {
                if !self
                    .quality_codes_str
                    .can_index(text, MAX_QUALITY_CODES_INDEX.into())
                {
                    return Err(SnpType::QualityCodesIndexOverflow);
                }
            }
            Some(QualityCodes::Octets(octets)) => {
                if !self.quality_codes_os.accepts(octets) {
                    return Err(SnpType::QualityCodesSizeMismatch);
                }
                if !self
                    .quality_codes_os
                    .can_index(octets, MAX_QUALITY_CODES_INDEX.into())
                {
                    return Err(SnpType::QualityCodesIndexOverflow);
                }
            }
        }

        let mut info = SnpInfo::new(snp.to_position, snp.feat_id);
        info.position_delta = snp.position_delta;
        info.flags = match snp.strand {
            Strand::Plus => FLAG_PLUS_STRAND,
            Strand::Minus => FLAG_MINUS_STRAND,
            Strand::Both => FLAG_PLUS_STRAND | FLAG_MINUS_STRAND,
            Strand::Unknown => 0,
        };
        if let Some(weight) = snp.weight {
            info.flags |= FLAG_HAS_WEIGHT;
            info.weight = weight;
        }
        if let Some(comment) = &snp.comment {
            info.comment_index = self
                .comments
                .get_index(comment, MAX_COMMENT_INDEX.into())
                .and_then(|index| u16::try_from(index).ok())
                .ok_or(SnpType::CommentIndexOverflow)?;
        }
        if let Some(extra) = &snp.extra {
            info.extra_index = self
                .extra
                .get_index(extra, MAX_EXTRA_INDEX.into())
                .and_then(|index| u16::try_from(index).ok())
                .ok_or(SnpType::ExtraIndexOverflow)?;
        }
        for (slot, allele) in info.allele_indices.iter_mut().zip(&snp.alleles) {
            *slot = self
                .alleles
                .get_index(allele, MAX_ALLELE_INDEX.into())
                .and_then(|index| u8::try_from(index).ok())
                .ok_or(SnpType::AlleleIndexOverflow)?;
        }
        match &snp.quality_codes {
            None => {}
            Some(QualityCodes::Text(text)) => {
                info.flags |= FLAG_QUALITY_CODES_STR;
                info.quality_codes_index = self
                    .quality_codes_str
                    .get_index(text, MAX_QUALITY_CODES_INDEX.into())
                    .and_then(|index| u8::try_from(index).ok())
                    .ok_or(SnpType::QualityCodesIndexOverflow)?;
            }
            Some(QualityCodes::Octets(octets)) => {
                info.flags |= FLAG_QUALITY_CODES_OS;
                info.quality_codes_index = self
                    .quality_codes_os
                    .get_index(octets, MAX_QUALITY_CODES_INDEX.into())
                    .and_then(|index| u8::try_from(index).ok())
                    .ok_or(SnpType::QualityCodesIndexOverflow)?;
            }
        }

        if self.seq_id.is_none() {
            self.seq_id = Some(snp.seq_id.clone());
        }
        Ok(info)
    }

    /// Finalizes the table
    ///
    /// Without a preset or compacted identifier, the first usable identifier among
    /// the complex features' locations provides it. An empty builder without an
    /// identifier fails, as does a preset identifier that cannot be written.
    pub fn finish(self) -> Result<SnpTable> {
        let seq_id = self
            .seq_id
            .or_else(|| {
                self.complex.iter().find_map(|feature| {
                    feature
                        .location
                        .first_seq_id()
                        .filter(|id| id.is_valid())
                        .cloned()
                })
            })
            .ok_or(BuilderError::MissingSeqId)?;
        if !seq_id.is_valid() {
            return Err(BuilderError::InvalidSeqId(seq_id).into());
        }

        tracing::debug!(
            seq_id = %seq_id,
            simple = self.snps.len(),
            complex = self.complex.len(),
            "built SNP table"
        );
        SnpTable::from_parts(SnpTableParts {
            seq_id,
            comments: self.comments,
            alleles: self.alleles,
            extra: self.extra,
            quality_codes_str: self.quality_codes_str,
            quality_codes_os: self.quality_codes_os,
            snps: self.snps,
            complex: self.complex,
        })
    }
}

/// Decodes a JSON array of features and converts it into a table
///
/// The bucket of every feature is tallied into `stats` when one is given.
pub fn parse_features<R, C>(
    reader: R,
    classifier: C,
    stats: Option<&mut ClassificationStats>,
) -> Result<SnpTable>
where
    R: Read,
    C: FeatureClassifier,
{
    let features = decode_features(reader)?;
    tracing::debug!(features = features.len(), "decoded variation features");

    let mut builder = SnpTableBuilder::with_classifier(classifier);
    builder.extend(features, stats);
    builder.finish()
}
