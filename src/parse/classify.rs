//! Feature classification
//!
//! Decides whether a verbose feature fits the compact record layout, and if so
//! extracts the values that go into it. Features that do not fit are labelled with
//! the first rule they broke.

use auto_impl::auto_impl;

use super::feature::{
    DB_SNP, Location, ObjectTag, QUAL_REPLACE, QUAL_WEIGHT, QualityCodes, Strand, VariationFeature,
};
use crate::snp::{DEFAULT_MAX_ENTRY_LENGTH, MAX_ALLELES_COUNT, MAX_POSITION_DELTA};
use crate::SeqId;

/// Default maximum length of one allele
pub const DEFAULT_MAX_ALLELE_LENGTH: usize = 32;

/// Classification bucket of one feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnpType {
    /// Compacted into a simple SNP record
    Simple,
    BadStrand,
    LocationIsNotPoint,
    LocationTooLong,
    LocationSeqIdMismatch,
    IdCountIsNotOne,
    IdIsNotDbSnp,
    IdIsNotInteger,
    BadQualifier,
    AlleleCountTooLarge,
    AlleleTooLong,
    WeightCountIsNotOne,
    WeightBadValue,
    CommentTooLong,
    CommentIndexOverflow,
    ExtraTooLong,
    ExtraIndexOverflow,
    AlleleIndexOverflow,
    QualityCodesIndexOverflow,
    QualityCodesSizeMismatch,
}
impl SnpType {
    /// Number of buckets
    pub const COUNT: usize = 20;

    /// All buckets in declaration order
    pub const ALL: [SnpType; Self::COUNT] = [
        Self::Simple,
        Self::BadStrand,
        Self::LocationIsNotPoint,
        Self::LocationTooLong,
        Self::LocationSeqIdMismatch,
        Self::IdCountIsNotOne,
        Self::IdIsNotDbSnp,
        Self::IdIsNotInteger,
        Self::BadQualifier,
        Self::AlleleCountTooLarge,
        Self::AlleleTooLong,
        Self::WeightCountIsNotOne,
        Self::WeightBadValue,
        Self::CommentTooLong,
        Self::CommentIndexOverflow,
        Self::ExtraTooLong,
        Self::ExtraIndexOverflow,
        Self::AlleleIndexOverflow,
        Self::QualityCodesIndexOverflow,
        Self::QualityCodesSizeMismatch,
    ];

    #[must_use]
    pub fn is_simple(self) -> bool {
        self == Self::Simple
    }

    /// Position of this bucket in [`SnpType::ALL`]
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "OK",
            Self::BadStrand => "bad strand",
            Self::LocationIsNotPoint => "location is not point",
            Self::LocationTooLong => "location too long",
            Self::LocationSeqIdMismatch => "location seq-id mismatch",
            Self::IdCountIsNotOne => "id count is not one",
            Self::IdIsNotDbSnp => "id is not dbSNP",
            Self::IdIsNotInteger => "id is not integer",
            Self::BadQualifier => "bad qualifier",
            Self::AlleleCountTooLarge => "allele count too large",
            Self::AlleleTooLong => "allele too long",
            Self::WeightCountIsNotOne => "weight count is not one",
            Self::WeightBadValue => "weight bad value",
            Self::CommentTooLong => "comment too long",
            Self::CommentIndexOverflow => "comment index overflow",
            Self::ExtraTooLong => "extra too long",
            Self::ExtraIndexOverflow => "extra index overflow",
            Self::AlleleIndexOverflow => "allele index overflow",
            Self::QualityCodesIndexOverflow => "quality codes index overflow",
            Self::QualityCodesSizeMismatch => "quality codes size mismatch",
        }
    }
}

/// Field values extracted from a feature that fits the compact layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSnp {
    pub seq_id: SeqId,
    pub to_position: u32,
    pub position_delta: u8,
    pub strand: Strand,
    pub feat_id: u32,
    pub weight: Option<u8>,
    pub comment: Option<String>,
    pub extra: Option<String>,
    pub alleles: Vec<String>,
    pub quality_codes: Option<QualityCodes>,
}

/// Outcome of classifying one feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Simple(SimpleSnp),
    /// The feature stays verbose, labelled with the rule it broke
    Complex(SnpType),
}

/// Decides whether a feature can be compacted and extracts its values
#[auto_impl(&, Box, Arc)]
pub trait FeatureClassifier {
    fn classify(&self, feature: &VariationFeature) -> Classification;
}

/// The standard rules for compacting dbSNP variation features
#[derive(Debug, Clone, Copy)]
pub struct DefaultClassifier {
    pub max_allele_length: usize,
    pub max_comment_length: usize,
    pub max_extra_length: usize,
}
impl Default for DefaultClassifier {
    fn default() -> Self {
        Self {
            max_allele_length: DEFAULT_MAX_ALLELE_LENGTH,
            max_comment_length: DEFAULT_MAX_ENTRY_LENGTH,
            max_extra_length: DEFAULT_MAX_ENTRY_LENGTH,
        }
    }
}
impl DefaultClassifier {
    fn location(location: &Location) -> Result<(SeqId, u32, u8, Strand), SnpType> {
        let (id, from, to, strand) = match location {
            Location::Point { id, point, strand } => (id, *point, *point, *strand),
            Location::Interval {
                id,
                from,
                to,
                strand,
            } => (id, *from, *to, *strand),
            Location::Mix(_) => return Err(SnpType::LocationIsNotPoint),
        };
        // gi 0 and empty text have no encoding as a table seq-id
        if !id.is_valid() {
            return Err(SnpType::LocationSeqIdMismatch);
        }
        if to < from {
            return Err(SnpType::LocationIsNotPoint);
        }
        if to - from > u32::from(MAX_POSITION_DELTA) {
            return Err(SnpType::LocationTooLong);
        }
        let delta = u8::try_from(to - from).map_err(|_| SnpType::LocationTooLong)?;
        if strand == Strand::Both {
            return Err(SnpType::BadStrand);
        }
        Ok((id.clone(), to, delta, strand))
    }

    fn feat_id(feature: &VariationFeature) -> Result<u32, SnpType> {
        let [xref] = feature.dbxrefs.as_slice() else {
            return Err(SnpType::IdCountIsNotOne);
        };
        if xref.db != DB_SNP {
            return Err(SnpType::IdIsNotDbSnp);
        }
        match xref.tag {
            ObjectTag::Id(id) => u32::try_from(id).map_err(|_| SnpType::IdIsNotInteger),
            ObjectTag::Str(_) => Err(SnpType::IdIsNotInteger),
        }
    }

    fn qualifiers(&self, feature: &VariationFeature) -> Result<(Vec<String>, Option<u8>), SnpType> {
        let mut alleles = Vec::new();
        let mut weight = None;
        for qualifier in &feature.qualifiers {
            match qualifier.qual.as_str() {
                QUAL_REPLACE => {
                    if alleles.len() == MAX_ALLELES_COUNT {
                        return Err(SnpType::AlleleCountTooLarge);
                    }
                    if qualifier.val.len() > self.max_allele_length {
                        return Err(SnpType::AlleleTooLong);
                    }
                    alleles.push(qualifier.val.clone());
                }
                QUAL_WEIGHT => {
                    if weight.is_some() {
                        return Err(SnpType::WeightCountIsNotOne);
                    }
                    let value = qualifier
                        .val
                        .parse::<u8>()
                        .map_err(|_| SnpType::WeightBadValue)?;
                    weight = Some(value);
                }
                _ => return Err(SnpType::BadQualifier),
            }
        }
        Ok((alleles, weight))
    }

    fn try_classify(&self, feature: &VariationFeature) -> Result<SimpleSnp, SnpType> {
        let (seq_id, to_position, position_delta, strand) = Self::location(&feature.location)?;
        let feat_id = Self::feat_id(feature)?;
        let (alleles, weight) = self.qualifiers(feature)?;

        if feature
            .comment
            .as_ref()
            .is_some_and(|comment| comment.len() > self.max_comment_length)
        {
            return Err(SnpType::CommentTooLong);
        }
        if feature
            .extra
            .as_ref()
            .is_some_and(|extra| extra.len() > self.max_extra_length)
        {
            return Err(SnpType::ExtraTooLong);
        }
        let quality_codes_fit = match &feature.quality_codes {
            None => true,
            Some(QualityCodes::Text(text)) => text.len() <= DEFAULT_MAX_ENTRY_LENGTH,
            Some(QualityCodes::Octets(octets)) => {
                !octets.is_empty() && octets.len() <= DEFAULT_MAX_ENTRY_LENGTH
            }
        };
        if !quality_codes_fit {
            return Err(SnpType::QualityCodesSizeMismatch);
        }

        Ok(SimpleSnp {
            seq_id,
            to_position,
            position_delta,
            strand,
            feat_id,
            weight,
            comment: feature.comment.clone(),
            extra: feature.extra.clone(),
            alleles,
            quality_codes: feature.quality_codes.clone(),
        })
    }
}
impl FeatureClassifier for DefaultClassifier {
    fn classify(&self, feature: &VariationFeature) -> Classification {
        match self.try_classify(feature) {
            Ok(snp) => Classification::Simple(snp),
            Err(snp_type) => Classification::Complex(snp_type),
        }
    }
}
