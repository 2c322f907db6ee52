//! Verbose per-feature variation records
//!
//! This is the general object model that compact SNP records are extracted from.
//! Features that cannot be compacted are kept in this form as complex features.
//! The model is decoded with `serde_json` before classification runs over it.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{Result, SeqId};

/// Qualifier naming one allele of a variation
pub const QUAL_REPLACE: &str = "replace";

/// Qualifier carrying the weight of a variation
pub const QUAL_WEIGHT: &str = "weight";

/// Database name of the cross-reference carrying the variation id
pub const DB_SNP: &str = "dbSNP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    #[default]
    Unknown,
    Plus,
    Minus,
    Both,
}

/// Where a feature lies on its sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// A single base
    Point {
        id: SeqId,
        point: u32,
        #[serde(default)]
        strand: Strand,
    },
    /// An inclusive range of bases
    Interval {
        id: SeqId,
        from: u32,
        to: u32,
        #[serde(default)]
        strand: Strand,
    },
    /// Several disjoint locations
    Mix(Vec<Location>),
}
impl Location {
    /// Returns the first sequence identifier found in this location
    #[must_use]
    pub fn first_seq_id(&self) -> Option<&SeqId> {
        match self {
            Self::Point { id, .. } | Self::Interval { id, .. } => Some(id),
            Self::Mix(locations) => locations.iter().find_map(Location::first_seq_id),
        }
    }
}

/// A named free-text qualifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub qual: String,
    pub val: String,
}
impl Qualifier {
    pub fn new(qual: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            qual: qual.into(),
            val: val.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectTag {
    Id(i64),
    Str(String),
}

/// A cross-reference into an external database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbXref {
    pub db: String,
    pub tag: ObjectTag,
}
impl DbXref {
    /// A dbSNP cross-reference with a numeric id
    #[must_use]
    pub fn db_snp(id: i64) -> Self {
        Self {
            db: DB_SNP.to_string(),
            tag: ObjectTag::Id(id),
        }
    }
}

/// Quality codes attached to a variation, either as text or as raw octets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityCodes {
    Text(String),
    Octets(Vec<u8>),
}

/// One verbose variation feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationFeature {
    pub location: Location,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Qualifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dbxrefs: Vec<DbXref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_codes: Option<QualityCodes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}
impl VariationFeature {
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            location,
            comment: None,
            qualifiers: Vec::new(),
            dbxrefs: Vec::new(),
            quality_codes: None,
            extra: None,
        }
    }

    /// Iterates over the values of all qualifiers named `qual`
    pub fn qualifier_values<'a>(&'a self, qual: &'a str) -> impl Iterator<Item = &'a str> {
        self.qualifiers
            .iter()
            .filter(move |q| q.qual == qual)
            .map(|q| q.val.as_str())
    }
}

/// Decodes a JSON array of features in one pass
pub fn decode_features<R: Read>(reader: R) -> Result<Vec<VariationFeature>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Encodes features as a JSON array
pub fn encode_features<W: Write>(writer: W, features: &[VariationFeature]) -> Result<()> {
    serde_json::to_writer(writer, features)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_feature() -> Result<()> {
        let json = r#"[{"location": {"point": {"id": {"gi": 12345}, "point": 100}}}]"#;
        let features = decode_features(json.as_bytes())?;
        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].location,
            Location::Point {
                id: SeqId::Gi(12345),
                point: 100,
                strand: Strand::Unknown
            }
        );
        assert!(features[0].qualifiers.is_empty());
        Ok(())
    }

    #[test]
    fn test_decode_full_feature() -> Result<()> {
        let json = r#"[{
            "location": {"interval": {"id": {"text": "NC_000001.11"}, "from": 10, "to": 12, "strand": "minus"}},
            "comment": "rare",
            "qualifiers": [{"qual": "replace", "val": "A"}, {"qual": "replace", "val": "G"}],
            "dbxrefs": [{"db": "dbSNP", "tag": {"id": 6025}}],
            "quality_codes": {"octets": [1, 2, 3]},
            "extra": "x"
        }]"#;
        let features = decode_features(json.as_bytes())?;
        let feature = &features[0];
        assert_eq!(feature.comment.as_deref(), Some("rare"));
        assert_eq!(
            feature.qualifier_values(QUAL_REPLACE).collect::<Vec<_>>(),
            ["A", "G"]
        );
        assert_eq!(feature.dbxrefs, [DbXref::db_snp(6025)]);
        assert_eq!(feature.quality_codes, Some(QualityCodes::Octets(vec![1, 2, 3])));
        Ok(())
    }

    #[test]
    fn test_encode_decode() -> Result<()> {
        let mut feature = VariationFeature::new(Location::Mix(vec![
            Location::Point {
                id: SeqId::Gi(1),
                point: 5,
                strand: Strand::Plus,
            },
            Location::Point {
                id: SeqId::Gi(1),
                point: 9,
                strand: Strand::Plus,
            },
        ]));
        feature.qualifiers.push(Qualifier::new(QUAL_WEIGHT, "3"));
        let mut buf = Vec::new();
        encode_features(&mut buf, std::slice::from_ref(&feature))?;
        assert_eq!(decode_features(buf.as_slice())?, vec![feature]);
        Ok(())
    }

    #[test]
    fn test_first_seq_id() {
        let location = Location::Mix(vec![
            Location::Mix(vec![]),
            Location::Interval {
                id: SeqId::from("chr2"),
                from: 1,
                to: 2,
                strand: Strand::Unknown,
            },
        ]);
        assert_eq!(location.first_seq_id(), Some(&SeqId::from("chr2")));
        assert_eq!(Location::Mix(vec![]).first_seq_id(), None);
    }

    #[test]
    fn test_decode_malformed() {
        let result = decode_features(r#"[{"comment": "no location"}]"#.as_bytes());
        assert!(matches!(result, Err(crate::Error::FeatureEncodingError(_))));
    }
}
