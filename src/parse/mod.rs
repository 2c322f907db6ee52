//! # Feature conversion
//!
//! Converts verbose variation features into a compact [`crate::SnpTable`] in two passes:
//!
//! 1. the whole feature list is decoded ([`decode_features`])
//! 2. each feature is classified and either compacted into a record or kept
//!    verbatim in the complex overflow list ([`SnpTableBuilder`])
//!
//! ```
//! use binsnp::parse::{ClassificationStats, DefaultClassifier, SnpType, parse_features};
//!
//! let json = r#"[{
//!     "location": {"point": {"id": {"gi": 12345}, "point": 100, "strand": "plus"}},
//!     "qualifiers": [{"qual": "replace", "val": "A"}, {"qual": "replace", "val": "G"}],
//!     "dbxrefs": [{"db": "dbSNP", "tag": {"id": 6025}}]
//! }]"#;
//!
//! let mut stats = ClassificationStats::default();
//! let table = parse_features(json.as_bytes(), DefaultClassifier::default(), Some(&mut stats))?;
//! assert_eq!(table.len(), 1);
//! assert_eq!(stats.count(SnpType::Simple), 1);
//! # Ok::<(), binsnp::Error>(())
//! ```

mod builder;
mod classify;
mod feature;
mod stats;

pub use builder::{SnpTableBuilder, parse_features};
pub use classify::{
    Classification, DEFAULT_MAX_ALLELE_LENGTH, DefaultClassifier, FeatureClassifier, SimpleSnp,
    SnpType,
};
pub use feature::{
    DB_SNP, DbXref, Location, ObjectTag, QUAL_REPLACE, QUAL_WEIGHT, QualityCodes, Qualifier,
    Strand, VariationFeature, decode_features, encode_features,
};
pub use stats::ClassificationStats;
