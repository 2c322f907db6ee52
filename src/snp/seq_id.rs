use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The sequence a SNP table's coordinates are relative to
///
/// A gi is stored compactly as an integer on the wire; any other identifier
/// is stored as its canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeqId {
    /// A numeric gi (0 is reserved and never identifies a sequence)
    Gi(i64),
    /// Any other identifier in its canonical text form (e.g. `NC_000001.11`)
    Text(String),
}
impl SeqId {
    #[must_use]
    pub fn gi(&self) -> Option<i64> {
        match self {
            Self::Gi(gi) => Some(*gi),
            Self::Text(_) => None,
        }
    }

    /// Returns whether the identifier can be stored: a nonzero gi or non-empty text
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Gi(gi) => *gi != 0,
            Self::Text(text) => !text.is_empty(),
        }
    }
}
impl fmt::Display for SeqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gi(gi) => write!(f, "gi|{gi}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
impl FromStr for SeqId {
    type Err = std::convert::Infallible;

    /// Parses `gi|<n>` with a nonzero `n` as a gi and anything else as text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(gi) = s
            .strip_prefix("gi|")
            .and_then(|n| n.parse::<i64>().ok())
            .filter(|&gi| gi != 0)
        {
            return Ok(Self::Gi(gi));
        }
        Ok(Self::Text(s.to_string()))
    }
}
impl From<i64> for SeqId {
    fn from(gi: i64) -> Self {
        Self::Gi(gi)
    }
}
impl From<&str> for SeqId {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(SeqId::Gi(-3).is_valid());
        assert!(SeqId::from("chr1").is_valid());
        assert!(!SeqId::Gi(0).is_valid());
        assert!(!SeqId::from("").is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(SeqId::Gi(12345).to_string(), "gi|12345");
        assert_eq!(SeqId::from("NC_000001.11").to_string(), "NC_000001.11");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("gi|42".parse::<SeqId>().unwrap(), SeqId::Gi(42));
        assert_eq!(
            "gi|0".parse::<SeqId>().unwrap(),
            SeqId::Text("gi|0".to_string())
        );
        assert_eq!(
            "gi|abc".parse::<SeqId>().unwrap(),
            SeqId::Text("gi|abc".to_string())
        );
        assert_eq!(
            "NT_077402.3".parse::<SeqId>().unwrap(),
            SeqId::from("NT_077402.3")
        );
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&SeqId::Gi(7)).unwrap();
        assert_eq!(json, r#"{"gi":7}"#);
        let id: SeqId = serde_json::from_str(r#"{"text":"chr1"}"#).unwrap();
        assert_eq!(id, SeqId::from("chr1"));
    }
}
