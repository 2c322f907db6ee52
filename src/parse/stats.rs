//! Classification statistics
//!
//! A tally of how many features fell into each [`SnpType`] bucket. Collection is
//! optional: callers that want statistics pass an accumulator into the parse.

use super::classify::SnpType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationStats {
    counts: [u64; SnpType::COUNT],
}
impl Default for ClassificationStats {
    fn default() -> Self {
        Self {
            counts: [0; SnpType::COUNT],
        }
    }
}
impl ClassificationStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snp_type: SnpType) {
        self.counts[snp_type.ordinal()] += 1;
    }

    #[must_use]
    pub fn count(&self, snp_type: SnpType) -> u64 {
        self.counts[snp_type.ordinal()]
    }

    /// Total number of features recorded
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn simple(&self) -> u64 {
        self.count(SnpType::Simple)
    }

    #[must_use]
    pub fn complex(&self) -> u64 {
        self.total() - self.simple()
    }

    /// Adds the counts of `other` into `self`
    pub fn merge(&mut self, other: &Self) {
        for (count, other) in self.counts.iter_mut().zip(other.counts) {
            *count += other;
        }
    }

    /// Iterates over the buckets with a nonzero count
    pub fn iter(&self) -> impl Iterator<Item = (SnpType, u64)> + '_ {
        SnpType::ALL
            .iter()
            .map(|&snp_type| (snp_type, self.count(snp_type)))
            .filter(|&(_, count)| count > 0)
    }

    /// Logs one line per nonzero bucket
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total(),
            simple = self.simple(),
            complex = self.complex(),
            "classification summary"
        );
        for (snp_type, count) in self.iter() {
            tracing::info!(bucket = snp_type.name(), count, "classification bucket");
        }
    }
}
