use crate::interleave::Source;

/// Records read by a worker during a pass, split by the source they came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundStats {
    pub training: u64,
    pub validation: u64,
}

impl RoundStats {
    #[inline]
    pub fn bump(&mut self, source: Source) {
        match source {
            Source::Training => self.training += 1,
            Source::Validation => self.validation += 1,
        }
    }

    #[inline]
    pub fn merge(&mut self, other: &RoundStats) {
        self.training += other.training;
        self.validation += other.validation;
    }

    pub fn records(&self) -> u64 {
        self.training + self.validation
    }
}
