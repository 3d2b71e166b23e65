//! Per-million normalization and the display threshold.

/// Population unit for per-capita views.
pub const PER_CAPITA_UNIT: u64 = 1_000_000;

/// Source of population counts for entity names.
///
/// Implementations return 0 when the entity is unknown.
pub trait PopulationLookup {
    fn population(&self, name: &str) -> u64;
}

/// `value / (population / 1_000_000)`, integer division.
///
/// Returns `None` for populations under one million: the divisor would be
/// zero, so those entities have no per-capita view.
pub fn per_million(value: u64, population: u64) -> Option<u64> {
    let divisor = population / PER_CAPITA_UNIT;
    if divisor == 0 {
        return None;
    }
    Some(value / divisor)
}

/// Minimum value a sample needs to be drawn in averaged and per-capita views.
///
/// Samples below the threshold are left out of the series, not drawn as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayThreshold(u64);

impl DisplayThreshold {
    pub const DEFAULT: DisplayThreshold = DisplayThreshold(3);

    pub fn new(min: u64) -> Self {
        Self(min)
    }

    pub fn min(self) -> u64 {
        self.0
    }

    pub fn meets(self, value: u64) -> bool {
        value >= self.0
    }
}

impl Default for DisplayThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_million_population_is_rejected() {
        assert_eq!(per_million(1_000, 500_000), None);
        assert_eq!(per_million(1_000, 0), None);
    }

    #[test]
    fn divisor_is_whole_millions() {
        // 145_922_010 people -> divisor 145
        assert_eq!(per_million(14_500, 145_922_010), Some(100));
        // 14.5M over a divisor of 145 is 100_000, not 100.
        assert_eq!(per_million(14_500_000, 145_000_000), Some(100_000));
        assert_eq!(per_million(5, 1_999_999), Some(5));
    }

    #[test]
    fn threshold_is_inclusive() {
        let t = DisplayThreshold::default();
        assert!(!t.meets(2));
        assert!(t.meets(3));
        assert!(DisplayThreshold::new(0).meets(0));
    }
}
