//! Built-in population table.

use std::collections::HashMap;

use crate::error::AppError;
use crate::stats::PopulationLookup;

const BUILTIN_CSV: &str = include_str!("population.csv");

/// Population counts keyed by lower-cased country name.
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    by_name: HashMap<String, u64>,
}

impl PopulationTable {
    /// Parse the table shipped with the binary.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_csv(BUILTIN_CSV)
    }

    /// Parse a `country,population` CSV with a header row.
    pub fn from_csv(text: &str) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut by_name = HashMap::new();
        for (idx, result) in reader.records().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let record = result.map_err(|e| AppError::new(2, format!("Population table line {line}: {e}")))?;

            let name = record
                .get(0)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::new(2, format!("Population table line {line}: missing country")))?;
            let population = record
                .get(1)
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| AppError::new(2, format!("Population table line {line}: invalid population")))?;

            by_name.insert(name.to_lowercase(), population);
        }

        Ok(Self { by_name })
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl PopulationLookup for PopulationTable {
    fn population(&self, name: &str) -> u64 {
        let key = name.to_lowercase();
        // The feed names the United States "US".
        let key = if key == "us" { "united states" } else { key.as_str() };
        self.by_name.get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let table = PopulationTable::builtin().unwrap();
        assert!(table.len() > 200);
        assert_eq!(table.population("Russia"), 145_922_010);
    }

    #[test]
    fn lookup_is_case_insensitive_with_us_alias() {
        let table = PopulationTable::builtin().unwrap();
        let us = table.population("United States");
        assert!(us > 300_000_000);
        assert_eq!(table.population("US"), us);
        assert_eq!(table.population("us"), us);
        assert_eq!(table.population("germany"), table.population("Germany"));
    }

    #[test]
    fn unknown_names_are_zero() {
        let table = PopulationTable::builtin().unwrap();
        assert_eq!(table.population("Atlantis"), 0);
        assert_eq!(table.population(""), 0);
    }

    #[test]
    fn invalid_rows_are_rejected() {
        let err = PopulationTable::from_csv("country,population\nNowhere,lots\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("line 2"));
    }
}
