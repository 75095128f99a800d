//! Grouping of cleaned records by aircraft type and year.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{in_years, CleanedRecord};
use crate::filter::YearRange;

/// Fatality sum and accident count for one aircraft type in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRecord {
    /// Aircraft type.
    pub aircraft_type: String,
    /// Calendar year.
    pub year: i32,
    /// Sum of total fatalities.
    pub total_fatality_sum: u64,
    /// Number of accidents.
    pub accident_count: usize,
}

/// Fatality sum and accident count for one aircraft type over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AircraftStat {
    /// Aircraft type.
    pub aircraft_type: String,
    /// Sum of total fatalities.
    pub total_fatality_sum: u64,
    /// Number of accidents.
    pub accident_count: usize,
}

/// The `n` deadliest aircraft types within `range`.
///
/// Types are grouped in name order and sorted stably by descending fatality
/// sum, so ties keep name order. Rows with an empty type are ignored.
#[must_use]
pub fn top_aircraft(rows: &[CleanedRecord], range: YearRange, n: usize) -> Vec<AircraftStat> {
    let mut groups: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for row in in_years(rows, range).filter(|r| !r.aircraft_type.is_empty()) {
        let entry = groups.entry(row.aircraft_type.as_str()).or_default();
        entry.0 += u64::from(row.fatalities());
        entry.1 += 1;
    }

    let mut stats: Vec<AircraftStat> = groups
        .into_iter()
        .map(|(aircraft_type, (total_fatality_sum, accident_count))| AircraftStat {
            aircraft_type: aircraft_type.to_string(),
            total_fatality_sum,
            accident_count,
        })
        .collect();
    stats.sort_by(|a, b| b.total_fatality_sum.cmp(&a.total_fatality_sum));
    stats.truncate(n);
    stats
}

/// Per-year sums for one aircraft type within `range`, ascending by year.
#[must_use]
pub fn yearly_series(
    rows: &[CleanedRecord],
    aircraft_type: &str,
    range: YearRange,
) -> Vec<AggregateRecord> {
    let mut years: BTreeMap<i32, (u64, usize)> = BTreeMap::new();
    for row in in_years(rows, range).filter(|r| r.aircraft_type == aircraft_type) {
        let entry = years.entry(row.year).or_default();
        entry.0 += u64::from(row.fatalities());
        entry.1 += 1;
    }

    years
        .into_iter()
        .map(|(year, (total_fatality_sum, accident_count))| AggregateRecord {
            aircraft_type: aircraft_type.to_string(),
            year,
            total_fatality_sum,
            accident_count,
        })
        .collect()
}

/// Accident counts pivoted by aircraft type (rows) and year (columns).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeatmapGrid {
    /// Column labels, ascending.
    pub years: Vec<i32>,
    /// Row labels, ascending.
    pub types: Vec<String>,
    /// `counts[row][column]`, zero-filled.
    pub counts: Vec<Vec<u32>>,
}

impl HeatmapGrid {
    /// Pivot `rows`. Rows with a blank fatality cell are not counted.
    #[must_use]
    pub fn build(rows: &[CleanedRecord]) -> Self {
        let rows: Vec<&CleanedRecord> = rows
            .iter()
            .filter(|r| !r.aircraft_type.is_empty() && r.total_fatality.is_some())
            .collect();
        let years: Vec<i32> = rows
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let types: Vec<String> = rows
            .iter()
            .map(|r| r.aircraft_type.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let mut counts = vec![vec![0_u32; years.len()]; types.len()];
        for row in rows {
            // Both lookups succeed: the labels were collected from these rows
            if let (Ok(t), Ok(y)) = (
                types.binary_search_by(|label| label.as_str().cmp(row.aircraft_type.as_str())),
                years.binary_search(&row.year),
            ) {
                counts[t][y] += 1;
            }
        }

        Self {
            years,
            types,
            counts,
        }
    }

    /// Count for one cell, 0 when either label is absent.
    #[must_use]
    pub fn count(&self, aircraft_type: &str, year: i32) -> u32 {
        let t = self.types.iter().position(|t| t == aircraft_type);
        let y = self.years.iter().position(|&y| y == year);
        match (t, y) {
            (Some(t), Some(y)) => self.counts[t][y],
            _ => 0,
        }
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() || self.years.is_empty()
    }
}
