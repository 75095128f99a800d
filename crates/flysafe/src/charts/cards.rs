//! Cards for the deadliest aircraft types of a year range.

use serde::Serialize;

use super::figure::Figure;
use super::series::{card_accidents, card_fatalities};
use crate::data::{top_aircraft, yearly_series, Dataset};
use crate::filter::YearRange;

/// One aircraft card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftCard {
    /// 1-based rank by fatality sum.
    pub rank: usize,
    /// Aircraft type, also the card title.
    pub aircraft_type: String,
    /// Fatality sum over the range.
    pub total_fatalities: u64,
    /// Accident count over the range.
    pub accident_count: usize,
    /// Image URL under `/assets`.
    pub image: String,
    /// Fatalities per year.
    pub fatalities: Figure,
    /// Accidents per year.
    pub accidents: Figure,
}

/// Cards for the top aircraft types within `range`.
///
/// Fewer cards are returned when the range has fewer types than the
/// configured count.
#[must_use]
pub fn aircraft_cards(dataset: &Dataset, range: YearRange) -> Vec<AircraftCard> {
    top_aircraft(dataset.cleaned(), range, dataset.settings().top_aircraft)
        .into_iter()
        .enumerate()
        .map(|(i, stat)| {
            let series = yearly_series(dataset.cleaned(), &stat.aircraft_type, range);
            AircraftCard {
                rank: i + 1,
                image: dataset.assets().image_for(&stat.aircraft_type),
                fatalities: card_fatalities(&series),
                accidents: card_accidents(&series),
                total_fatalities: stat.total_fatality_sum,
                accident_count: stat.accident_count,
                aircraft_type: stat.aircraft_type,
            }
        })
        .collect()
}
