//! View builders.
//!
//! Every chart of the dashboard is produced by a pure function from the
//! [`Dataset`] and a [`FilterState`] to a plotly figure. Builders never
//! fail: a filter that selects nothing yields an empty but valid figure.

pub mod cards;
pub mod figure;
pub mod heatmap;
pub mod map;
pub mod sankey;
pub mod series;
pub mod table;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::filter::{FilterField, FilterState};

pub use cards::{aircraft_cards, AircraftCard};
pub use figure::{Figure, Trace};
pub use table::recent_accidents;

/// A chart of the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    /// Accident map.
    Map,
    /// Accident to regulation flows.
    Sankey,
    /// Accidents per year.
    AnnualAccidents,
    /// Fatalities per year.
    AnnualFatalities,
    /// Fatalities against capacity.
    Capacity,
    /// Accident frequency per type and year.
    Heatmap,
    /// Latest accidents table.
    RecentAccidents,
    /// Top aircraft cards.
    AircraftCards,
}

impl ChartId {
    /// Every chart in page order.
    pub const ALL: [ChartId; 8] = [
        Self::Map,
        Self::Sankey,
        Self::AircraftCards,
        Self::AnnualAccidents,
        Self::AnnualFatalities,
        Self::Capacity,
        Self::Heatmap,
        Self::RecentAccidents,
    ];

    /// Wire name of the chart.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Sankey => "sankey",
            Self::AnnualAccidents => "annual_accidents",
            Self::AnnualFatalities => "annual_fatalities",
            Self::Capacity => "capacity",
            Self::Heatmap => "heatmap",
            Self::RecentAccidents => "recent_accidents",
            Self::AircraftCards => "aircraft_cards",
        }
    }

    /// Filter controls this chart depends on.
    #[must_use]
    pub const fn inputs(&self) -> &'static [FilterField] {
        match self {
            Self::Map => &[
                FilterField::YearRange,
                FilterField::AircraftTypes,
                FilterField::FatalityRange,
                FilterField::ViewMode,
            ],
            Self::Sankey | Self::RecentAccidents => &[FilterField::YearRange],
            Self::AnnualAccidents | Self::AnnualFatalities | Self::Capacity => {
                &[FilterField::FatalityRange]
            }
            Self::AircraftCards => &[FilterField::CardYearRange],
            Self::Heatmap => &[],
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|chart| chart.as_str() == wanted)
            .ok_or_else(|| Error::UnknownChart(s.to_string()))
    }
}

/// What a chart renders to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartOutput {
    /// A single plotly figure.
    Figure(Figure),
    /// A row of aircraft cards.
    Cards(Vec<AircraftCard>),
}

impl ChartOutput {
    /// The figure, if this output is one.
    #[must_use]
    pub fn as_figure(&self) -> Option<&Figure> {
        match self {
            Self::Figure(figure) => Some(figure),
            Self::Cards(_) => None,
        }
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Figure(figure) => figure.is_empty(),
            Self::Cards(cards) => cards.is_empty(),
        }
    }
}

/// Render one chart for `filters`.
#[must_use]
pub fn render(chart: ChartId, dataset: &Dataset, filters: &FilterState) -> ChartOutput {
    let figure = match chart {
        ChartId::Map => map::accident_map(
            &filters.select_accidents(dataset.accidents()),
            filters.view_mode,
            filters.year_range,
        ),
        ChartId::Sankey => sankey::sankey(
            dataset.impacts(),
            &dataset.derived().nodes,
            filters.year_range,
        ),
        ChartId::AnnualAccidents => {
            series::annual_accidents(dataset.accidents(), filters.fatality_range)
        }
        ChartId::AnnualFatalities => {
            series::annual_fatalities(dataset.accidents(), filters.fatality_range)
        }
        ChartId::Capacity => series::capacity(dataset.cleaned(), filters.fatality_range),
        ChartId::Heatmap => heatmap::heatmap(&dataset.derived().heatmap),
        ChartId::RecentAccidents => table::recent_table(&recent_accidents(
            dataset.accidents(),
            filters.year_range,
            dataset.settings().recent_limit,
        )),
        ChartId::AircraftCards => {
            return ChartOutput::Cards(aircraft_cards(dataset, filters.card_year_range));
        }
    };
    ChartOutput::Figure(figure)
}
