//! Whole-page rendering and the filter panel options.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::charts::{self, ChartId, ChartOutput};
use crate::data::Dataset;
use crate::filter::{FilterState, ViewMode};

/// Spacing of fatality slider marks.
pub const FATALITY_MARK_STEP: u32 = 300;

/// Spacing of year slider marks.
pub const YEAR_MARK_STEP: i32 = 10;

/// Every chart of the page for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Filters the charts were rendered for.
    pub filters: FilterState,
    /// Charts by id.
    pub charts: BTreeMap<ChartId, ChartOutput>,
}

/// Render every chart for `filters`.
#[must_use]
pub fn render_all(dataset: &Dataset, filters: &FilterState) -> DashboardView {
    DashboardView {
        filters: filters.clone(),
        charts: ChartId::ALL
            .into_iter()
            .map(|chart| (chart, charts::render(chart, dataset, filters)))
            .collect(),
    }
}

/// One entry of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice<V> {
    /// Text shown to the user.
    pub label: String,
    /// Value sent back.
    pub value: V,
}

/// Everything the filter panel needs to draw its controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Aircraft types in first-seen order.
    pub aircraft_types: Vec<String>,
    /// Year slider bounds.
    pub year_bounds: [i32; 2],
    /// Year slider marks.
    pub year_marks: Vec<i32>,
    /// Fatality slider upper bound.
    pub max_fatalities: u32,
    /// Fatality slider marks.
    pub fatality_marks: Vec<u32>,
    /// Map view selector.
    pub view_modes: Vec<Choice<ViewMode>>,
    /// Years offered by the card dropdowns.
    pub card_years: Vec<i32>,
    /// State of a fresh session.
    pub defaults: FilterState,
}

impl FilterOptions {
    /// Options for `dataset`.
    #[must_use]
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let window = dataset.window();
        let max_fatalities = dataset.derived().max_fatalities;

        Self {
            aircraft_types: dataset.derived().aircraft_types.clone(),
            year_bounds: window.into(),
            year_marks: window
                .years()
                .filter(|year| year % YEAR_MARK_STEP == 0)
                .collect(),
            max_fatalities,
            fatality_marks: (0..=max_fatalities)
                .step_by(FATALITY_MARK_STEP as usize)
                .collect(),
            view_modes: ViewMode::ALL
                .into_iter()
                .map(|mode| Choice {
                    label: mode.label().to_string(),
                    value: mode,
                })
                .collect(),
            card_years: window.years().collect(),
            defaults: dataset.default_filters(),
        }
    }
}
