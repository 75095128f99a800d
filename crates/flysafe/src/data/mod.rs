//! Reference tables for the dashboard.
//!
//! The three CSV inputs are loaded once by [`Dataset::load`] into immutable
//! tables. Derived lookups (Sankey nodes, type options, heatmap pivot) are
//! computed at the same time and the whole context is shared by reference
//! between sessions.

pub mod aggregate;
pub mod assets;
pub mod derived;
pub mod loader;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, DashboardConfig};
use crate::error::Result;
use crate::filter::{FatalityRange, FilterState, YearRange};

pub use aggregate::{top_aircraft, yearly_series, AggregateRecord, AircraftStat, HeatmapGrid};
pub use assets::AssetResolver;
pub use derived::{scale_color, DerivedTables, Rgb, SankeyNodes};
pub use loader::LoadReport;

/// Records that carry an accident year.
pub trait Dated {
    /// Calendar year of the accident.
    fn year(&self) -> i32;
}

/// One geocoded accident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccidentRecord {
    /// Accident date.
    pub date: NaiveDate,
    /// Year of `date`, within the loader window.
    pub year: i32,
    /// Aircraft type as written in the source.
    pub aircraft_type: String,
    /// Operating airline or owner.
    pub operator: String,
    /// Free-text location.
    pub location: String,
    /// Latitude in degrees, when geocoded.
    pub latitude: Option<f64>,
    /// Longitude in degrees, when geocoded.
    pub longitude: Option<f64>,
    /// Total fatalities, 0 when unknown.
    pub fatalities: u32,
}

impl AccidentRecord {
    /// `(lat, lon)` when both coordinates are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

impl Dated for AccidentRecord {
    fn year(&self) -> i32 {
        self.year
    }
}

/// An accident and the regulations it led to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactRecord {
    /// Accident date.
    pub date: NaiveDate,
    /// Year of `date`.
    pub year: i32,
    /// Aircraft type.
    pub aircraft_type: String,
    /// Operator.
    pub operator: String,
    /// Fatalities on board.
    pub onboard_fatality: u32,
    /// Fatalities on the ground.
    pub ground_fatality: u32,
    /// Total fatalities.
    pub total_fatality: u32,
    /// Regulation tags in source order, without duplicates.
    pub impacts: Vec<String>,
}

impl ImpactRecord {
    /// `"{operator} {type} ({date})"`, the accident's display key.
    #[must_use]
    pub fn accident_key(&self) -> String {
        format!(
            "{} {} ({})",
            self.operator,
            self.aircraft_type,
            self.date.format("%Y-%m-%d")
        )
    }

    /// `[onboard, ground, total]` as shown in hover text.
    #[must_use]
    pub fn fatality_breakdown(&self) -> [u64; 3] {
        [
            u64::from(self.onboard_fatality),
            u64::from(self.ground_fatality),
            u64::from(self.total_fatality),
        ]
    }
}

impl Dated for ImpactRecord {
    fn year(&self) -> i32 {
        self.year
    }
}

/// One row of the cleaned major-accidents table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    /// Accident date.
    pub date: NaiveDate,
    /// Year of `date`.
    pub year: i32,
    /// Aircraft type.
    pub aircraft_type: String,
    /// Total fatalities, `None` when the cell is blank.
    pub total_fatality: Option<u32>,
    /// Seat capacity of the aircraft, when known.
    pub capacity: Option<u32>,
}

impl CleanedRecord {
    /// Total fatalities with a blank cell counted as 0.
    #[must_use]
    pub fn fatalities(&self) -> u32 {
        self.total_fatality.unwrap_or(0)
    }
}

impl Dated for CleanedRecord {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Keep the rows whose year lies in `range`.
pub fn in_years<T: Dated>(rows: &[T], range: YearRange) -> impl Iterator<Item = &T> {
    rows.iter().filter(move |row| range.contains(row.year()))
}

/// The loaded, immutable application context.
#[derive(Debug)]
pub struct Dataset {
    accidents: Vec<AccidentRecord>,
    impacts: Vec<ImpactRecord>,
    cleaned: Vec<CleanedRecord>,
    derived: DerivedTables,
    reports: Vec<LoadReport>,
    assets: AssetResolver,
    settings: DashboardConfig,
}

impl Dataset {
    /// Load all three tables named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if any table is missing or unreadable; nothing is
    /// partially loaded.
    pub fn load(config: &Config) -> Result<Self> {
        let window = config.window()?;

        let (accidents, accidents_report) =
            loader::load_accidents_file(config.data.accidents_path(), window)?;
        let (impacts, impacts_report) =
            loader::load_impacts_file(config.data.impacts_path(), window)?;
        let (cleaned, cleaned_report) =
            loader::load_cleaned_file(config.data.aggregates_path(), window)?;

        let dataset = Self::from_records(
            accidents,
            impacts,
            cleaned,
            AssetResolver::new(config.data.assets_path()),
            config.dashboard.clone(),
        )
        .with_reports(vec![accidents_report, impacts_report, cleaned_report]);

        info!(
            "Loaded {} accidents, {} impact records, {} cleaned records",
            dataset.accidents.len(),
            dataset.impacts.len(),
            dataset.cleaned.len()
        );
        Ok(dataset)
    }

    /// Build the context from records that are already in memory.
    #[must_use]
    pub fn from_records(
        accidents: Vec<AccidentRecord>,
        impacts: Vec<ImpactRecord>,
        cleaned: Vec<CleanedRecord>,
        assets: AssetResolver,
        settings: DashboardConfig,
    ) -> Self {
        let derived = DerivedTables::build(&accidents, &impacts, &cleaned);
        Self {
            accidents,
            impacts,
            cleaned,
            derived,
            reports: Vec::new(),
            assets,
            settings,
        }
    }

    fn with_reports(mut self, reports: Vec<LoadReport>) -> Self {
        self.reports = reports;
        self
    }

    /// Geocoded accident rows.
    #[must_use]
    pub fn accidents(&self) -> &[AccidentRecord] {
        &self.accidents
    }

    /// Accident to regulation rows.
    #[must_use]
    pub fn impacts(&self) -> &[ImpactRecord] {
        &self.impacts
    }

    /// Cleaned major-accident rows.
    #[must_use]
    pub fn cleaned(&self) -> &[CleanedRecord] {
        &self.cleaned
    }

    /// Lookups computed at load time.
    #[must_use]
    pub fn derived(&self) -> &DerivedTables {
        &self.derived
    }

    /// Per-table load statistics (empty when built from records).
    #[must_use]
    pub fn reports(&self) -> &[LoadReport] {
        &self.reports
    }

    /// Image lookup for aircraft cards.
    #[must_use]
    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    /// Dashboard limits and defaults.
    #[must_use]
    pub fn settings(&self) -> &DashboardConfig {
        &self.settings
    }

    /// The year window the loader kept.
    #[must_use]
    pub fn window(&self) -> YearRange {
        YearRange::new(self.settings.year_min, self.settings.year_max)
            .unwrap_or_else(|_| YearRange::full())
    }

    /// The filter a fresh session starts with.
    #[must_use]
    pub fn default_filters(&self) -> FilterState {
        let card_range = YearRange::new(self.settings.card_year_start, self.settings.card_year_end)
            .unwrap_or_else(|_| self.window());
        FilterState::new(
            self.window(),
            FatalityRange::up_to(self.derived.max_fatalities),
            card_range,
        )
    }
}
