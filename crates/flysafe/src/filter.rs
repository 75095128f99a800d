//! Session filter state.
//!
//! A [`FilterState`] is what the dashboard controls hold: year range, aircraft
//! type selection, fatality range, map view mode and the card year range.
//! Ranges are validated on construction (and on deserialization), so a
//! `FilterState` value always satisfies `lo <= hi`.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::data::AccidentRecord;
use crate::error::{Error, Result};

/// First year shown by the dashboard.
pub const FIRST_YEAR: i32 = 1960;

/// Last year shown by the dashboard.
pub const LAST_YEAR: i32 = 2025;

/// Inclusive year range, serialized as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 2]", into = "[i32; 2]")]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if `start > end`.
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_filter(format!(
                "year range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The full 1960 to 2025 window.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            start: FIRST_YEAR,
            end: LAST_YEAR,
        }
    }

    /// First year.
    #[must_use]
    pub const fn start(&self) -> i32 {
        self.start
    }

    /// Last year.
    #[must_use]
    pub const fn end(&self) -> i32 {
        self.end
    }

    /// Whether `year` lies inside the range.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Every year of the range in ascending order.
    #[must_use]
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

impl TryFrom<[i32; 2]> for YearRange {
    type Error = Error;

    fn try_from([start, end]: [i32; 2]) -> Result<Self> {
        Self::new(start, end)
    }
}

impl From<YearRange> for [i32; 2] {
    fn from(range: YearRange) -> Self {
        [range.start, range.end]
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Inclusive fatality range, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct FatalityRange {
    min: u32,
    max: u32,
}

impl FatalityRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(Error::invalid_filter(format!(
                "fatality range minimum {min} is above maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// `[0, max]`.
    #[must_use]
    pub const fn up_to(max: u32) -> Self {
        Self { min: 0, max }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether `count` lies inside the range.
    #[must_use]
    pub const fn contains(&self, count: u32) -> bool {
        self.min <= count && count <= self.max
    }
}

impl TryFrom<[u32; 2]> for FatalityRange {
    type Error = Error;

    fn try_from([min, max]: [u32; 2]) -> Result<Self> {
        Self::new(min, max)
    }
}

impl From<FatalityRange> for [u32; 2] {
    fn from(range: FatalityRange) -> Self {
        [range.min, range.max]
    }
}

/// How the accident map is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One marker per accident.
    #[default]
    Scatter,
    /// Fatality density.
    Heatmap,
    /// Cumulative frames, one per year.
    Animation,
}

impl ViewMode {
    /// All modes in selector order.
    pub const ALL: [ViewMode; 3] = [Self::Scatter, Self::Heatmap, Self::Animation];

    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Heatmap => "heatmap",
            Self::Animation => "animation",
        }
    }

    /// Label shown next to the selector.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Scatter => "Scatter Map",
            Self::Heatmap => "Heatmap",
            Self::Animation => "Time-Series Animation",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single control of the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// Main year slider.
    YearRange,
    /// Aircraft type multi-select.
    AircraftTypes,
    /// Fatality slider.
    FatalityRange,
    /// Map view selector.
    ViewMode,
    /// Card year dropdowns.
    CardYearRange,
}

/// A new value for one filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FilterChange {
    /// Main year slider moved.
    YearRange(YearRange),
    /// Aircraft selection changed; empty means every type.
    AircraftTypes(BTreeSet<String>),
    /// Fatality slider moved.
    FatalityRange(FatalityRange),
    /// Map view switched.
    ViewMode(ViewMode),
    /// Card year dropdowns changed.
    CardYearRange(YearRange),
}

impl FilterChange {
    /// The control this change targets.
    #[must_use]
    pub const fn field(&self) -> FilterField {
        match self {
            Self::YearRange(_) => FilterField::YearRange,
            Self::AircraftTypes(_) => FilterField::AircraftTypes,
            Self::FatalityRange(_) => FilterField::FatalityRange,
            Self::ViewMode(_) => FilterField::ViewMode,
            Self::CardYearRange(_) => FilterField::CardYearRange,
        }
    }
}

/// Everything the filter panel holds for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Main year slider.
    pub year_range: YearRange,
    /// Selected aircraft types; empty selects all.
    pub selected_types: BTreeSet<String>,
    /// Fatality slider.
    pub fatality_range: FatalityRange,
    /// Map view mode.
    pub view_mode: ViewMode,
    /// Card year dropdowns.
    pub card_year_range: YearRange,
}

impl FilterState {
    /// A state with no type selection and the scatter view.
    #[must_use]
    pub fn new(
        year_range: YearRange,
        fatality_range: FatalityRange,
        card_year_range: YearRange,
    ) -> Self {
        Self {
            year_range,
            selected_types: BTreeSet::new(),
            fatality_range,
            view_mode: ViewMode::default(),
            card_year_range,
        }
    }

    /// Apply one change. Returns `true` if the state actually changed.
    pub fn apply(&mut self, change: FilterChange) -> bool {
        match change {
            FilterChange::YearRange(range) => replace(&mut self.year_range, range),
            FilterChange::AircraftTypes(types) => replace(&mut self.selected_types, types),
            FilterChange::FatalityRange(range) => replace(&mut self.fatality_range, range),
            FilterChange::ViewMode(mode) => replace(&mut self.view_mode, mode),
            FilterChange::CardYearRange(range) => replace(&mut self.card_year_range, range),
        }
    }

    /// Whether `aircraft_type` passes the type selection.
    #[must_use]
    pub fn accepts_type(&self, aircraft_type: &str) -> bool {
        self.selected_types.is_empty() || self.selected_types.contains(aircraft_type)
    }

    /// Whether an accident passes the year, fatality and type filters.
    #[must_use]
    pub fn matches(&self, accident: &AccidentRecord) -> bool {
        self.year_range.contains(accident.year)
            && self.fatality_range.contains(accident.fatalities)
            && self.accepts_type(&accident.aircraft_type)
    }

    /// The accidents shown on the map.
    #[must_use]
    pub fn select_accidents<'a>(&self, rows: &'a [AccidentRecord]) -> Vec<&'a AccidentRecord> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    /// Controls whose value differs between `self` and `other`.
    #[must_use]
    pub fn diff(&self, other: &Self) -> BTreeSet<FilterField> {
        let mut fields = BTreeSet::new();
        if self.year_range != other.year_range {
            fields.insert(FilterField::YearRange);
        }
        if self.selected_types != other.selected_types {
            fields.insert(FilterField::AircraftTypes);
        }
        if self.fatality_range != other.fatality_range {
            fields.insert(FilterField::FatalityRange);
        }
        if self.view_mode != other.view_mode {
            fields.insert(FilterField::ViewMode);
        }
        if self.card_year_range != other.card_year_range {
            fields.insert(FilterField::CardYearRange);
        }
        fields
    }

    /// Check that both year ranges lie inside `window`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] naming the offending range.
    pub fn check_within(&self, window: YearRange) -> Result<()> {
        for (name, range) in [
            ("year range", self.year_range),
            ("card year range", self.card_year_range),
        ] {
            if !window.contains(range.start()) || !window.contains(range.end()) {
                return Err(Error::invalid_filter(format!(
                    "{name} {range} is outside {window}"
                )));
            }
        }
        Ok(())
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Partial filter values as they arrive from query strings or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterOverrides {
    /// Main year range start.
    pub year_start: Option<i32>,
    /// Main year range end.
    pub year_end: Option<i32>,
    /// Fatality range minimum.
    pub fatal_min: Option<u32>,
    /// Fatality range maximum.
    pub fatal_max: Option<u32>,
    /// Comma-separated aircraft types.
    pub types: Option<String>,
    /// Map view mode.
    pub view: Option<ViewMode>,
    /// Card range start.
    pub card_start: Option<i32>,
    /// Card range end.
    pub card_end: Option<i32>,
}

impl FilterOverrides {
    /// Fill the given fields over `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if a resulting range is inverted.
    pub fn apply_to(&self, base: &FilterState) -> Result<FilterState> {
        let year_range = YearRange::new(
            self.year_start.unwrap_or(base.year_range.start()),
            self.year_end.unwrap_or(base.year_range.end()),
        )?;
        let fatality_range = FatalityRange::new(
            self.fatal_min.unwrap_or(base.fatality_range.min()),
            self.fatal_max.unwrap_or(base.fatality_range.max()),
        )?;
        let card_year_range = YearRange::new(
            self.card_start.unwrap_or(base.card_year_range.start()),
            self.card_end.unwrap_or(base.card_year_range.end()),
        )?;
        let selected_types = match &self.types {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string)
                .collect(),
            None => base.selected_types.clone(),
        };

        Ok(FilterState {
            year_range,
            selected_types,
            fatality_range,
            view_mode: self.view.unwrap_or(base.view_mode),
            card_year_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> FilterState {
        FilterState::new(
            YearRange::full(),
            FatalityRange::up_to(583),
            YearRange::new(2010, 2025).unwrap(),
        )
    }

    #[test]
    fn test_year_range_rejects_inverted() {
        assert!(YearRange::new(2010, 2000).is_err());
        assert!(YearRange::new(2000, 2000).is_ok());
    }

    #[test]
    fn test_year_range_contains() {
        let range = YearRange::new(2000, 2010).unwrap();
        assert!(range.contains(2000));
        assert!(range.contains(2010));
        assert!(!range.contains(1999));
        assert!(!range.contains(2011));
        assert_eq!(range.years().count(), 11);
    }

    #[test]
    fn test_year_range_serde_shape() {
        let range: YearRange = serde_json::from_str("[1970, 1980]").unwrap();
        assert_eq!(range, YearRange::new(1970, 1980).unwrap());
        assert_eq!(serde_json::to_string(&range).unwrap(), "[1970,1980]");

        assert!(serde_json::from_str::<YearRange>("[1980, 1970]").is_err());
    }

    #[test]
    fn test_fatality_range() {
        let range = FatalityRange::new(10, 50).unwrap();
        assert!(range.contains(10));
        assert!(range.contains(50));
        assert!(!range.contains(51));
        assert!(FatalityRange::new(5, 1).is_err());
        assert!(serde_json::from_str::<FatalityRange>("[20000, 10000]").is_err());
    }

    #[test]
    fn test_view_mode_serde() {
        assert_eq!(
            serde_json::to_string(&ViewMode::Animation).unwrap(),
            "\"animation\""
        );
        let mode: ViewMode = serde_json::from_str("\"heatmap\"").unwrap();
        assert_eq!(mode, ViewMode::Heatmap);
        assert_eq!(ViewMode::default(), ViewMode::Scatter);
        assert_eq!(ViewMode::Animation.label(), "Time-Series Animation");
    }

    #[test]
    fn test_filter_change_wire_format() {
        let change: FilterChange =
            serde_json::from_str(r#"{"field": "year_range", "value": [2000, 2010]}"#).unwrap();
        assert_eq!(
            change,
            FilterChange::YearRange(YearRange::new(2000, 2010).unwrap())
        );
        assert_eq!(change.field(), FilterField::YearRange);

        let change: FilterChange =
            serde_json::from_str(r#"{"field": "aircraft_types", "value": ["A320"]}"#).unwrap();
        assert_eq!(change.field(), FilterField::AircraftTypes);
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut state = base();
        assert!(!state.apply(FilterChange::ViewMode(ViewMode::Scatter)));
        assert!(state.apply(FilterChange::ViewMode(ViewMode::Heatmap)));
        assert_eq!(state.view_mode, ViewMode::Heatmap);

        let same = state.year_range;
        assert!(!state.apply(FilterChange::YearRange(same)));
    }

    #[test]
    fn test_accepts_type() {
        let mut state = base();
        assert!(state.accepts_type("B737"));

        state.selected_types.insert("A320".to_string());
        assert!(state.accepts_type("A320"));
        assert!(!state.accepts_type("B737"));
    }

    #[test]
    fn test_diff_lists_changed_fields() {
        let state = base();
        assert!(state.diff(&state.clone()).is_empty());

        let mut other = state.clone();
        other.view_mode = ViewMode::Heatmap;
        other.fatality_range = FatalityRange::new(0, 50).unwrap();
        let fields: Vec<FilterField> = state.diff(&other).into_iter().collect();
        assert_eq!(fields, vec![FilterField::FatalityRange, FilterField::ViewMode]);
    }

    #[test]
    fn test_check_within_window() {
        let mut state = base();
        assert!(state.check_within(YearRange::full()).is_ok());

        state.card_year_range = YearRange::new(1950, 1970).unwrap();
        let err = state.check_within(YearRange::full()).unwrap_err();
        assert!(err.to_string().contains("card year range 1950-1970"));
    }

    #[test]
    fn test_overrides_fill_missing_from_base() {
        let overrides = FilterOverrides {
            year_start: Some(2000),
            year_end: Some(2010),
            fatal_max: Some(50),
            types: Some("A320, B737,,".to_string()),
            view: Some(ViewMode::Animation),
            ..FilterOverrides::default()
        };
        let state = overrides.apply_to(&base()).unwrap();

        assert_eq!(state.year_range, YearRange::new(2000, 2010).unwrap());
        assert_eq!(state.fatality_range, FatalityRange::new(0, 50).unwrap());
        assert_eq!(state.view_mode, ViewMode::Animation);
        assert_eq!(state.card_year_range, YearRange::new(2010, 2025).unwrap());
        assert_eq!(
            state.selected_types.iter().cloned().collect::<Vec<_>>(),
            vec!["A320".to_string(), "B737".to_string()]
        );
    }

    #[test]
    fn test_overrides_reject_inverted() {
        let overrides = FilterOverrides {
            fatal_min: Some(600),
            ..FilterOverrides::default()
        };
        let err = overrides.apply_to(&base()).unwrap_err();
        assert!(err.is_client_error());
    }
}
