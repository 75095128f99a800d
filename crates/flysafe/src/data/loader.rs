//! CSV loading for the three input tables.
//!
//! Loading is lenient per row and strict per file: a row whose date cannot be
//! parsed or whose year falls outside the window is dropped and counted in
//! the [`LoadReport`], while a missing file or a header without the key
//! columns aborts the whole load.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder};
use serde::Serialize;
use tracing::debug;

use super::{AccidentRecord, CleanedRecord, ImpactRecord};
use crate::error::{Error, Result};
use crate::filter::YearRange;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
];

/// Row statistics for one loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Table name.
    pub table: &'static str,
    /// Data rows read.
    pub rows: usize,
    /// Rows kept.
    pub accepted: usize,
    /// Rows dropped because the date did not parse.
    pub bad_date: usize,
    /// Rows dropped because the year is outside the window.
    pub out_of_window: usize,
}

impl LoadReport {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            rows: 0,
            accepted: 0,
            bad_date: 0,
            out_of_window: 0,
        }
    }

    /// Rows dropped for any reason.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.bad_date + self.out_of_window
    }

    fn log(&self) {
        debug!(
            table = self.table,
            rows = self.rows,
            accepted = self.accepted,
            bad_date = self.bad_date,
            out_of_window = self.out_of_window,
            "table loaded"
        );
    }
}

/// Header positions of one table.
struct Columns {
    table: &'static str,
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(table: &'static str, headers: &ByteRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (decode(name).trim().to_string(), i))
            .collect();
        Self { table, index }
    }

    fn require(&self, column: &'static str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or(Error::MissingColumn {
                table: self.table,
                column,
            })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }
}

/// Decode a field as UTF-8, falling back to ISO-8859-1.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn field(record: &ByteRecord, column: Option<usize>) -> Cow<'_, str> {
    column
        .and_then(|i| record.get(i))
        .map_or(Cow::Borrowed(""), |bytes| match decode(bytes) {
            Cow::Borrowed(text) => Cow::Borrowed(text.trim()),
            Cow::Owned(text) => Cow::Owned(text.trim().to_string()),
        })
}

/// Parse a date in any of the formats found in the source tables.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Parse a count; missing, negative or non-numeric values become 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

/// Parse an optional non-negative integer such as a seat capacity.
#[must_use]
pub fn parse_optional_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(parse_count(raw)),
        _ => None,
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split a `|`-delimited tag list, keeping first occurrences only.
#[must_use]
pub fn parse_impacts(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split('|').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|seen| seen == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Shared per-row date handling. Returns the date and year, or records why
/// the row is dropped.
fn dated(raw: &str, window: YearRange, report: &mut LoadReport) -> Option<(NaiveDate, i32)> {
    report.rows += 1;
    let Some(date) = parse_date(raw) else {
        report.bad_date += 1;
        return None;
    };
    let year = date.year();
    if !window.contains(year) {
        report.out_of_window += 1;
        return None;
    }
    report.accepted += 1;
    Some((date, year))
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(input)
}

/// Load geocoded accident records.
///
/// # Errors
///
/// Returns an error if the header lacks `date` or `type`, or on read failure.
pub fn load_accidents<R: Read>(
    input: R,
    window: YearRange,
) -> Result<(Vec<AccidentRecord>, LoadReport)> {
    let mut rdr = reader(input);
    let cols = Columns::from_headers("accidents", rdr.byte_headers()?);
    let date = cols.require("date")?;
    let kind = cols.require("type")?;
    let operator = cols.optional("operator");
    let location = cols.optional("location");
    let lat = cols.optional("Latitude");
    let lon = cols.optional("Longitude");
    let fatal = cols.optional("total fatality");

    let mut report = LoadReport::new("accidents");
    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        let record = record?;
        let Some((date, year)) = dated(&field(&record, Some(date)), window, &mut report) else {
            continue;
        };
        rows.push(AccidentRecord {
            date,
            year,
            aircraft_type: field(&record, Some(kind)).into_owned(),
            operator: field(&record, operator).into_owned(),
            location: field(&record, location).into_owned(),
            latitude: parse_coordinate(&field(&record, lat)),
            longitude: parse_coordinate(&field(&record, lon)),
            fatalities: parse_count(&field(&record, fatal)),
        });
    }
    report.log();
    Ok((rows, report))
}

/// Load accident to regulation impact records.
///
/// # Errors
///
/// Returns an error if the header lacks `date`, `type`, `operator` or
/// `impact`, or on read failure.
pub fn load_impacts<R: Read>(
    input: R,
    window: YearRange,
) -> Result<(Vec<ImpactRecord>, LoadReport)> {
    let mut rdr = reader(input);
    let cols = Columns::from_headers("impacts", rdr.byte_headers()?);
    let date = cols.require("date")?;
    let kind = cols.require("type")?;
    let operator = cols.require("operator")?;
    let impact = cols.require("impact")?;
    let onboard = cols.optional("onboard fatality");
    let ground = cols.optional("ground fatality");
    let total = cols.optional("total fatality");

    let mut report = LoadReport::new("impacts");
    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        let record = record?;
        let Some((date, year)) = dated(&field(&record, Some(date)), window, &mut report) else {
            continue;
        };
        rows.push(ImpactRecord {
            date,
            year,
            aircraft_type: field(&record, Some(kind)).into_owned(),
            operator: field(&record, Some(operator)).into_owned(),
            onboard_fatality: parse_count(&field(&record, onboard)),
            ground_fatality: parse_count(&field(&record, ground)),
            total_fatality: parse_count(&field(&record, total)),
            impacts: parse_impacts(&field(&record, Some(impact))),
        });
    }
    report.log();
    Ok((rows, report))
}

/// Load the cleaned major-accident records.
///
/// # Errors
///
/// Returns an error if the header lacks `acc. date` or `type`, or on read
/// failure.
pub fn load_cleaned<R: Read>(
    input: R,
    window: YearRange,
) -> Result<(Vec<CleanedRecord>, LoadReport)> {
    let mut rdr = reader(input);
    let cols = Columns::from_headers("aggregates", rdr.byte_headers()?);
    let date = cols.require("acc. date")?;
    let kind = cols.require("type")?;
    let total = cols.optional("Total Fatality");
    let capacity = cols.optional("capacity");

    let mut report = LoadReport::new("aggregates");
    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        let record = record?;
        let Some((date, year)) = dated(&field(&record, Some(date)), window, &mut report) else {
            continue;
        };
        rows.push(CleanedRecord {
            date,
            year,
            aircraft_type: field(&record, Some(kind)).into_owned(),
            total_fatality: parse_optional_count(&field(&record, total)),
            capacity: parse_optional_count(&field(&record, capacity)),
        });
    }
    report.log();
    Ok((rows, report))
}

fn open(path: &Path) -> Result<File> {
    if !path.is_file() {
        return Err(Error::DataFileMissing {
            path: path.to_path_buf(),
        });
    }
    Ok(File::open(path)?)
}

fn with_path<T>(path: &Path, result: Result<T>) -> Result<T> {
    result.map_err(|err| match err {
        Error::Csv(source) => Error::data_read(path, source),
        other => other,
    })
}

/// [`load_accidents`] from a file path.
///
/// # Errors
///
/// Returns [`Error::DataFileMissing`] if the file does not exist, otherwise as
/// [`load_accidents`].
pub fn load_accidents_file(
    path: impl AsRef<Path>,
    window: YearRange,
) -> Result<(Vec<AccidentRecord>, LoadReport)> {
    let path = path.as_ref();
    debug!("Reading accidents from {}", path.display());
    with_path(path, load_accidents(open(path)?, window))
}

/// [`load_impacts`] from a file path.
///
/// # Errors
///
/// Returns [`Error::DataFileMissing`] if the file does not exist, otherwise as
/// [`load_impacts`].
pub fn load_impacts_file(
    path: impl AsRef<Path>,
    window: YearRange,
) -> Result<(Vec<ImpactRecord>, LoadReport)> {
    let path = path.as_ref();
    debug!("Reading impacts from {}", path.display());
    with_path(path, load_impacts(open(path)?, window))
}

/// [`load_cleaned`] from a file path.
///
/// # Errors
///
/// Returns [`Error::DataFileMissing`] if the file does not exist, otherwise as
/// [`load_cleaned`].
pub fn load_cleaned_file(
    path: impl AsRef<Path>,
    window: YearRange,
) -> Result<(Vec<CleanedRecord>, LoadReport)> {
    let path = path.as_ref();
    debug!("Reading cleaned records from {}", path.display());
    with_path(path, load_cleaned(open(path)?, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2001, 9, 11).unwrap();
        for raw in [
            "2001-09-11",
            "2001/09/11",
            "09/11/2001",
            "11-Sep-2001",
            "11 Sep 2001",
            "Sep 11, 2001",
            "11 September 2001",
            "2001-09-11 08:46:00",
            "2001-09-11 08:46",
            "2001-09-11T08:46:00",
            "2001-09-11T08:46",
            "09/11/2001 08:46",
            " 2001-09-11 ",
        ] {
            assert_eq!(parse_date(raw), Some(expected), "format {raw:?}");
        }
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("unknown"), None);
        assert_eq!(parse_date("2001-13-45"), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("228"), 228);
        assert_eq!(parse_count("12.0"), 12);
        assert_eq!(parse_count("7.9"), 7);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("NaN"), 0);
    }

    #[test]
    fn test_parse_optional_count() {
        assert_eq!(parse_optional_count("180"), Some(180));
        assert_eq!(parse_optional_count(""), None);
        assert_eq!(parse_optional_count("unknown"), None);
    }

    #[test]
    fn test_parse_impacts() {
        assert_eq!(
            parse_impacts(" Pitot tubes | Crew training||Pitot tubes "),
            vec!["Pitot tubes".to_string(), "Crew training".to_string()]
        );
        assert!(parse_impacts("").is_empty());
        assert!(parse_impacts(" | ").is_empty());
    }

    #[test]
    fn test_load_accidents_drops_bad_rows() {
        let (rows, report) =
            load_accidents(fixtures::ACCIDENTS_CSV.as_bytes(), YearRange::full()).unwrap();

        assert_eq!(report.rows, fixtures::ACCIDENT_ROWS);
        assert_eq!(report.bad_date, 1);
        assert_eq!(report.out_of_window, 1);
        assert_eq!(report.accepted, rows.len());
        assert_eq!(report.dropped(), 2);
        assert!(rows.iter().all(|r| YearRange::full().contains(r.year)));
    }

    #[test]
    fn test_load_accidents_defaults_missing_fatalities() {
        let (rows, _) =
            load_accidents(fixtures::ACCIDENTS_CSV.as_bytes(), YearRange::full()).unwrap();
        let unknown = rows
            .iter()
            .find(|r| r.operator == "Private")
            .expect("fixture row");
        assert_eq!(unknown.fatalities, 0);
        assert_eq!(unknown.coordinates(), None);
    }

    #[test]
    fn test_load_accidents_requires_date_column() {
        let csv = "when,type\n2001-01-01,A320\n";
        let err = load_accidents(csv.as_bytes(), YearRange::full()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                table: "accidents",
                column: "date"
            }
        ));
    }

    #[test]
    fn test_load_impacts_latin1_fallback() {
        let mut csv = b"date,type,operator,total fatality,impact\n".to_vec();
        csv.extend_from_slice(b"1994-09-08,B737,US Air,132,Rudder \xe9valuation|Crew\n");

        let (rows, report) = load_impacts(csv.as_slice(), YearRange::full()).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(rows[0].impacts[0], "Rudder \u{e9}valuation");
        assert_eq!(rows[0].impacts[1], "Crew");
        assert_eq!(rows[0].onboard_fatality, 0);
        assert_eq!(rows[0].total_fatality, 132);
    }

    #[test]
    fn test_load_cleaned_capacity() {
        let (rows, _) =
            load_cleaned(fixtures::CLEANED_CSV.as_bytes(), YearRange::full()).unwrap();
        assert!(rows.iter().any(|r| r.capacity.is_none()));
        assert!(rows.iter().any(|r| r.capacity == Some(303)));
    }

    #[test]
    fn test_load_cleaned_blank_fatality() {
        let csv = "\
acc. date,type,Total Fatality,capacity
2014-03-08,B777,,239
2014-07-17,B777,298,298
";
        let (rows, _) = load_cleaned(csv.as_bytes(), YearRange::full()).unwrap();
        assert_eq!(rows[0].total_fatality, None);
        assert_eq!(rows[0].fatalities(), 0);
        assert_eq!(rows[1].total_fatality, Some(298));
    }

    #[test]
    fn test_window_narrowing() {
        let window = YearRange::new(2000, 2010).unwrap();
        let (rows, report) = load_accidents(fixtures::ACCIDENTS_CSV.as_bytes(), window).unwrap();
        assert!(rows.iter().all(|r| (2000..=2010).contains(&r.year)));
        assert!(report.out_of_window > 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_accidents_file("/nonexistent/accidents.csv", YearRange::full()).unwrap_err();
        assert!(matches!(err, Error::DataFileMissing { .. }));
        assert!(err.to_string().contains("/nonexistent/accidents.csv"));
    }
}
