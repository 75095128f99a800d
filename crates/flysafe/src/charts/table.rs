//! The most recent accidents table.

use super::figure::{Figure, Font, Layout, Line, Margin, Table, TableSection, BODY_FONT};
use crate::data::{in_years, AccidentRecord};
use crate::filter::YearRange;

/// Column headers.
pub const COLUMNS: [&str; 5] = ["Date", "Aircraft Type", "Operator", "Location", "Fatalities"];

const COLUMN_WIDTHS: [u32; 5] = [12, 20, 20, 38, 10];
const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// The `limit` latest accidents within `range`, newest first.
///
/// Accidents on the same date keep their file order.
#[must_use]
pub fn recent_accidents(
    accidents: &[AccidentRecord],
    range: YearRange,
    limit: usize,
) -> Vec<&AccidentRecord> {
    let mut rows: Vec<&AccidentRecord> = in_years(accidents, range).collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(limit);
    rows
}

fn section<V>(values: Vec<V>, family: &str, size: u32) -> TableSection<V> {
    TableSection {
        values,
        font: Font::new(family, size, "white"),
        align: "left".to_string(),
        height: 35,
        fill_color: TRANSPARENT.to_string(),
        line: Line {
            color: Some(TRANSPARENT.to_string()),
            width: Some(0.0),
        },
    }
}

/// Render `rows` as a five-column table.
#[must_use]
pub fn recent_table(rows: &[&AccidentRecord]) -> Figure {
    let mut columns: [Vec<String>; 5] = Default::default();
    for row in rows {
        columns[0].push(row.date.format("%Y-%m-%d").to_string());
        columns[1].push(row.aircraft_type.clone());
        columns[2].push(row.operator.clone());
        columns[3].push(row.location.clone());
        columns[4].push(row.fatalities.to_string());
    }

    let trace = Table {
        columnwidth: COLUMN_WIDTHS.to_vec(),
        header: section(
            COLUMNS.iter().map(ToString::to_string).collect(),
            "Roboto-Bold",
            16,
        ),
        cells: section(Vec::from(columns), "Roboto", 14),
    };

    let layout = Layout {
        font: Some(Font::new(BODY_FONT, 14, "white")),
        margin: Some(Margin::new(10, 10, 10, 10)),
        paper_bgcolor: Some("rgba(255, 255, 255, 0)".to_string()),
        plot_bgcolor: Some("rgba(255, 255, 255, 0)".to_string()),
        ..Layout::default()
    };
    Figure::single(trace, layout)
}
