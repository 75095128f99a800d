//! Year-indexed line and scatter charts.

use std::collections::BTreeMap;

use super::figure::{
    Axis, ColorSpec, Figure, Font, Layout, Legend, Line, Margin, Marker, Numbers, Scatter, ORANGE,
    PURPLE,
};
use crate::data::{AccidentRecord, AggregateRecord, CleanedRecord};
use crate::filter::FatalityRange;

/// Divisor from fatalities to capacity marker size.
pub const CAPACITY_MARKER_DIVISOR: f64 = 20.0;

fn line_trace(name: &str, color: &str, points: impl Iterator<Item = (i32, u64)>) -> Scatter {
    let (x, y) = points.map(|(year, value)| (i64::from(year), value)).unzip();
    Scatter {
        x,
        y,
        mode: "lines+markers".to_string(),
        name: Some(name.to_string()),
        line: Some(Line::colored(color)),
        marker: Some(Marker {
            size: Some(Numbers::Scalar(4.0)),
            ..Marker::default()
        }),
        ..Scatter::default()
    }
}

fn annual_layout(title: &str) -> Layout {
    Layout {
        showlegend: Some(true),
        legend: Some(Legend::below()),
        ..Layout::panel(title)
    }
}

fn per_year(accidents: &[AccidentRecord], fatalities: FatalityRange) -> BTreeMap<i32, (u64, u64)> {
    let mut years: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for accident in accidents
        .iter()
        .filter(|a| fatalities.contains(a.fatalities))
    {
        let entry = years.entry(accident.year).or_default();
        entry.0 += 1;
        entry.1 += u64::from(accident.fatalities);
    }
    years
}

/// Number of accidents per year within the fatality range.
#[must_use]
pub fn annual_accidents(accidents: &[AccidentRecord], fatalities: FatalityRange) -> Figure {
    let years = per_year(accidents, fatalities);
    Figure::single(
        line_trace(
            "Accidents per Year",
            PURPLE,
            years.into_iter().map(|(year, (count, _))| (year, count)),
        ),
        annual_layout("Annual Accidents"),
    )
}

/// Sum of fatalities per year within the fatality range.
#[must_use]
pub fn annual_fatalities(accidents: &[AccidentRecord], fatalities: FatalityRange) -> Figure {
    let years = per_year(accidents, fatalities);
    Figure::single(
        line_trace(
            "Fatalities per Year",
            ORANGE,
            years.into_iter().map(|(year, (_, sum))| (year, sum)),
        ),
        annual_layout("Annual Fatalities"),
    )
}

/// Major accidents with a known capacity, sized and colored by fatalities.
#[must_use]
pub fn capacity(cleaned: &[CleanedRecord], fatalities: FatalityRange) -> Figure {
    let mut trace = Scatter {
        mode: "markers".to_string(),
        hoverinfo: Some("text".to_string()),
        ..Scatter::default()
    };
    let mut sizes = Vec::new();
    let mut colors = Vec::new();
    let mut text = Vec::new();

    for row in cleaned {
        let (Some(fatal), Some(seats)) = (row.total_fatality, row.capacity) else {
            continue;
        };
        if !fatalities.contains(fatal) {
            continue;
        }
        trace.x.push(i64::from(row.year));
        trace.y.push(u64::from(seats));
        sizes.push(f64::from(fatal) / CAPACITY_MARKER_DIVISOR);
        colors.push(f64::from(fatal));
        text.push(format!("{}<br>Fatalities: {fatal}", row.aircraft_type));
    }

    trace.marker = Some(Marker {
        size: Some(Numbers::Each(sizes)),
        color: Some(ColorSpec::Each(colors)),
        colorscale: Some("Plasma".to_string()),
        showscale: Some(true),
        line: Some(Line::hidden()),
        ..Marker::default()
    });
    trace.text = Some(text);

    let layout = Layout {
        xaxis: Some(Axis::decades("Year")),
        yaxis: Some(Axis::gridded("Aircraft Capacity")),
        showlegend: Some(false),
        ..Layout::panel("Major Accidents: Fatalities vs. Capacity")
    };
    Figure::single(trace, layout)
}

fn card_layout(top: u32) -> Layout {
    Layout {
        font: Some(Font::body()),
        margin: Some(Margin::new(25, 25, top, 15)),
        showlegend: Some(true),
        legend: Some(Legend::below()),
        plot_bgcolor: Some("white".to_string()),
        ..Layout::default()
    }
}

/// Card mini-chart of fatalities per year.
#[must_use]
pub fn card_fatalities(series: &[AggregateRecord]) -> Figure {
    let mut trace = line_trace(
        "Fatalities",
        PURPLE,
        series.iter().map(|r| (r.year, r.total_fatality_sum)),
    );
    trace.marker = None;
    Figure::single(trace, card_layout(45))
}

/// Card mini-chart of accidents per year.
#[must_use]
pub fn card_accidents(series: &[AggregateRecord]) -> Figure {
    let mut trace = line_trace(
        "Accidents",
        ORANGE,
        series.iter().map(|r| (r.year, r.accident_count as u64)),
    );
    trace.marker = None;
    Figure::single(trace, card_layout(15))
}
