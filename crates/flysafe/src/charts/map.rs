//! The accident map in its three view modes.

use serde_json::json;

use super::figure::{
    ColorSpec, DensityMapbox, Figure, Frame, LatLon, Layout, Mapbox, Marker, Numbers,
    ScatterMapbox, Slider, SliderStep, Trace,
};
use crate::data::AccidentRecord;
use crate::filter::{ViewMode, YearRange};

const MAP_STYLE: &str = "carto-positron";
const MAX_MARKER_SIZE: f64 = 15.0;
const DENSITY_RADIUS: u32 = 30;

const HOVER: &str = "<b>%{hovertext}</b><br>date=%{customdata[0]}<br>\
fatalities=%{customdata[1]}<br>location=%{customdata[2]}<extra></extra>";

/// Draw `accidents` (already filtered) in the given mode.
///
/// `range` is only used by [`ViewMode::Animation`], which emits one
/// cumulative frame per year of the range.
#[must_use]
pub fn accident_map(accidents: &[&AccidentRecord], mode: ViewMode, range: YearRange) -> Figure {
    match mode {
        ViewMode::Scatter => scatter(accidents),
        ViewMode::Heatmap => density(accidents),
        ViewMode::Animation => animation(accidents, range),
    }
}

fn mapbox(center: Option<LatLon>) -> Mapbox {
    Mapbox {
        style: MAP_STYLE.to_string(),
        zoom: 1.0,
        center,
    }
}

fn geocoded<'a>(
    accidents: &'a [&'a AccidentRecord],
) -> impl Iterator<Item = (&'a AccidentRecord, (f64, f64))> + 'a {
    accidents
        .iter()
        .filter_map(|a| a.coordinates().map(|coords| (*a, coords)))
}

/// Markers sized and colored by fatalities.
///
/// Marker area scales so that the deadliest visible accident gets the
/// maximum size; `sizeref` stays at 1 when every count is zero.
fn markers<'a>(accidents: impl Iterator<Item = &'a AccidentRecord>) -> ScatterMapbox {
    let mut trace = ScatterMapbox {
        mode: "markers".to_string(),
        hovertemplate: HOVER.to_string(),
        ..ScatterMapbox::default()
    };
    let mut sizes = Vec::new();

    for accident in accidents {
        let Some((lat, lon)) = accident.coordinates() else {
            continue;
        };
        trace.lat.push(lat);
        trace.lon.push(lon);
        trace.hovertext.push(accident.aircraft_type.clone());
        trace.customdata.push((
            accident.date.format("%Y-%m-%d").to_string(),
            accident.fatalities,
            accident.location.clone(),
        ));
        sizes.push(f64::from(accident.fatalities));
    }

    let largest = sizes.iter().copied().fold(0.0_f64, f64::max);
    let sizeref = if largest > 0.0 {
        2.0 * largest / (MAX_MARKER_SIZE * MAX_MARKER_SIZE)
    } else {
        1.0
    };
    trace.marker = Marker {
        size: Some(Numbers::Each(sizes.clone())),
        color: Some(ColorSpec::Each(sizes)),
        colorscale: Some("Plasma".to_string()),
        showscale: Some(true),
        sizemode: Some("area".to_string()),
        sizeref: Some(sizeref),
        line: None,
    };
    trace
}

fn scatter(accidents: &[&AccidentRecord]) -> Figure {
    Figure::single(
        markers(accidents.iter().copied()),
        Layout::map(mapbox(None)),
    )
}

fn density(accidents: &[&AccidentRecord]) -> Figure {
    let mut trace = DensityMapbox {
        radius: DENSITY_RADIUS,
        colorscale: "Hot".to_string(),
        ..DensityMapbox::default()
    };
    for (accident, (lat, lon)) in geocoded(accidents) {
        trace.lat.push(lat);
        trace.lon.push(lon);
        trace.z.push(accident.fatalities);
    }

    Figure::single(
        trace,
        Layout::map(mapbox(Some(LatLon { lat: 0.0, lon: 0.0 }))),
    )
}

fn animation(accidents: &[&AccidentRecord], range: YearRange) -> Figure {
    let frames: Vec<Frame> = range
        .years()
        .map(|year| Frame {
            name: year.to_string(),
            data: vec![Trace::from(markers(
                accidents.iter().copied().filter(|a| a.year <= year),
            ))],
        })
        .collect();

    let steps = frames
        .iter()
        .map(|frame| SliderStep {
            label: frame.name.clone(),
            method: "animate".to_string(),
            args: json!([
                [frame.name],
                {"mode": "immediate", "frame": {"duration": 0, "redraw": true}, "transition": {"duration": 0}}
            ]),
        })
        .collect();

    let mut layout = Layout::map(mapbox(None));
    layout.sliders = vec![Slider {
        active: 0,
        currentvalue: json!({"prefix": "year_str="}),
        steps,
    }];
    layout.updatemenus = vec![json!({
        "type": "buttons",
        "showactive": false,
        "buttons": [
            {"label": "Play", "method": "animate",
             "args": [null, {"frame": {"duration": 500, "redraw": true}, "fromcurrent": true}]},
            {"label": "Pause", "method": "animate",
             "args": [[null], {"mode": "immediate", "frame": {"duration": 0, "redraw": false}}]}
        ]
    })];

    let data = frames
        .first()
        .map_or_else(|| vec![Trace::from(markers(std::iter::empty()))], |f| f.data.clone());

    Figure {
        data,
        layout,
        frames,
    }
}
