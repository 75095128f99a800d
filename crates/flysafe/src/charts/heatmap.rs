//! Accident frequency per aircraft type and year.

use super::figure::{Axis, ColorBar, Figure, Heatmap, Layout, Title};
use crate::data::HeatmapGrid;

/// Title of the heatmap panel.
pub const TITLE: &str = "Aircraft Accidents Frequency (Major Commercial Models)";

/// Render the static heatmap of the cleaned table.
#[must_use]
pub fn heatmap(grid: &HeatmapGrid) -> Figure {
    let trace = Heatmap {
        z: grid.counts.clone(),
        x: grid.years.clone(),
        y: grid.types.clone(),
        colorscale: vec![
            (0.0, "rgba(139,52,255,0)".to_string()),
            (1.0, "rgba(139,52,255,1)".to_string()),
        ],
        colorbar: ColorBar {
            title: Title::text("Accident Count"),
        },
        hovertemplate: "Year: %{x}<br>Aircraft: %{y}<br>Accidents: %{z}<extra></extra>"
            .to_string(),
    };

    let layout = Layout {
        xaxis: Some(Axis::decades("Year")),
        yaxis: Some(Axis::gridded("Aircraft Type")),
        showlegend: Some(false),
        ..Layout::panel(TITLE)
    };
    Figure::single(trace, layout)
}
