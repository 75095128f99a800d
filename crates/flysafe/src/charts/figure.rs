//! A serde model of the plotly.js figure schema.
//!
//! Only the attributes the dashboard sets are modelled. Every optional
//! attribute is skipped when unset so the JSON stays close to what plotly
//! itself would emit.

use serde::Serialize;
use serde_json::Value;

/// Body font used across the dashboard.
pub const BODY_FONT: &str = "Roboto, sans-serif";

/// Title font used across the dashboard.
pub const TITLE_FONT: &str = "Roboto-Bold, sans-serif";

/// Title color of the white panels.
pub const TITLE_COLOR: &str = "#2f3e5c";

/// Primary series color.
pub const PURPLE: &str = "#8b52f7";

/// Secondary series color.
pub const ORANGE: &str = "#FF983D";

/// A complete chart: traces, layout and optional animation frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// Traces drawn on the chart.
    pub data: Vec<Trace>,
    /// Layout.
    pub layout: Layout,
    /// Animation frames.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

impl Figure {
    /// A figure with one trace.
    #[must_use]
    pub fn single(trace: impl Into<Trace>, layout: Layout) -> Self {
        Self {
            data: vec![trace.into()],
            layout,
            frames: Vec::new(),
        }
    }

    /// Number of plotted points (or cells, links, rows) over all traces.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.data.iter().map(Trace::point_count).sum()
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

/// One trace, tagged with its plotly `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    /// Cartesian line or marker series.
    Scatter(Scatter),
    /// Markers on a map.
    Scattermapbox(ScatterMapbox),
    /// Density on a map.
    Densitymapbox(DensityMapbox),
    /// Flow diagram.
    Sankey(Sankey),
    /// Cartesian heatmap.
    Heatmap(Heatmap),
    /// Table.
    Table(Table),
}

impl Trace {
    /// Number of plotted points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        match self {
            Self::Scatter(t) => t.x.len(),
            Self::Scattermapbox(t) => t.lat.len(),
            Self::Densitymapbox(t) => t.lat.len(),
            Self::Sankey(t) => t.link.source.len(),
            Self::Heatmap(t) => t.z.iter().map(Vec::len).sum(),
            Self::Table(t) => t.cells.values.first().map_or(0, Vec::len),
        }
    }
}

macro_rules! impl_into_trace {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Trace {
                fn from(trace: $ty) -> Self {
                    Self::$variant(trace)
                }
            }
        )*
    };
}

impl_into_trace!(
    Scatter => Scatter,
    ScatterMapbox => Scattermapbox,
    DensityMapbox => Densitymapbox,
    Sankey => Sankey,
    Heatmap => Heatmap,
    Table => Table,
);

/// Scalar or per-point numeric attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numbers {
    /// Same value for every point.
    Scalar(f64),
    /// One value per point.
    Each(Vec<f64>),
}

/// Fixed color or per-point color values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// A CSS color.
    Fixed(String),
    /// Values mapped through `colorscale`.
    Each(Vec<f64>),
}

/// Line styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    /// CSS color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl Line {
    /// A line of the given color.
    #[must_use]
    pub fn colored(color: &str) -> Self {
        Self {
            color: Some(color.to_string()),
            width: None,
        }
    }

    /// A line drawn with zero width.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            color: None,
            width: Some(0.0),
        }
    }
}

/// Marker styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    /// Marker size(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Numbers>,
    /// Marker color(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    /// Named plotly colorscale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    /// Show the color bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
    /// `area` or `diameter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemode: Option<String>,
    /// Size scaling factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizeref: Option<f64>,
    /// Outline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

/// Cartesian scatter trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scatter {
    /// X values.
    pub x: Vec<i64>,
    /// Y values.
    pub y: Vec<u64>,
    /// `lines`, `markers` or `lines+markers`.
    pub mode: String,
    /// Legend entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Line styling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    /// Marker styling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Hover text per point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    /// Hover content selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
}

/// Map marker trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScatterMapbox {
    /// Latitudes.
    pub lat: Vec<f64>,
    /// Longitudes.
    pub lon: Vec<f64>,
    /// Always `markers`.
    pub mode: String,
    /// Hover title per point.
    pub hovertext: Vec<String>,
    /// `[date, fatalities, location]` per point.
    pub customdata: Vec<(String, u32, String)>,
    /// Hover layout.
    pub hovertemplate: String,
    /// Marker styling.
    pub marker: Marker,
}

/// Map density trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DensityMapbox {
    /// Latitudes.
    pub lat: Vec<f64>,
    /// Longitudes.
    pub lon: Vec<f64>,
    /// Weight per point.
    pub z: Vec<u32>,
    /// Influence radius in pixels.
    pub radius: u32,
    /// Named plotly colorscale.
    pub colorscale: String,
}

/// Sankey trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sankey {
    /// Node attributes.
    pub node: SankeyNodeSpec,
    /// Link attributes.
    pub link: SankeyLinkSpec,
}

/// Sankey node attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyNodeSpec {
    /// Padding between nodes.
    pub pad: u32,
    /// Node width.
    pub thickness: u32,
    /// Node outline.
    pub line: Line,
    /// Node labels.
    pub label: Vec<String>,
    /// Node colors.
    pub color: Vec<String>,
    /// `[onboard, ground, total]` per node, `null` when not in view.
    pub customdata: Vec<Option<[u64; 3]>>,
    /// Hover layout.
    pub hovertemplate: String,
}

/// Sankey link attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyLinkSpec {
    /// Source node per link.
    pub source: Vec<usize>,
    /// Target node per link.
    pub target: Vec<usize>,
    /// Width per link.
    pub value: Vec<u64>,
    /// `[onboard, ground, total]` per link.
    pub customdata: Vec<[u64; 3]>,
    /// Hover layout.
    pub hovertemplate: String,
}

/// Cartesian heatmap trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    /// `z[row][column]`.
    pub z: Vec<Vec<u32>>,
    /// Column labels.
    pub x: Vec<i32>,
    /// Row labels.
    pub y: Vec<String>,
    /// `[position, color]` stops.
    pub colorscale: Vec<(f64, String)>,
    /// Color bar.
    pub colorbar: ColorBar,
    /// Hover layout.
    pub hovertemplate: String,
}

/// Color bar of a heatmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorBar {
    /// Bar title.
    pub title: Title,
}

/// Table trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// Relative column widths.
    pub columnwidth: Vec<u32>,
    /// Header row.
    pub header: TableSection<String>,
    /// Body, one vector per column.
    pub cells: TableSection<Vec<String>>,
}

/// Header or body of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableSection<V> {
    /// One entry per column.
    pub values: Vec<V>,
    /// Text font.
    pub font: Font,
    /// Text alignment.
    pub align: String,
    /// Row height.
    pub height: u32,
    /// Background.
    pub fill_color: String,
    /// Cell borders.
    pub line: Line,
}

/// Font settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Font {
    /// CSS font family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Size in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// CSS color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Font {
    /// The body font.
    #[must_use]
    pub fn body() -> Self {
        Self {
            family: Some(BODY_FONT.to_string()),
            ..Self::default()
        }
    }

    /// A font of the given family, size and color.
    #[must_use]
    pub fn new(family: &str, size: u32, color: &str) -> Self {
        Self {
            family: Some(family.to_string()),
            size: Some(size),
            color: Some(color.to_string()),
        }
    }
}

/// Chart or axis title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Title {
    /// Title text; plotly accepts `<br>`.
    pub text: String,
    /// Font.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// Horizontal position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Horizontal anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
}

impl Title {
    /// Plain text title.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    /// Left-aligned bold panel title.
    #[must_use]
    pub fn panel(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font: Some(Font::new(TITLE_FONT, 22, TITLE_COLOR)),
            x: Some(0.0),
            xanchor: Some("left".to_string()),
        }
    }
}

/// Plot margins in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Margin {
    /// Left.
    pub l: u32,
    /// Right.
    pub r: u32,
    /// Top.
    pub t: u32,
    /// Bottom.
    pub b: u32,
}

impl Margin {
    /// Margin from left, right, top, bottom.
    #[must_use]
    pub const fn new(l: u32, r: u32, t: u32, b: u32) -> Self {
        Self { l, r, t, b }
    }
}

/// Cartesian axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    /// Axis title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// `linear` for evenly spaced ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickmode: Option<String>,
    /// First tick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<i32>,
    /// Tick spacing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<i32>,
    /// Grid lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    /// Zero line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
}

impl Axis {
    /// Year axis with one tick per decade from 1960.
    #[must_use]
    pub fn decades(title: &str) -> Self {
        Self {
            title: Some(Title::text(title)),
            tickmode: Some("linear".to_string()),
            tick0: Some(crate::filter::FIRST_YEAR),
            dtick: Some(10),
            showgrid: Some(false),
            zeroline: Some(false),
        }
    }

    /// Titled axis with grid lines.
    #[must_use]
    pub fn gridded(title: &str) -> Self {
        Self {
            title: Some(Title::text(title)),
            showgrid: Some(true),
            ..Self::default()
        }
    }
}

/// Horizontal legend placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    /// `h` or `v`.
    pub orientation: String,
    /// Vertical anchor.
    pub yanchor: String,
    /// Vertical position.
    pub y: f64,
    /// Horizontal anchor.
    pub xanchor: String,
    /// Horizontal position.
    pub x: f64,
}

impl Legend {
    /// Centered horizontal legend below the plot.
    #[must_use]
    pub fn below() -> Self {
        Self {
            orientation: "h".to_string(),
            yanchor: "top".to_string(),
            y: -0.3,
            xanchor: "center".to_string(),
            x: 0.5,
        }
    }
}

/// Map viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mapbox {
    /// Base map style.
    pub style: String,
    /// Zoom level.
    pub zoom: f64,
    /// Initial center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLon>,
}

/// A map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Figure layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    /// Chart title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// Global font.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// Margins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    /// Map viewport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapbox: Option<Mapbox>,
    /// X axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    /// Y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    /// Show the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    /// Legend placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    /// Plot area background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    /// Figure background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    /// Keep user zoom across updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uirevision: Option<bool>,
    /// Animation slider.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<Slider>,
    /// Play and pause buttons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updatemenus: Vec<Value>,
}

impl Layout {
    /// White panel with a bold left-aligned title.
    #[must_use]
    pub fn panel(title: &str) -> Self {
        Self {
            title: Some(Title::panel(title)),
            font: Some(Font::new(BODY_FONT, 12, "black")),
            margin: Some(Margin::new(80, 50, 60, 30)),
            plot_bgcolor: Some("white".to_string()),
            paper_bgcolor: Some("white".to_string()),
            ..Self::default()
        }
    }

    /// Borderless map layout.
    #[must_use]
    pub fn map(mapbox: Mapbox) -> Self {
        Self {
            font: Some(Font::body()),
            margin: Some(Margin::default()),
            mapbox: Some(mapbox),
            uirevision: Some(false),
            ..Self::default()
        }
    }
}

/// One animation frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Frame key, also the slider label.
    pub name: String,
    /// Traces of this frame.
    pub data: Vec<Trace>,
}

/// Animation slider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    /// Index of the initially selected step.
    pub active: usize,
    /// Label prefix for the current value.
    pub currentvalue: Value,
    /// One step per frame.
    pub steps: Vec<SliderStep>,
}

/// A slider position bound to a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderStep {
    /// Text under the tick.
    pub label: String,
    /// Always `animate`.
    pub method: String,
    /// `[[frame], options]`.
    pub args: Value,
}
