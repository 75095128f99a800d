//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::charts::ChartId;
use crate::filter::{FilterOverrides, ViewMode};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides the configuration)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides the configuration)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Filter flags shared by the rendering commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// First year of the main year range
    #[arg(long)]
    pub year_start: Option<i32>,

    /// Last year of the main year range
    #[arg(long)]
    pub year_end: Option<i32>,

    /// Minimum fatalities
    #[arg(long)]
    pub fatal_min: Option<u32>,

    /// Maximum fatalities
    #[arg(long)]
    pub fatal_max: Option<u32>,

    /// Aircraft types to show (comma-separated; all when omitted)
    #[arg(short = 't', long = "types", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Map view mode
    #[arg(long, value_enum)]
    pub view: Option<ViewModeArg>,

    /// First year of the aircraft card range
    #[arg(long)]
    pub card_start: Option<i32>,

    /// Last year of the aircraft card range
    #[arg(long)]
    pub card_end: Option<i32>,
}

impl FilterArgs {
    /// Convert to the overrides applied over the default filters.
    #[must_use]
    pub fn to_overrides(&self) -> FilterOverrides {
        FilterOverrides {
            year_start: self.year_start,
            year_end: self.year_end,
            fatal_min: self.fatal_min,
            fatal_max: self.fatal_max,
            types: (!self.types.is_empty()).then(|| self.types.join(",")),
            view: self.view.map(Into::into),
            card_start: self.card_start,
            card_end: self.card_end,
        }
    }
}

/// Render command arguments.
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Chart to render
    #[arg(value_enum)]
    pub chart: ChartArg,

    /// Filter values
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Top aircraft command arguments.
#[derive(Debug, Args)]
pub struct TopCommand {
    /// First year (defaults to the configured card range)
    #[arg(long)]
    pub start: Option<i32>,

    /// Last year (defaults to the configured card range)
    #[arg(long)]
    pub end: Option<i32>,

    /// Number of aircraft types
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Recent accidents command arguments.
#[derive(Debug, Args)]
pub struct RecentCommand {
    /// First year
    #[arg(long)]
    pub start: Option<i32>,

    /// Last year
    #[arg(long)]
    pub end: Option<i32>,

    /// Number of accidents
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Summary command arguments.
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Chart argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartArg {
    /// Accident map
    Map,
    /// Accident to regulation flows
    Sankey,
    /// Accidents per year
    AnnualAccidents,
    /// Fatalities per year
    AnnualFatalities,
    /// Fatalities against capacity
    Capacity,
    /// Accident frequency per type and year
    Heatmap,
    /// Latest accidents table
    RecentAccidents,
    /// Top aircraft cards
    AircraftCards,
}

impl From<ChartArg> for ChartId {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Map => Self::Map,
            ChartArg::Sankey => Self::Sankey,
            ChartArg::AnnualAccidents => Self::AnnualAccidents,
            ChartArg::AnnualFatalities => Self::AnnualFatalities,
            ChartArg::Capacity => Self::Capacity,
            ChartArg::Heatmap => Self::Heatmap,
            ChartArg::RecentAccidents => Self::RecentAccidents,
            ChartArg::AircraftCards => Self::AircraftCards,
        }
    }
}

/// Map view argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewModeArg {
    /// One marker per accident
    Scatter,
    /// Fatality density
    Heatmap,
    /// Cumulative yearly frames
    Animation,
}

impl From<ViewModeArg> for ViewMode {
    fn from(arg: ViewModeArg) -> Self {
        match arg {
            ViewModeArg::Scatter => Self::Scatter,
            ViewModeArg::Heatmap => Self::Heatmap,
            ViewModeArg::Animation => Self::Animation,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_arg_conversion() {
        assert_eq!(ChartId::from(ChartArg::Map), ChartId::Map);
        assert_eq!(
            ChartId::from(ChartArg::AnnualFatalities),
            ChartId::AnnualFatalities
        );
        assert_eq!(
            ChartId::from(ChartArg::AircraftCards),
            ChartId::AircraftCards
        );
    }

    #[test]
    fn test_view_mode_arg_conversion() {
        assert_eq!(ViewMode::from(ViewModeArg::Scatter), ViewMode::Scatter);
        assert_eq!(ViewMode::from(ViewModeArg::Heatmap), ViewMode::Heatmap);
        assert_eq!(ViewMode::from(ViewModeArg::Animation), ViewMode::Animation);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_filter_args_to_overrides() {
        let args = FilterArgs {
            year_start: Some(2000),
            types: vec!["A320".to_string(), "B737".to_string()],
            view: Some(ViewModeArg::Heatmap),
            ..FilterArgs::default()
        };
        let overrides = args.to_overrides();
        assert_eq!(overrides.year_start, Some(2000));
        assert_eq!(overrides.year_end, None);
        assert_eq!(overrides.types.as_deref(), Some("A320,B737"));
        assert_eq!(overrides.view, Some(ViewMode::Heatmap));

        assert_eq!(FilterArgs::default().to_overrides(), FilterOverrides::default());
    }
}
