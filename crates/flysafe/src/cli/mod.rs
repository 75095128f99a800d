//! Command-line interface for flysafe.
//!
//! This module provides the CLI structure for the `flysafe` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    ChartArg, ConfigCommand, FilterArgs, OutputFormat, RecentCommand, RenderCommand,
    ServeCommand, SummaryCommand, TopCommand, ViewModeArg,
};

/// flysafe - Airplane accidents dashboard 1960-2025
///
/// Loads the accident tables once and serves interactive charts over HTTP,
/// or renders them to JSON on the command line.
#[derive(Debug, Parser)]
#[command(name = "flysafe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard over HTTP
    Serve(ServeCommand),

    /// Render one chart as plotly JSON
    Render(RenderCommand),

    /// List the deadliest aircraft types for a year range
    Top(TopCommand),

    /// List the most recent accidents
    Recent(RecentCommand),

    /// Show what was loaded from the data files
    Summary(SummaryCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Summary(SummaryCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "flysafe");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["flysafe", "serve", "--port", "9000"]).unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.port, Some(9000));
        assert_eq!(serve.bind, None);
    }

    #[test]
    fn test_parse_render_with_filters() {
        let cli = Cli::try_parse_from([
            "flysafe",
            "render",
            "annual-fatalities",
            "--fatal-max",
            "50",
            "--types",
            "A320,B737",
            "--view",
            "animation",
        ])
        .unwrap();
        let Command::Render(render) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(render.chart, ChartArg::AnnualFatalities);
        assert_eq!(render.filters.fatal_max, Some(50));
        assert_eq!(render.filters.types, vec!["A320", "B737"]);
        assert_eq!(render.filters.view, Some(ViewModeArg::Animation));
        assert!(!render.pretty);
    }

    #[test]
    fn test_parse_top_and_recent() {
        let cli = Cli::try_parse_from(["flysafe", "top", "--start", "2000", "-n", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Top(TopCommand {
                start: Some(2000),
                limit: Some(5),
                ..
            })
        ));

        let cli = Cli::try_parse_from(["flysafe", "recent", "-f", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Recent(RecentCommand {
                format: OutputFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["flysafe", "config", "validate", "-f", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["flysafe", "-c", "/custom/config.toml", "-vv", "summary"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["flysafe", "summary", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
