//! `flysafe` - CLI for the airplane accidents dashboard
//!
//! This binary serves the dashboard over HTTP and renders individual charts
//! and listings from the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use flysafe::charts::{self, recent_accidents, ChartId};
use flysafe::cli::{
    Cli, Command, ConfigCommand, OutputFormat, RecentCommand, RenderCommand, ServeCommand,
    SummaryCommand, TopCommand,
};
use flysafe::data::top_aircraft;
use flysafe::{init_logging, Config, Dataset, YearRange};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, &cmd),
        Command::Render(cmd) => handle_render(&config, &cmd),
        Command::Top(cmd) => handle_top(&config, &cmd),
        Command::Recent(cmd) => handle_recent(&config, &cmd),
        Command::Summary(cmd) => handle_summary(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn load(config: &Config) -> anyhow::Result<Dataset> {
    Dataset::load(config).with_context(|| {
        format!(
            "failed to load data from {}",
            config.data.data_dir.display()
        )
    })
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(bind) = &cmd.bind {
        config.server.bind_address.clone_from(bind);
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    let dataset = load(&config)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(flysafe::server::serve(&config, dataset))?;
    Ok(())
}

fn handle_render(config: &Config, cmd: &RenderCommand) -> anyhow::Result<()> {
    let dataset = load(config)?;
    let filters = cmd.filters.to_overrides().apply_to(&dataset.default_filters())?;
    filters.check_within(dataset.window())?;

    let output = charts::render(ChartId::from(cmd.chart), &dataset, &filters);
    let json = if cmd.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

fn year_range(
    dataset: &Dataset,
    base: YearRange,
    start: Option<i32>,
    end: Option<i32>,
) -> anyhow::Result<YearRange> {
    let range = YearRange::new(start.unwrap_or(base.start()), end.unwrap_or(base.end()))?;
    let window = dataset.window();
    anyhow::ensure!(
        window.contains(range.start()) && window.contains(range.end()),
        "year range {range} is outside {window}"
    );
    Ok(range)
}

fn handle_top(config: &Config, cmd: &TopCommand) -> anyhow::Result<()> {
    let dataset = load(config)?;
    let range = year_range(
        &dataset,
        dataset.default_filters().card_year_range,
        cmd.start,
        cmd.end,
    )?;
    let limit = cmd.limit.unwrap_or(config.dashboard.top_aircraft);
    let stats = top_aircraft(dataset.cleaned(), range, limit);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            for stat in &stats {
                println!(
                    "{}\t{}\t{}",
                    stat.aircraft_type, stat.total_fatality_sum, stat.accident_count
                );
            }
        }
        OutputFormat::Table => {
            println!("Deadliest aircraft {range}");
            println!("{:<4} {:<24} {:>10} {:>9}", "#", "Aircraft", "Fatalities", "Accidents");
            for (i, stat) in stats.iter().enumerate() {
                println!(
                    "{:<4} {:<24} {:>10} {:>9}",
                    i + 1,
                    stat.aircraft_type,
                    stat.total_fatality_sum,
                    stat.accident_count
                );
            }
        }
    }
    Ok(())
}

fn handle_recent(config: &Config, cmd: &RecentCommand) -> anyhow::Result<()> {
    let dataset = load(config)?;
    let range = year_range(&dataset, dataset.window(), cmd.start, cmd.end)?;
    let limit = cmd.limit.unwrap_or(config.dashboard.recent_limit);
    let rows = recent_accidents(dataset.accidents(), range, limit);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.date, row.aircraft_type, row.operator, row.location, row.fatalities
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<10} {:<14} {:<24} {:<32} {:>10}",
                "Date", "Aircraft Type", "Operator", "Location", "Fatalities"
            );
            for row in &rows {
                println!(
                    "{:<10} {:<14} {:<24} {:<32} {:>10}",
                    row.date.format("%Y-%m-%d"),
                    row.aircraft_type,
                    row.operator,
                    row.location,
                    row.fatalities
                );
            }
        }
    }
    Ok(())
}

fn handle_summary(config: &Config, cmd: &SummaryCommand) -> anyhow::Result<()> {
    let dataset = load(config)?;
    let derived = dataset.derived();

    if cmd.json {
        let summary = serde_json::json!({
            "data_dir": config.data.data_dir,
            "window": dataset.window(),
            "tables": dataset.reports(),
            "aircraft_types": derived.aircraft_types.len(),
            "sankey_nodes": derived.nodes.len(),
            "max_fatalities": derived.max_fatalities,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("flysafe data summary");
        println!("--------------------");
        println!("Data directory: {}", config.data.data_dir.display());
        println!("Year window:    {}", dataset.window());
        println!();
        for report in dataset.reports() {
            println!(
                "{:<10} {:>6} rows, {:>6} kept, {:>4} bad date, {:>4} outside window",
                report.table, report.rows, report.accepted, report.bad_date, report.out_of_window
            );
        }
        println!();
        println!("Aircraft types: {}", derived.aircraft_types.len());
        println!("Sankey nodes:   {}", derived.nodes.len());
        println!("Max fatalities: {}", derived.max_fatalities);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Data]");
                println!("  Data directory:     {}", config.data.data_dir.display());
                println!("  Accidents:          {}", config.data.accidents_path().display());
                println!("  Impacts:            {}", config.data.impacts_path().display());
                println!("  Aggregates:         {}", config.data.aggregates_path().display());
                println!("  Assets:             {}", config.data.assets_path().display());
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!("  Port:               {}", config.server.port);
                println!("  Session idle:       {}s", config.server.session_idle_secs);
                println!();
                println!("[Dashboard]");
                println!(
                    "  Year window:        {}-{}",
                    config.dashboard.year_min, config.dashboard.year_max
                );
                println!(
                    "  Card years:         {}-{}",
                    config.dashboard.card_year_start, config.dashboard.card_year_end
                );
                println!("  Top aircraft:       {}", config.dashboard.top_aircraft);
                println!("  Recent accidents:   {}", config.dashboard.recent_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
