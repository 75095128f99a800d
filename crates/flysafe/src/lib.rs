//! `flysafe` - Airplane accidents dashboard 1960-2025
//!
//! This library loads the accident, impact and major-accident tables once,
//! derives the lookups every chart needs and renders plotly-compatible
//! chart specifications for a given filter state. A small HTTP server keeps
//! one filter state per browser session and re-renders only the charts a
//! filter change affects.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod binder;
pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod logging;
pub mod server;

pub use binder::{Binder, ChartUpdate, Session, ViewSubscriber};
pub use charts::{render, ChartId, ChartOutput, Figure};
pub use config::Config;
pub use data::Dataset;
pub use error::{Error, Result};
pub use filter::{FatalityRange, FilterChange, FilterState, ViewMode, YearRange};
pub use logging::init_logging;
