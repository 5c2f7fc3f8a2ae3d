//! Print the derived views for one parameter set as JSON.
//!
//! Usage:
//!   drom-views [--start YEAR] [--end YEAR] [--territory NAME]... [--focus AREA]...
//!              [--all] [--no-projections] [--params FILE] [--data FILE] [--pretty]
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=drom_indicators=debug`.

use std::path::PathBuf;

use clap::Parser;
use drom_indicators::{
    BuiltinSource, DataSource, FocusArea, IndicatorEngine, JsonSource, ViewParams, YearRange,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Derive DROM-COM tobacco indicator views", long_about = None)]
struct Cli {
    /// First year of the analysis period.
    #[arg(long)]
    start: Option<i32>,
    /// Last year of the analysis period.
    #[arg(long)]
    end: Option<i32>,
    /// Territory to include; repeat for several. Replaces the default selection.
    #[arg(long = "territory")]
    territories: Vec<String>,
    /// Focus area to derive; repeat for several. Replaces the default selection.
    #[arg(long = "focus")]
    focus: Vec<FocusArea>,
    /// Start from every view over every territory and year.
    #[arg(long)]
    all: bool,
    /// Skip target projections.
    #[arg(long)]
    no_projections: bool,
    /// JSON file with base view parameters; flags override its fields.
    #[arg(long)]
    params: Option<PathBuf>,
    /// JSON dataset bundle to load instead of the built-in data.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn view_params(&self) -> Result<ViewParams, Box<dyn std::error::Error>> {
        let mut params = match (&self.params, self.all) {
            (Some(path), _) => ViewParams::from_json(&std::fs::read_to_string(path)?)?,
            (None, true) => ViewParams::everything(),
            (None, false) => ViewParams::default(),
        };

        if self.start.is_some() || self.end.is_some() {
            let current = params.year_range.unwrap_or(YearRange { start: 2000, end: 2023 });
            params.year_range = Some(YearRange::new(
                self.start.unwrap_or(current.start),
                self.end.unwrap_or(current.end),
            )?);
        }
        if !self.territories.is_empty() {
            params.territory_filter = Some(self.territories.iter().cloned().collect());
        }
        if !self.focus.is_empty() {
            params.focus_areas = self.focus.iter().copied().collect();
        }
        if self.no_projections {
            params.show_projections = false;
        }
        Ok(params)
    }

    fn source(&self) -> Result<Box<dyn DataSource>, Box<dyn std::error::Error>> {
        Ok(match &self.data {
            Some(path) => Box::new(JsonSource::new(
                path.display().to_string(),
                std::fs::read_to_string(path)?,
            )),
            None => Box::new(BuiltinSource),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let params = cli.view_params()?;
    let engine = IndicatorEngine::from_source(cli.source()?.as_ref())?;
    info!(fingerprint = %engine.datasets().fingerprint()?, "engine ready");

    let views = engine.derive(&params)?;
    let out = if cli.pretty {
        serde_json::to_string_pretty(&views)?
    } else {
        serde_json::to_string(&views)?
    };
    println!("{out}");
    Ok(())
}
