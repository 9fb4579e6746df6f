use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::state::DashboardState;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Every output of the pass as JSON
    Json,
}

/// CLI arguments for jobscope
#[derive(Parser, Debug)]
#[command(name = "jobscope")]
#[command(version, about = "Explore job listings: filter, summarize, count tech keywords")]
#[command(long_about = r#"
Loads the job_listings table once, applies the filters, and prints the
summary metrics, top skills, salary series and tech keyword counts.

Without filter flags the defaults match the dashboard's initial controls:
every location selected and the salary floor at the lowest known salary.

Example:
  jobscope job.db
  jobscope jobs_data.csv -l Taipei -l Hsinchu --min-salary 60000 -k data
  jobscope --no-location-filter --min-salary 0 --format json
"#)]
pub struct Cli {
    /// Data source (.db, .sqlite, .csv, .json, .parquet)
    #[arg(env = "JOBSCOPE_DATA", default_value = "job.db")]
    pub source: PathBuf,

    /// Allowed locations (can be specified multiple times)
    #[arg(short, long = "location", value_name = "LOCATION")]
    pub locations: Vec<String>,

    /// Clear the location selection so no location restriction applies
    #[arg(long, conflicts_with = "locations")]
    pub no_location_filter: bool,

    /// Minimum average monthly salary; 0 disables the salary filter
    #[arg(short = 's', long, value_name = "NTD", value_parser = parse_salary)]
    pub min_salary: Option<f64>,

    /// Case-insensitive job title keyword
    #[arg(short, long, value_name = "TEXT")]
    pub keyword: Option<String>,

    /// Also print every column of every matching listing
    #[arg(short, long)]
    pub detailed: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Salary floors must be finite; NaN would hide every listing with a salary.
fn parse_salary(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("`{s}` is not a finite salary"))
    }
}

impl Cli {
    /// Push the flag values into the dashboard controls.
    pub fn apply(&self, state: &mut DashboardState) {
        if self.no_location_filter {
            state.select_no_locations();
        } else if !self.locations.is_empty() {
            state.set_locations(self.locations.iter().cloned());
        }
        if let Some(min_salary) = self.min_salary {
            state.set_min_salary(min_salary);
        }
        if let Some(keyword) = &self.keyword {
            state.set_keyword(keyword.clone());
        }
        state.set_detailed(self.detailed);
    }

    /// Default log level for the given verbosity, overridden by `RUST_LOG`.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
