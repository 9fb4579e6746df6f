use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use jobscope::cli::{Cli, OutputFormat};
use jobscope::data::cache;
use jobscope::report;
use jobscope::state::DashboardState;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let table = cache::listings(&cli.source)
        .with_context(|| format!("loading job listings from {}", cli.source.display()))?;

    let mut state = DashboardState::new(table);
    cli.apply(&mut state);
    let view = state.view();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => report::write_text(&mut out, &view)?,
        OutputFormat::Json => report::write_json(&mut out, &view)?,
    }
    out.flush()?;
    Ok(())
}
