mod error;
mod render;
mod table;

use std::io::{self, Read, Write};

use charming::HtmlRenderer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ChartError;

const CHART_WIDTH: u64 = 1600;
const CHART_HEIGHT: u64 = 1200;

fn main() -> Result<(), ChartError> {
    // The chart markup is the only thing on stdout, logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let table = table::parse(&input)?;
    info!(
        "Rendering {} series of {} points",
        table.series.len(),
        table.series[0].points.len()
    );

    let chart = render::build_chart(&table);
    let markup = HtmlRenderer::new("delivery rate", CHART_WIDTH, CHART_HEIGHT)
        .render(&chart)
        .map_err(|e| ChartError::Render(e.to_string()))?;
    io::stdout().write_all(markup.as_bytes())?;
    Ok(())
}
