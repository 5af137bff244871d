use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use sweepscope::config::AggregationConfig;
use sweepscope::data::model::TimeRange;
use sweepscope::data::source::FileSource;
use sweepscope::report;
use sweepscope::state::ChartState;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Peak tables per metric
    Text,
    /// The full aggregation result
    Json,
    /// Waterfall rows only
    Csv,
}

#[derive(Parser)]
#[command(name = "sweepscope")]
#[command(version, about = "Summarise spectrum sweeps for waterfall and level charts", long_about = None)]
struct Cli {
    /// Sweep batch file (.parquet, .json or .csv)
    input: PathBuf,

    /// JSON config file with `height` and `top_n`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of waterfall rows (overrides the config file)
    #[arg(long)]
    height: Option<usize>,

    /// Width of each peak list (overrides the config file)
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Start of the time range, ms since the epoch
    #[arg(long)]
    from: Option<i64>,

    /// End of the time range, ms since the epoch (inclusive)
    #[arg(long)]
    to: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AggregationConfig::from_json_file(path)?,
        None => AggregationConfig::default(),
    };
    if let Some(height) = cli.height {
        config = config.with_height(height);
    }
    if let Some(top_n) = cli.top_n {
        config = config.with_top_n(top_n);
    }

    let range = TimeRange::new(
        cli.from.unwrap_or(i64::MIN),
        cli.to.unwrap_or(i64::MAX),
    );

    let mut source = FileSource::new(&cli.input);
    let mut state = ChartState::new(config);
    state
        .run(&mut source, &range)
        .with_context(|| format!("summarising {}", cli.input.display()))?;

    let result = state
        .result()
        .context("no result was applied")?;

    match cli.format {
        Format::Text => print!("{}", report::format_text(result, state.axis())),
        Format::Json => println!("{}", report::to_json(result)?),
        Format::Csv => report::write_rows_csv(&result.rows, io::stdout().lock())?,
    }

    Ok(())
}
