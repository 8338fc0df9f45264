use log::info;
use colored::*;
use clap::Parser;
use clap::ArgAction;
use anyhow::Result;
use anyhow::bail;

use iicr::grid::TimeGrid;
use iicr::grid::DEFAULT_STEP;
use iicr::empirical::MS_TIME_SCALE;
use iicr::empirical::ExtractionMode;
use iicr::empirical::empirical_iicr;
use iicr::cli_parsers::init_logging;
use iicr::cli_parsers::GridParameters;
use iicr::input_parsers::read_observations_input;

#[derive(Debug, Parser)]
#[command(name = "iicr-extract")]
#[command(author, version, about = "Empirical IICR of simulator output")]
pub struct Cli {
    /// Simulator output file, or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Which times to read: "first" (trees of ms -T) or "pairwise" (time: lines).
    #[arg(short, long, default_value = "first")]
    mode: ExtractionMode,

    /// Number of sampled lineages k.
    #[arg(short = 'k', long, default_value_t = 2)]
    sample_size: usize,

    /// Factor applied to every time before estimation (ms: 4N0 -> 2N0 units).
    #[arg(long, default_value_t = MS_TIME_SCALE)]
    scale: f64,

    #[command(flatten, next_help_heading = "Time grid")]
    grid: GridParameters,

    /// Ignore the grid options and use 0, step, 2*step, ... up to the largest time.
    #[arg(long)]
    covering: bool,

    /// Step of the covering grid.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    step: f64,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.grid.validate()?;
    if !(cli.scale > 0.0) {
        bail!("scale ({}) must be positive", cli.scale);
    }

    let observations = read_observations_input(&cli.input, cli.mode)?.scaled(cli.scale)?;
    let grid = if cli.covering {
        TimeGrid::covering(observations.max().unwrap_or(0.0), cli.step)?
    } else {
        cli.grid.build()?
    };
    info!("{} coalescence times, {} grid points", observations.len(), grid.len());
    if let Some(max) = observations.max() {
        if max > grid.last() {
            info!("Largest time {:.4} lies beyond the grid end {:.4}", max, grid.last());
        }
    }

    let (distribution, curve) = empirical_iicr(&observations, &grid, cli.sample_size)?;

    println!("{}", format!("{:>12} {:>8} {:>12} {:>12}", "time", "cdf", "pdf", "iicr").yellow());
    for (i, &(t, rate)) in curve.points.iter().enumerate() {
        let pdf = distribution.pdf[i].map_or("-".to_string(), |p| format!("{:.4}", p));
        let rate = rate.map_or("-".red().to_string(), |r| format!("{:.6}", r).green().to_string());
        println!("{:>12.6} {:>8} {:>12} {:>12}", t, distribution.cdf[i], pdf, rate);
    }
    println!("{} observations, {} outside the grid", observations.len(),
        distribution.total - distribution.cdf.last().copied().unwrap_or(0));

    Ok(())
}
