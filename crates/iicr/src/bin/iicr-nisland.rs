use log::info;
use colored::*;
use clap::Parser;
use clap::ArgAction;
use anyhow::Result;
use anyhow::anyhow;

use iicr::models::IicrModel;
use iicr::models::SimulatorCommand;
use iicr::models::reconstruct;
use iicr::cli_parsers::init_logging;
use iicr::cli_parsers::GridParameters;
use iicr::cli_parsers::NIslandParameters;

#[derive(Debug, Parser)]
#[command(name = "iicr-nisland")]
#[command(author, version, about = "Analytical IICR of the symmetric n-island model")]
pub struct Cli {
    /// Take the model from an ms command with -I instead (e.g. "ms 2 100 -T -I 10 2 0 0 0 0 0 0 0 0 0 1.0").
    #[arg(long, value_name = "CMD")]
    ms_command: Option<String>,

    #[command(flatten, next_help_heading = "Island model")]
    islands: NIslandParameters,

    #[command(flatten, next_help_heading = "Time grid")]
    grid: GridParameters,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.grid.validate()?;

    let model = match &cli.ms_command {
        Some(cmd) => {
            let command = SimulatorCommand::from(cmd.as_str());
            reconstruct(&command, 1.0)?
                .island_model()?
                .ok_or_else(|| anyhow!("'{}' does not describe an island model", command))?
        }
        None => cli.islands.build_model()?,
    };
    let (alpha, beta) = model.eigenvalues();
    info!("alpha = {}, beta = {}", alpha, beta);

    println!("{}", format!("{} islands, M = {}, {}", model.n(), model.migration(),
        if model.same_island() { "same island" } else { "distinct islands" }).yellow());

    let grid = cli.grid.build()?;
    println!("{}", format!("{:>12} {:>12}", "time", "iicr").yellow());
    for (t, rate) in grid.iter().zip(model.iicr(&grid)) {
        let rate = rate.map_or("-".red().to_string(), |r| format!("{:.6}", r).green().to_string());
        println!("{:>12.6} {:>12}", t, rate);
    }
    if let Some(limit) = model.asymptotic_iicr() {
        println!("limit {:>12.6}", limit);
    }

    Ok(())
}
