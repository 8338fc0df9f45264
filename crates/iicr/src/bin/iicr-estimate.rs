use std::path::PathBuf;
use log::info;
use colored::*;
use clap::Parser;
use clap::ArgAction;
use anyhow::Result;
use anyhow::bail;

use iicr::cli_parsers::init_logging;
use iicr::parameters::Parameters;
use iicr::simulator::MsSimulator;
use iicr::pipeline::run_scenarios;
use iicr::pipeline::collect_curves;
use iicr::pipeline::configured_analytical_curves;
use iicr::plotting::plot_iicr;

#[derive(Debug, Parser)]
#[command(name = "iicr-estimate")]
#[command(author, version, about = "Estimate the IICR of ms scenarios from a parameter file")]
pub struct Cli {
    /// JSON parameter file.
    #[arg(value_name = "PARAMS", default_value = "parameters.json")]
    params: PathBuf,

    /// SVG output file.
    #[arg(short, long, value_name = "FILE", default_value = "iicr.svg")]
    output: PathBuf,

    /// Also write all curves (years, individuals) to this JSON file.
    #[arg(long, value_name = "FILE")]
    curves: Option<PathBuf>,

    /// Skip the plot.
    #[arg(long)]
    no_plot: bool,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let params = Parameters::from_file(&cli.params)?;
    let grid = params.time_grid()?;
    info!("Evaluating {} scenarios on {} time points", params.scenarios.len(), grid.len());

    let simulator = MsSimulator::new(&params.path2ms);
    let n0 = params.scale_params.n0;
    println!("Simulation progress:");
    let results = run_scenarios(&simulator, &params.scenarios, &grid, n0, true);

    let mut scenarios = Vec::new();
    for (scenario, result) in params.scenarios.iter().zip(results) {
        match result {
            Ok(res) => {
                println!("{} {}", res.label.yellow(), res.command.to_string().dimmed());
                println!(" - {} coalescence times, k = {}, IICR defined at {}/{} points",
                    res.observations.len(), res.sample_size,
                    res.curve.defined().count(), res.curve.len());
                match &res.history {
                    Some(history) => println!(" - {}", history),
                    None => println!(" - {}", "history not decoded".red()),
                }
                scenarios.push(res);
            }
            Err(e) => {
                eprintln!("{} {}: {:#}", "Failed:".red(), scenario.ms_command, e);
            }
        }
    }
    if scenarios.is_empty() {
        bail!("All {} scenarios failed", params.scenarios.len());
    }

    let analytical = configured_analytical_curves(&params);
    for a in &analytical {
        let limit = a.model.asymptotic_iicr()
            .map_or("undefined".to_string(), |l| format!("{:.4}", l));
        println!("{} asymptotic IICR {}", a.label.cyan(), limit.green());
    }

    if !cli.no_plot {
        plot_iicr(&params, &scenarios, &analytical, &cli.output)?;
        println!("Plot written to {}", cli.output.display().to_string().green());
    }

    if let Some(path) = &cli.curves {
        collect_curves(&params, &scenarios, &analytical).to_file(path)?;
        println!("Curves written to {}", path.display().to_string().green());
    }

    Ok(())
}
