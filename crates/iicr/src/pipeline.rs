use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use iicr_grid::TimeGrid;
use iicr_empirical::MS_TIME_SCALE;
use iicr_empirical::ExtractionMode;
use iicr_empirical::ObservationSet;
use iicr_empirical::EmpiricalDistribution;
use iicr_empirical::IICRCurve;
use iicr_empirical::CurveCollection;
use iicr_empirical::extract;
use iicr_empirical::empirical_iicr;
use iicr_models::IicrModel;
use iicr_models::NIslandModel;
use iicr_models::SimulatorCommand;
use iicr_models::DemographicModel;
use iicr_models::reconstruct;

use crate::parameters::{NIslandCurve, Parameters, Scenario, Style};
use crate::simulator::CoalescentSimulator;

/// Everything computed for one scenario. Times are in units of 2N0
/// generations, rates in units of 2N0.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub label: String,
    pub style: Style,
    pub command: SimulatorCommand,
    pub sample_size: usize,
    pub observations: ObservationSet,
    pub distribution: EmpiricalDistribution,
    pub curve: IICRCurve,
    /// `None` if the command could not be decoded.
    pub history: Option<DemographicModel>,
}

/// An analytical n-island curve ready to plot.
#[derive(Debug, Clone)]
pub struct AnalyticalResult {
    pub label: String,
    pub style: Style,
    pub model: NIslandModel,
    pub curve: IICRCurve,
}

/// Label shown for a scenario, the command itself if none was given.
pub fn scenario_label(scenario: &Scenario) -> String {
    if scenario.style.label.is_empty() {
        scenario.ms_command.clone()
    } else {
        scenario.style.label.clone()
    }
}

/// Simulate, extract and estimate the IICR of one scenario.
pub fn run_scenario<S: CoalescentSimulator + ?Sized>(
    simulator: &S,
    scenario: &Scenario,
    grid: &TimeGrid,
    n0: f64,
) -> Result<ScenarioResult> {
    let label = scenario_label(scenario);
    let command = SimulatorCommand::from(scenario.ms_command.as_str());
    let sample_size = command.sample_size()
        .ok_or_else(|| anyhow!("Cannot read the sample size of '{}'", command))?;

    let output = simulator.run(&command)?;
    let observations = extract(&output, ExtractionMode::FirstCoalescence)
        .with_context(|| format!("No coalescence times in the output of '{}'", command))?
        .scaled(MS_TIME_SCALE)?;
    if let Some(expected) = command.replicates() {
        if expected != observations.len() {
            warn!("'{}': expected {} replicates, found {}", label, expected, observations.len());
        }
    }

    let (distribution, curve) = empirical_iicr(&observations, grid, sample_size)
        .with_context(|| format!("Cannot estimate the IICR of '{}'", label))?;

    let history = match reconstruct(&command, n0) {
        Ok(model) => Some(model),
        Err(e) => {
            warn!("'{}': {}", label, e);
            None
        }
    };
    info!("'{}': {} observations, IICR defined at {} points",
        label, observations.len(), curve.defined().count());

    Ok(ScenarioResult {
        label,
        style: scenario.style.clone(),
        command,
        sample_size,
        observations,
        distribution,
        curve,
        history,
    })
}

/// Run all scenarios in parallel. Results keep the order of `scenarios`;
/// a failed scenario does not stop the others.
pub fn run_scenarios<S: CoalescentSimulator + ?Sized>(
    simulator: &S,
    scenarios: &[Scenario],
    grid: &TimeGrid,
    n0: f64,
    progress: bool,
) -> Vec<Result<ScenarioResult>> {
    let pb = if progress {
        let pb = ProgressBar::new(scenarios.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let results: Vec<Result<ScenarioResult>> = scenarios
        .par_iter()
        .map_init(
            || pb.clone(),
            |pb, scenario| {
                let result = run_scenario(simulator, scenario, grid, n0);
                pb.inc(1);
                result
            },
        ).collect();
    pb.finish_and_clear();
    results
}

/// Times for the analytical curves: 1000 points from 10 years up to
/// `x_max` years, log spaced, converted to units of 2N0 generations.
pub fn analytical_times(x_max: f64, n0: f64, generation_time: f64) -> Vec<f64> {
    let n = 1000;
    let (lo, hi) = (1.0, x_max.log10());
    let scale = 2.0 * n0 * generation_time;
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .map(|e| 10f64.powf(e) / scale)
        .collect()
}

/// Evaluate the configured n-island curves. Invalid models are skipped.
pub fn analytical_curves(curves: &[NIslandCurve], times: &[f64]) -> Vec<AnalyticalResult> {
    curves.iter()
        .filter_map(|c| match NIslandModel::new(c.n, c.m, c.same_island) {
            Ok(model) => {
                let label = if c.style.label.is_empty() {
                    format!("{}-island, M={}", c.n, c.m)
                } else {
                    c.style.label.clone()
                };
                let curve = IICRCurve::new(times.iter().copied().zip(model.iicr(times)).collect());
                Some(AnalyticalResult { label, style: c.style.clone(), model, curve })
            }
            Err(e) => {
                warn!("Skipping n-island curve n={}, M={}: {}", c.n, c.m, e);
                None
            }
        })
        .collect()
}

/// Analytical curves of a parameter file, if requested.
pub fn configured_analytical_curves(params: &Parameters) -> Vec<AnalyticalResult> {
    if !params.plot_params.plot_theor_iicr.is_on() {
        return Vec::new();
    }
    let times = analytical_times(params.plot_params.plot_limits[1],
        params.scale_params.n0, params.scale_params.generation_time);
    analytical_curves(&params.theoretical_iicr_nisland, &times)
}

/// Collect all curves for export, scaled to years and individuals.
pub fn collect_curves(
    params: &Parameters,
    scenarios: &[ScenarioResult],
    analytical: &[AnalyticalResult],
) -> CurveCollection {
    let (tf, rf) = (params.years_per_unit(), params.scale_params.n0);
    CurveCollection {
        empirical: scenarios.iter()
            .map(|s| s.curve.scaled(tf, rf).to_serializable(&s.label))
            .collect(),
        analytical: analytical.iter()
            .map(|a| a.curve.scaled(tf, rf).to_serializable(&a.label))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::CannedSimulator;
    use iicr_grid::GridKind;

    fn scenario(cmd: &str, label: &str) -> Scenario {
        Scenario {
            ms_command: cmd.into(),
            style: Style {
                color: "black".into(),
                linestyle: "-".into(),
                alpha: 1.0,
                label: label.into(),
            },
        }
    }

    fn canned_trees() -> CannedSimulator {
        // ms 2 4 -T style output, coalescence times in units of 4N0.
        let mut out = String::from("ms 2 4 -T\n1 2 3\n\n");
        for t in [0.05, 0.1, 0.1, 0.25] {
            out.push_str(&format!("//\n(1:{t},2:{t});\n"));
        }
        CannedSimulator(out)
    }

    #[test]
    fn test_run_scenario() {
        let grid = TimeGrid::try_from(vec![0.0, 0.1, 0.3, 0.5]).unwrap();
        let result = run_scenario(&canned_trees(), &scenario("ms 2 4 -T -eN 0.5 2.0", "b"), &grid, 1000.0)
            .unwrap();
        assert_eq!(result.label, "b");
        assert_eq!(result.sample_size, 2);
        assert_eq!(&result.observations[..], &[0.1, 0.2, 0.2, 0.5]);
        assert_eq!(result.distribution.cdf, vec![0, 1, 3, 4]);
        assert_eq!(result.curve.len(), 4);
        assert_eq!(result.history, Some(DemographicModel::PiecewiseConstant {
            breakpoints: vec![(0.0, 1000.0), (2000.0, 2000.0)],
        }));
    }

    #[test]
    fn test_scenario_errors() {
        let grid = TimeGrid::try_from(vec![0.0, 0.1, 0.3, 0.5]).unwrap();
        let empty = CannedSimulator(String::new());
        assert!(run_scenario(&empty, &scenario("ms 2 4 -T", ""), &grid, 1.0).is_err());
        assert!(run_scenario(&canned_trees(), &scenario("ms", ""), &grid, 1.0).is_err());

        // Undecodable history is not fatal.
        let result = run_scenario(&canned_trees(), &scenario("ms 2 4 -T -eN x", ""), &grid, 1.0).unwrap();
        assert_eq!(result.history, None);
        assert_eq!(result.label, "ms 2 4 -T -eN x");
    }

    #[test]
    fn test_run_scenarios_keeps_order() {
        let grid = TimeGrid::build(0.0, 1.0, 8, GridKind::Log).unwrap();
        let scenarios: Vec<Scenario> = (0..6)
            .map(|i| scenario(if i == 3 { "ms" } else { "ms 2 4 -T" }, &i.to_string()))
            .collect();
        let results = run_scenarios(&canned_trees(), &scenarios, &grid, 1.0, false);
        assert_eq!(results.len(), 6);
        for (i, r) in results.iter().enumerate() {
            match r {
                Ok(res) => assert_eq!(res.label, i.to_string()),
                Err(_) => assert_eq!(i, 3),
            }
        }
    }

    #[test]
    fn test_analytical_times() {
        let times = analytical_times(1e7, 1000.0, 25.0);
        assert_eq!(times.len(), 1000);
        assert!((times[0] * 50_000.0 - 10.0).abs() < 1e-9);
        assert!((times[999] * 50_000.0 - 1e7).abs() < 1e-3);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_collect_curves() {
        let params = Parameters::from_json(r#"{
            "scenarios": [{"ms_command": "ms 2 4 -T", "label": "constant"}],
            "computation_parameters": {"start": 0, "end": 1, "number_of_values": 4},
            "scale_params": {"N0": 100, "generation_time": 2},
            "plot_params": {"plot_theor_IICR": 1, "plot_limits": [10, 1e4, 0, 500]},
            "theoretical_IICR_nisland": [{"n": 5, "M": 1.0}]
        }"#).unwrap();
        let grid = TimeGrid::try_from(vec![0.0, 0.1, 0.3, 0.5]).unwrap();
        let result = run_scenario(&canned_trees(), &params.scenarios[0], &grid, 100.0).unwrap();
        let analytical = configured_analytical_curves(&params);
        assert_eq!(analytical.len(), 1);

        let curves: CurveCollection = collect_curves(&params, &[result.clone()], &analytical);
        assert_eq!(curves.empirical.len(), 1);
        assert_eq!(curves.empirical[0].label, "constant");
        assert_eq!(curves.empirical[0].time, vec![0.0, 40.0, 120.0, 200.0]);
        let rates: Vec<Option<f64>> = result.curve.rates().iter()
            .map(|r| r.map(|r| r * 100.0))
            .collect();
        assert_eq!(curves.empirical[0].iicr, rates);
        assert_eq!(curves.analytical[0].label, "5-island, M=1");
        assert_eq!(curves.analytical[0].time.len(), 1000);
    }

    #[test]
    fn test_analytical_curves_skip_invalid() {
        let style = scenario("", "").style;
        let curves = vec![
            NIslandCurve { n: 10, m: 1.0, same_island: true, style: style.clone() },
            NIslandCurve { n: 1, m: 1.0, same_island: true, style },
        ];
        let results = analytical_curves(&curves, &[0.0, 1.0, 10.0]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "10-island, M=1");
        assert_eq!(results[0].curve.len(), 3);
        assert!((results[0].curve.points[0].1.unwrap() - 1.0).abs() < 1e-12);
    }
}
