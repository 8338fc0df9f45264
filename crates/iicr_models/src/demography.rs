use std::fmt;
use log::debug;

use crate::DomainError;
use crate::NIslandModel;
use crate::SimulatorCommand;
use crate::UnrecognizedModelError;

/// Instantaneous size change: `-eN t a`, repeatable.
pub const SIZE_CHANGE: &str = "-eN";
/// Exponential growth: `-G alpha -eG T 0`.
pub const GROWTH: &str = "-G";
/// Island structure: `-I n k_1 .. k_n M`.
pub const ISLANDS: &str = "-I";

/// The demographic history a simulation was run under.
///
/// Times are in generations, sizes in number of diploid individuals, except
/// for the raw ms parameters kept by `ExponentialGrowth` (`alpha` and `t` in
/// units of 4N0 generations).
#[derive(Debug, Clone, PartialEq)]
pub enum DemographicModel {
    /// `(time, size)` breakpoints, strictly increasing times starting at 0.
    PiecewiseConstant { breakpoints: Vec<(f64, f64)> },
    ExponentialGrowth { alpha: f64, t: f64, n0: f64 },
    StructuredIslands { n_islands: usize, migration_rate: f64, n0: f64, same_island: bool },
}

/// The model families, in decoding priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    SizeChanges,
    Growth,
    Islands,
}

impl ModelKind {
    pub const PRIORITY: [ModelKind; 3] = [ModelKind::SizeChanges, ModelKind::Growth, ModelKind::Islands];

    pub fn marker(&self) -> &'static str {
        match self {
            ModelKind::SizeChanges => SIZE_CHANGE,
            ModelKind::Growth => GROWTH,
            ModelKind::Islands => ISLANDS,
        }
    }
}

fn parse_size_changes(command: &SimulatorCommand, n0: f64) -> Result<DemographicModel, UnrecognizedModelError> {
    let mut changes: Vec<(f64, f64)> = Vec::new();
    for pos in command.positions(SIZE_CHANGE) {
        let t: f64 = command.argument(pos, 1)?;
        let a: f64 = command.argument(pos, 2)?;
        if !t.is_finite() || t < 0.0 {
            return Err(malformed(command, pos, 1));
        }
        if !a.is_finite() || a <= 0.0 {
            return Err(malformed(command, pos, 2));
        }
        changes.push((4.0 * n0 * t, n0 * a));
    }
    // Events apply in time order; a later event at the same time wins.
    changes.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut breakpoints = vec![(0.0, n0)];
    for (t, size) in changes {
        match breakpoints.last_mut() {
            Some(last) if last.0 == t => last.1 = size,
            _ => breakpoints.push((t, size)),
        }
    }
    Ok(DemographicModel::PiecewiseConstant { breakpoints })
}

fn parse_growth(command: &SimulatorCommand, n0: f64) -> Result<DemographicModel, UnrecognizedModelError> {
    let pos = command.positions(GROWTH)[0];
    let alpha: f64 = command.argument(pos, 1)?;
    let t: f64 = command.argument(pos, 3)?;
    if !alpha.is_finite() {
        return Err(malformed(command, pos, 1));
    }
    if !t.is_finite() || t < 0.0 {
        return Err(malformed(command, pos, 3));
    }
    Ok(DemographicModel::ExponentialGrowth { alpha, t, n0 })
}

fn parse_islands(command: &SimulatorCommand, n0: f64) -> Result<DemographicModel, UnrecognizedModelError> {
    let pos = command.positions(ISLANDS)[0];
    let n_islands: usize = command.argument(pos, 1)?;
    if n_islands == 0 {
        return Err(malformed(command, pos, 1));
    }
    let m_offset = n_islands.checked_add(2).ok_or_else(|| malformed(command, pos, 1))?;
    let migration_rate: f64 = command.argument(pos, m_offset)?;
    if !migration_rate.is_finite() || migration_rate < 0.0 {
        return Err(malformed(command, pos, m_offset));
    }
    let first_island: usize = command.argument(pos, 2)?;
    Ok(DemographicModel::StructuredIslands {
        n_islands,
        migration_rate,
        n0,
        same_island: first_island == 2,
    })
}

fn malformed(command: &SimulatorCommand, pos: usize, offset: usize) -> UnrecognizedModelError {
    UnrecognizedModelError {
        marker: command.token(pos).unwrap_or_default().to_string(),
        offset,
        token: pos.checked_add(offset).and_then(|i| command.token(i)).map(str::to_string),
    }
}

/// Decode the demographic model of an ms command.
///
/// The first marker present in [`ModelKind::PRIORITY`] order selects the
/// model; without any marker the population has constant size `n0`.
///
/// # Example
/// ```rust
/// use iicr_models::{reconstruct, DemographicModel, SimulatorCommand};
///
/// let cmd = SimulatorCommand::from("ms 2 100 -T -eN 0.5 2.0");
/// let model = reconstruct(&cmd, 1000.0).unwrap();
/// assert_eq!(model, DemographicModel::PiecewiseConstant {
///     breakpoints: vec![(0.0, 1000.0), (2000.0, 2000.0)],
/// });
/// ```
pub fn reconstruct(command: &SimulatorCommand, n0: f64) -> Result<DemographicModel, UnrecognizedModelError> {
    let kind = ModelKind::PRIORITY.into_iter()
        .find(|kind| command.contains(kind.marker()));
    debug!("Decoding '{}' as {:?}", command, kind);
    match kind {
        Some(ModelKind::SizeChanges) => parse_size_changes(command, n0),
        Some(ModelKind::Growth) => parse_growth(command, n0),
        Some(ModelKind::Islands) => parse_islands(command, n0),
        None => Ok(DemographicModel::constant(n0)),
    }
}

impl DemographicModel {
    pub fn constant(n0: f64) -> Self {
        DemographicModel::PiecewiseConstant { breakpoints: vec![(0.0, n0)] }
    }

    /// Population size at time `t` (generations).
    pub fn size_at(&self, t: f64) -> f64 {
        match self {
            DemographicModel::PiecewiseConstant { breakpoints } => {
                breakpoints.iter()
                    .take_while(|(bt, _)| *bt <= t)
                    .last()
                    .or(breakpoints.first())
                    .map_or(f64::NAN, |(_, size)| *size)
            }
            DemographicModel::ExponentialGrowth { alpha, t: t_stop, n0 } => {
                let scaled = (t / (4.0 * n0)).min(*t_stop);
                n0 * (-alpha * scaled).exp()
            }
            DemographicModel::StructuredIslands { n0, .. } => *n0,
        }
    }

    /// Step function `(time, size)` up to `t_max`, ending with a point at
    /// `t_max` that repeats the last size.
    pub fn steps(&self, t_max: f64) -> Vec<(f64, f64)> {
        let mut steps: Vec<(f64, f64)> = match self {
            DemographicModel::PiecewiseConstant { breakpoints } => {
                breakpoints.iter().copied().filter(|(t, _)| *t < t_max).collect()
            }
            DemographicModel::ExponentialGrowth { t: t_stop, n0, .. } => {
                let t_end = (4.0 * n0 * t_stop).min(t_max);
                let n = 200;
                (0..=n).map(|i| t_end * i as f64 / n as f64)
                    .map(|t| (t, self.size_at(t)))
                    .collect()
            }
            DemographicModel::StructuredIslands { n0, .. } => vec![(0.0, *n0)],
        };
        let last = steps.last().map_or(self.size_at(t_max), |s| s.1);
        steps.push((t_max, last));
        steps
    }

    /// The analytical model matching a structured history.
    pub fn island_model(&self) -> Result<Option<NIslandModel>, DomainError> {
        match self {
            DemographicModel::StructuredIslands { n_islands, migration_rate, same_island, .. } => {
                NIslandModel::new(*n_islands, *migration_rate, *same_island).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl fmt::Display for DemographicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemographicModel::PiecewiseConstant { breakpoints } => {
                write!(f, "piecewise constant:")?;
                for (t, size) in breakpoints {
                    write!(f, " ({}, {})", t, size)?;
                }
                Ok(())
            }
            DemographicModel::ExponentialGrowth { alpha, t, n0 } => {
                write!(f, "exponential growth: alpha={}, T={}, N0={}", alpha, t, n0)
            }
            DemographicModel::StructuredIslands { n_islands, migration_rate, n0, same_island } => {
                write!(f, "{} islands ({}): M={}, N0={}", n_islands,
                    if *same_island { "same island" } else { "distinct islands" },
                    migration_rate, n0)
            }
        }
    }
}
