use std::fmt;
use log::debug;
use iicr_grid::TimeGrid;

use crate::IicrError;
use crate::ObservationSet;
use crate::EmpiricalDistribution;
use crate::estimate;

/// An IICR evaluated at a sequence of times.
///
/// A rate of `None` marks points where the underlying density is zero or
/// undefined. Callers decide whether to skip or interpolate them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IICRCurve {
    pub points: Vec<(f64, Option<f64>)>,
}

impl IICRCurve {
    pub fn new(points: Vec<(f64, Option<f64>)>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|(t, _)| *t).collect()
    }

    pub fn rates(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|(_, r)| *r).collect()
    }

    /// Rates as plain numbers, undefined points become NaN.
    pub fn rates_or_nan(&self) -> Vec<f64> {
        self.points.iter().map(|(_, r)| r.unwrap_or(f64::NAN)).collect()
    }

    /// Only the points with a defined rate.
    pub fn defined(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().filter_map(|&(t, r)| r.map(|r| (t, r)))
    }

    /// Rescale both axes, e.g. to years and number of individuals.
    pub fn scaled(&self, time_factor: f64, rate_factor: f64) -> Self {
        Self {
            points: self.points.iter()
                .map(|&(t, r)| (t * time_factor, r.map(|r| r * rate_factor)))
                .collect(),
        }
    }
}

impl fmt::Display for IICRCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>14}", "time", "iicr")?;
        for (t, r) in &self.points {
            match r {
                Some(r) => writeln!(f, "{:14.8} {:14.8}", t, r)?,
                None => writeln!(f, "{:14.8} {:>14}", t, "-")?,
            }
        }
        Ok(())
    }
}

/// Number of lineage pairs in a sample of `k`: `C(k, 2)`.
pub fn pair_count(k: usize) -> f64 {
    (k * k.saturating_sub(1)) as f64 / 2.0
}

/// Transform an empirical distribution into an IICR curve.
///
/// `rate(t_i) = C(k, 2) * (N - cdf_i) / pdf_i` with `N` the number of
/// observations. With more than two sampled lineages the observations are
/// first coalescence times among `k` lineages, whose rate is `C(k, 2)` times
/// the pairwise rate.
pub fn estimate_iicr(
    observations: &ObservationSet,
    distribution: &EmpiricalDistribution,
    sample_size: usize,
) -> Result<IICRCurve, IicrError> {
    if sample_size < 2 {
        return Err(IicrError::SampleSize(sample_size));
    }
    let factor = pair_count(sample_size);
    let n = observations.len() as f64;

    let points = distribution.times.iter()
        .zip(&distribution.cdf)
        .zip(&distribution.pdf)
        .map(|((&t, &c), &p)| {
            let rate = match p {
                Some(p) if p > 0.0 => Some(factor * (n - c as f64) / p),
                _ => None,
            };
            (t, rate)
        })
        .collect();
    Ok(IICRCurve { points })
}

/// Distribution and IICR in one go.
pub fn empirical_iicr(
    observations: &ObservationSet,
    grid: &TimeGrid,
    sample_size: usize,
) -> Result<(EmpiricalDistribution, IICRCurve), IicrError> {
    let distribution = estimate(observations, grid);
    let curve = estimate_iicr(observations, &distribution, sample_size)?;
    debug!("IICR defined at {} of {} grid points", curve.defined().count(), curve.len());
    Ok((distribution, curve))
}
