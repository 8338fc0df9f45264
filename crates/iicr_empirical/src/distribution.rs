use log::debug;
use iicr_grid::TimeGrid;

use crate::ObservationSet;

/// Empirical distribution of coalescence times evaluated on a [`TimeGrid`].
///
/// `cdf[i]` counts the observations in `[x0, x_i]` (with `cdf[0] = 0`), and
/// `pdf[i]` is the centered finite-difference density at `x_i`, see
/// [`centered_density`]. Counts are absolute, not normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalDistribution {
    pub times: Vec<f64>,
    pub widths: Vec<f64>,
    pub cdf: Vec<usize>,
    pub cdf_left: Vec<usize>,
    pub cdf_right: Vec<usize>,
    /// `None` where the density is undefined (zero width, no observations).
    pub pdf: Vec<Option<f64>>,
    /// Total number of observations, including those beyond the grid.
    pub total: usize,
}

/// Density estimate on the windows `[lo_i, hi_i]` around every grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct CenteredDensity {
    pub cdf_left: Vec<usize>,
    pub cdf_right: Vec<usize>,
    pub pdf: Vec<Option<f64>>,
}

/// Cumulative observation count `#{o : origin <= o <= y}` at every point `y`.
///
/// This is the cumulative sum of a histogram with edges `origin, y_0, y_1,
/// ...`, evaluated by binary search on the sorted observations, so the
/// points need not be monotonic.
pub fn cumulative_counts(sorted: &[f64], origin: f64, points: &[f64]) -> Vec<usize> {
    let below = sorted.partition_point(|&o| o < origin);
    points.iter().map(|&y| {
        if y < origin {
            0
        } else {
            sorted.partition_point(|&o| o <= y) - below
        }
    }).collect()
}

/// Centered finite-difference estimate of the derivative of the cumulative
/// count.
///
/// Each grid point `x_i` gets the window `[x_i - dx_i/2, x_i + dx_i/2]`; a
/// window reaching below the grid origin `x_0` is shifted to
/// `[x_0, x_0 + dx_i]`. The density is the number of observations in the
/// window divided by `dx_i`. A window with zero width has no density.
///
/// This is a Muller-style histogram derivative, not a kernel density
/// estimate: there is no bandwidth to choose and the result matches the
/// step-function shape of the IICR plot.
pub fn centered_density(sorted: &[f64], times: &[f64], widths: &[f64]) -> CenteredDensity {
    assert_eq!(times.len(), widths.len(), "Need one width per grid point");
    let origin = times[0];

    let mut lo = Vec::with_capacity(times.len());
    let mut hi = Vec::with_capacity(times.len());
    let mut clamped = Vec::with_capacity(times.len());
    for (&x, &dx) in times.iter().zip(widths) {
        if x - dx / 2.0 < origin {
            lo.push(origin);
            hi.push(origin + dx);
            clamped.push(true);
        } else {
            lo.push(x - dx / 2.0);
            hi.push(x + dx / 2.0);
            clamped.push(false);
        }
    }

    // A shifted window keeps its lower edge closed.
    let cdf_left: Vec<usize> = cumulative_counts(sorted, origin, &lo)
        .into_iter()
        .zip(&clamped)
        .map(|(c, &is_clamped)| if is_clamped { 0 } else { c })
        .collect();
    let cdf_right = cumulative_counts(sorted, origin, &hi);

    let pdf = if sorted.is_empty() {
        vec![None; times.len()]
    } else {
        cdf_right.iter().zip(&cdf_left).zip(widths)
            .map(|((&r, &l), &dx)| {
                if dx > 0.0 {
                    Some((r - l) as f64 / dx)
                } else {
                    None
                }
            })
            .collect()
    };

    CenteredDensity { cdf_left, cdf_right, pdf }
}

/// Estimate the cumulative count and density of `observations` on `grid`.
pub fn estimate(observations: &ObservationSet, grid: &TimeGrid) -> EmpiricalDistribution {
    let sorted = observations.sorted();
    let times = grid.times().to_vec();
    let widths = grid.widths();

    let mut cdf = cumulative_counts(&sorted, times[0], &times);
    cdf[0] = 0;

    let CenteredDensity { cdf_left, cdf_right, pdf } = centered_density(&sorted, &times, &widths);
    debug!("Estimated distribution of {} observations on {} grid points ({} beyond the grid)",
        sorted.len(), times.len(), sorted.len() - cdf[cdf.len() - 1]);

    EmpiricalDistribution {
        times,
        widths,
        cdf,
        cdf_left,
        cdf_right,
        pdf,
        total: sorted.len(),
    }
}

impl EmpiricalDistribution {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of observations not yet coalesced at every grid point.
    pub fn survivors(&self) -> impl Iterator<Item = usize> + '_ {
        self.cdf.iter().map(move |&c| self.total - c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(values: &[f64]) -> ObservationSet {
        ObservationSet::try_from(values.to_vec()).unwrap()
    }

    #[test]
    fn test_cdf_concrete_scenario() {
        let grid = TimeGrid::try_from(vec![0.0, 0.1, 0.3, 0.5]).unwrap();
        let dist = estimate(&obs(&[0.1, 0.2, 0.2, 0.5]), &grid);
        assert_eq!(dist.cdf, vec![0, 1, 3, 4]);
        assert_eq!(dist.total, 4);
    }

    #[test]
    fn test_centered_density_windows() {
        let grid = TimeGrid::try_from(vec![0.0, 0.5, 1.0, 2.0]).unwrap();
        let dist = estimate(&obs(&[0.25, 0.5, 0.75, 1.25, 3.0]), &grid);
        assert_eq!(dist.cdf, vec![0, 2, 3, 4]);
        assert_eq!(dist.widths, vec![0.5, 0.5, 0.5, 1.0]);
        assert_eq!(dist.cdf_left, vec![0, 1, 3, 4]);
        assert_eq!(dist.cdf_right, vec![2, 3, 4, 4]);
        assert_eq!(dist.pdf, vec![Some(4.0), Some(4.0), Some(2.0), Some(0.0)]);
        assert_eq!(dist.survivors().collect::<Vec<_>>(), vec![5, 3, 2, 1]);
    }

    #[test]
    fn test_cdf_is_monotonic_and_bounded() {
        let grid = TimeGrid::build(0.0, 2.0, 30, iicr_grid::GridKind::Log).unwrap();
        let values: Vec<f64> = (1..200).map(|i| (i as f64 * 0.37) % 3.0).collect();
        let dist = estimate(&obs(&values), &grid);
        assert_eq!(dist.cdf[0], 0);
        assert!(dist.cdf.windows(2).all(|w| w[1] >= w[0]));
        assert!(dist.cdf[dist.len() - 1] <= values.len());
        assert!(dist.pdf.iter().all(|p| p.is_some_and(|v| v >= 0.0)));
    }

    #[test]
    fn test_cdf_reaches_total_when_grid_covers_everything() {
        let values = [0.05, 0.4, 0.9, 1.7];
        let grid = TimeGrid::covering(1.7, 0.1).unwrap();
        let dist = estimate(&obs(&values), &grid);
        assert_eq!(dist.cdf[dist.len() - 1], values.len());
    }

    #[test]
    fn test_zero_width_has_no_density() {
        let grid = TimeGrid::try_from(vec![0.0, 1.0, 2.0, 2.0]).unwrap();
        let dist = estimate(&obs(&[0.5, 1.5]), &grid);
        assert_eq!(dist.pdf[3], None);
        assert!(dist.pdf[..3].iter().all(|p| p.is_some()));
    }

    #[test]
    fn test_explicit_widths() {
        let grid = TimeGrid::try_from(vec![0.0, 1.0, 2.0])
            .unwrap()
            .with_widths(vec![1.0, 0.5, 0.0])
            .unwrap();
        let dist = estimate(&obs(&[0.5, 0.9, 1.1, 1.9]), &grid);
        // Windows: [0, 1], [0.75, 1.25], zero width.
        assert_eq!(dist.pdf, vec![Some(2.0), Some(4.0), None]);
    }

    #[test]
    fn test_empty_observations() {
        let grid = TimeGrid::try_from(vec![0.0, 1.0, 2.0]).unwrap();
        let dist = estimate(&ObservationSet::default(), &grid);
        assert_eq!(dist.cdf, vec![0, 0, 0]);
        assert_eq!(dist.pdf, vec![None, None, None]);
    }

    #[test]
    fn test_cumulative_counts_non_monotonic_points() {
        let sorted = [0.1, 0.2, 0.3];
        assert_eq!(cumulative_counts(&sorted, 0.0, &[0.25, 0.15, 1.0, -1.0]), vec![2, 1, 3, 0]);
        assert_eq!(cumulative_counts(&sorted, 0.15, &[0.25, 0.3]), vec![1, 2]);
    }
}
