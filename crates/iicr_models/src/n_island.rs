use log::debug;

use crate::DomainError;
use crate::IicrModel;

/// The symmetric n-island model: `n` demes exchanging migrants at rate `M`.
///
/// With `gamma = M / (n - 1)` the coalescence process of two lineages is
/// governed by the eigenvalues
/// `alpha, beta = (1 + n*gamma +/- sqrt((1 + n*gamma)^2 - 4*gamma)) / 2`.
/// The IICR of two lineages sampled in the same island is
///
/// ```text
///   (1-beta) e^{-alpha t} + (alpha-1) e^{-beta t}
///   -----------------------------------------------------
///   (alpha-gamma) e^{-alpha t} + (gamma-beta) e^{-beta t}
/// ```
///
/// and for two different islands
///
/// ```text
///   beta e^{-alpha t} - alpha e^{-beta t}
///   ----------------------------------------
///   gamma (e^{-alpha t} - e^{-beta t})
/// ```
///
/// Both fractions are evaluated after multiplying by `e^{beta t}`, so only
/// `e^{-(alpha-beta) t}` is computed and large times converge to the limit
/// `alpha / gamma` instead of 0/0.
///
/// # Example
/// ```rust
/// use iicr_models::{NIslandModel, IicrModel};
///
/// let model = NIslandModel::new(10, 1.0, true).unwrap();
/// let rate = model.iicr_at(0.0).unwrap();
/// assert!((rate - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NIslandModel {
    n: usize,
    migration: f64,
    same_island: bool,
    gamma: f64,
    alpha: f64,
    beta: f64,
}

impl NIslandModel {
    pub fn new(n: usize, migration: f64, same_island: bool) -> Result<Self, DomainError> {
        if n < 2 {
            return Err(DomainError::TooFewIslands(n));
        }
        if !migration.is_finite() || migration < 0.0 {
            return Err(DomainError::InvalidMigration(migration));
        }
        let nf = n as f64;
        let gamma = migration / (nf - 1.0);
        let delta = (1.0 + nf * gamma).powi(2) - 4.0 * gamma;
        if delta < 0.0 {
            return Err(DomainError::NegativeDiscriminant(delta));
        }
        let alpha = 0.5 * (1.0 + nf * gamma + delta.sqrt());
        let beta = 0.5 * (1.0 + nf * gamma - delta.sqrt());
        debug!("n-island model n={}, M={}: gamma={}, alpha={}, beta={}",
            n, migration, gamma, alpha, beta);
        Ok(Self { n, migration, same_island, gamma, alpha, beta })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn migration(&self) -> f64 {
        self.migration
    }

    pub fn same_island(&self) -> bool {
        self.same_island
    }

    /// The eigenvalues `(alpha, beta)`, `alpha >= beta`.
    pub fn eigenvalues(&self) -> (f64, f64) {
        (self.alpha, self.beta)
    }

    /// IICR for `t -> infinity`, identical for both sampling schemes when
    /// `M > 0`. Without migration only same-island pairs coalesce (rate 1).
    pub fn asymptotic_iicr(&self) -> Option<f64> {
        if self.same_island && self.gamma == 0.0 {
            return Some(1.0);
        }
        let limit = self.alpha / self.gamma;
        limit.is_finite().then_some(limit)
    }
}

impl IicrModel for NIslandModel {
    fn iicr_at(&self, t: f64) -> Option<f64> {
        let (a, b, g) = (self.alpha, self.beta, self.gamma);
        // Without migration a single island is a panmictic population.
        if self.same_island && g == 0.0 {
            return Some(1.0);
        }
        let decay = (-(a - b) * t).exp();
        let (numerator, denominator) = if self.same_island {
            ((1.0 - b) * decay + (a - 1.0), (a - g) * decay + (g - b))
        } else {
            (b * decay - a, g * (decay - 1.0))
        };
        let rate = numerator / denominator;
        rate.is_finite().then_some(rate)
    }
}

/// Evaluate the n-island IICR on a vector of times.
pub fn iicr(n: usize, migration: f64, times: &[f64], same_island: bool) -> Result<Vec<Option<f64>>, DomainError> {
    let model = NIslandModel::new(n, migration, same_island)?;
    Ok(model.iicr(times))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The closed form as written, without factoring out e^{-beta t}.
    fn unstabilized(model: &NIslandModel, t: f64) -> f64 {
        let (a, b, g) = (model.alpha, model.beta, model.gamma);
        let (ea, eb) = ((-a * t).exp(), (-b * t).exp());
        if model.same_island {
            ((1.0 - b) * ea + (a - 1.0) * eb) / ((a - g) * ea + (g - b) * eb)
        } else {
            (b * ea - a * eb) / (g * (ea - eb))
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(NIslandModel::new(1, 1.0, true), Err(DomainError::TooFewIslands(1)));
        assert_eq!(NIslandModel::new(5, -1.0, true), Err(DomainError::InvalidMigration(-1.0)));
        assert!(matches!(NIslandModel::new(5, f64::NAN, true), Err(DomainError::InvalidMigration(_))));
    }

    #[test]
    fn test_two_islands_near_zero() {
        let model = NIslandModel::new(2, 1.0, true).unwrap();
        assert_eq!(model.gamma, 1.0);
        let rate = model.iicr_at(0.0).unwrap();
        assert!(rate.is_finite() && rate > 0.0);
        assert!((rate - 1.0).abs() < 1e-12);
        let rate = model.iicr_at(1e-6).unwrap();
        assert!((rate - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_matches_closed_form_for_moderate_times() {
        for &same in &[true, false] {
            let model = NIslandModel::new(10, 0.5, same).unwrap();
            for &t in &[0.01, 0.5, 2.0, 10.0] {
                let stable = model.iicr_at(t).unwrap();
                let naive = unstabilized(&model, t);
                assert!((stable - naive).abs() < 1e-9 * naive.abs().max(1.0),
                    "t={} same={}: {} vs {}", t, same, stable, naive);
            }
        }
    }

    #[test]
    fn test_large_times_are_stable() {
        let model = NIslandModel::new(10, 0.5, true).unwrap();
        assert!(unstabilized(&model, 1e5).is_nan());
        let limit = model.asymptotic_iicr().unwrap();
        let rate = model.iicr_at(1e5).unwrap();
        assert!((rate - limit).abs() < 1e-9 * limit);
    }

    #[test]
    fn test_sampling_schemes_converge() {
        let same = NIslandModel::new(5, 2.0, true).unwrap();
        let distinct = NIslandModel::new(5, 2.0, false).unwrap();
        let a = same.iicr_at(500.0).unwrap();
        let b = distinct.iicr_at(500.0).unwrap();
        assert!((a - b).abs() < 1e-9 * a);
        // Lineages in different islands need a migration before coalescing.
        assert!(distinct.iicr_at(0.1).unwrap() > same.iicr_at(0.1).unwrap());
    }

    #[test]
    fn test_distinct_islands_at_zero_undefined() {
        let model = NIslandModel::new(5, 1.0, false).unwrap();
        assert_eq!(model.iicr_at(0.0), None);
    }

    #[test]
    fn test_no_migration() {
        let same = NIslandModel::new(4, 0.0, true).unwrap();
        assert_eq!(same.iicr(&[0.0, 1.0, 100.0]), vec![Some(1.0), Some(1.0), Some(1.0)]);
        // e^{-t} underflows here, the rate stays at the panmictic value.
        assert_eq!(same.iicr(&[1000.0, 1e6]), vec![Some(1.0), Some(1.0)]);
        assert_eq!(same.asymptotic_iicr(), Some(1.0));
        let distinct = NIslandModel::new(4, 0.0, false).unwrap();
        assert_eq!(distinct.iicr_at(1.0), None);
        assert_eq!(distinct.asymptotic_iicr(), None);
    }

    #[test]
    fn test_iicr_function() {
        let rates = iicr(10, 1.0, &[0.0, 1.0, 10.0], true).unwrap();
        assert_eq!(rates.len(), 3);
        assert!(rates.iter().all(|r| r.is_some()));
        assert!(iicr(1, 1.0, &[0.0], true).is_err());
    }
}
