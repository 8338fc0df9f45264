use std::fmt;
use std::ops::Deref;
use std::convert::TryFrom;
use log::{debug, warn};

use crate::GridError;

/// How the points of a [`TimeGrid`] are spread between start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Linear,
    Log,
}

impl From<&str> for GridKind {
    /// Unknown names fall back to a linear grid.
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => GridKind::Linear,
            "log" => GridKind::Log,
            other => {
                warn!("Unknown grid kind '{}', using a linear grid.", other);
                GridKind::Linear
            }
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridKind::Linear => write!(f, "linear"),
            GridKind::Log => write!(f, "log"),
        }
    }
}

/// An ordered sequence of non-negative time points.
///
/// Grids built with [`TimeGrid::build`] are strictly increasing. Grids
/// derived by grouping may end on a repeated boundary, so the invariant
/// checked on construction is only "non-decreasing"; a zero-width interval
/// shows up as an undefined density later on.
///
/// The optional `widths` hold one explicit interval width per point. When
/// absent, widths are derived from the spacing of the grid (see
/// [`TimeGrid::widths`]).
///
/// # Example
/// ```rust
/// use iicr_grid::{TimeGrid, GridKind};
///
/// let grid = TimeGrid::build(0.0, 1.0, 5, GridKind::Linear).unwrap();
/// assert_eq!(grid.len(), 5);
/// assert_eq!(grid[4], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
    widths: Option<Vec<f64>>,
}

impl Deref for TimeGrid {
    type Target = [f64];
    fn deref(&self) -> &Self::Target {
        &self.times
    }
}

impl TryFrom<Vec<f64>> for TimeGrid {
    type Error = GridError;

    fn try_from(times: Vec<f64>) -> Result<Self, Self::Error> {
        if times.len() < 2 {
            return Err(GridError::TooFewPoints(times.len()));
        }
        for (i, &t) in times.iter().enumerate() {
            if !t.is_finite() || t < 0.0 {
                return Err(GridError::Negative(i));
            }
            if i > 0 && t < times[i - 1] {
                return Err(GridError::NotMonotonic(i));
            }
        }
        Ok(TimeGrid { times, widths: None })
    }
}

impl TryFrom<&[f64]> for TimeGrid {
    type Error = GridError;

    fn try_from(times: &[f64]) -> Result<Self, Self::Error> {
        TimeGrid::try_from(times.to_vec())
    }
}

impl TimeGrid {
    /// Build a grid of the given kind.
    ///
    /// - `Linear`: `count` evenly spaced points from `start` to `end`.
    /// - `Log`: `count + 1` points `0.1 * (exp(i * ln(1 + 10 * end) / count) - 1)`,
    ///   with `start` added to the first one. Dense near zero, sparse at
    ///   large times.
    pub fn build(start: f64, end: f64, count: usize, kind: GridKind) -> Result<Self, GridError> {
        debug!("Building {} grid: start={}, end={}, count={}", kind, start, end, count);
        match kind {
            GridKind::Linear => Self::linear(start, end, count),
            GridKind::Log => Self::log(start, end, count),
        }
    }

    fn linear(start: f64, end: f64, count: usize) -> Result<Self, GridError> {
        if count < 2 {
            return Err(GridError::TooFewPoints(count));
        }
        if !(start.is_finite() && end.is_finite()) || start < 0.0 || start >= end {
            return Err(GridError::InvalidRange(start, end));
        }
        let step = (end - start) / (count - 1) as f64;
        let mut times: Vec<f64> = (0..count)
            .map(|i| start + i as f64 * step)
            .collect();
        times[count - 1] = end;
        TimeGrid::try_from(times)
    }

    fn log(start: f64, end: f64, count: usize) -> Result<Self, GridError> {
        if count < 1 {
            return Err(GridError::TooFewPoints(count + 1));
        }
        if !(start.is_finite() && end.is_finite()) || start < 0.0 || end <= 0.0 {
            return Err(GridError::InvalidRange(start, end));
        }
        let n = count as f64;
        let scale = (1.0 + 10.0 * end).ln();
        let mut times: Vec<f64> = (0..=count)
            .map(|i| 0.1 * ((i as f64 * scale / n).exp() - 1.0))
            .collect();
        times[0] += start;
        if times[0] >= times[1] {
            return Err(GridError::InvalidRange(start, end));
        }
        TimeGrid::try_from(times)
    }

    /// The grid `0, step, 2*step, ...` up to the first point at or beyond
    /// `max_value`. Used when no grid was configured.
    pub fn covering(max_value: f64, step: f64) -> Result<Self, GridError> {
        if !(step.is_finite() && step > 0.0) || !max_value.is_finite() || max_value < 0.0 {
            return Err(GridError::InvalidRange(max_value, step));
        }
        let mut times = vec![0.0];
        let mut i = 1;
        while times.len() < 2 || times[times.len() - 1] < max_value {
            times.push(i as f64 * step);
            i += 1;
        }
        TimeGrid::try_from(times)
    }

    /// Attach explicit per-point interval widths.
    pub fn with_widths(mut self, widths: Vec<f64>) -> Result<Self, GridError> {
        if widths.len() != self.times.len() {
            return Err(GridError::WidthMismatch {
                found: widths.len(),
                expected: self.times.len(),
            });
        }
        if let Some(i) = widths.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(GridError::InvalidWidth(i));
        }
        self.widths = Some(widths);
        Ok(self)
    }

    /// Attach the same explicit width to every point.
    pub fn with_uniform_width(self, width: f64) -> Result<Self, GridError> {
        let n = self.times.len();
        self.with_widths(vec![width; n])
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn explicit_widths(&self) -> Option<&[f64]> {
        self.widths.as_deref()
    }

    /// Interval width associated with every point: the explicit widths if
    /// present, otherwise the backward spacing `x[i] - x[i-1]` (and
    /// `x[1] - x[0]` for the first point).
    pub fn widths(&self) -> Vec<f64> {
        if let Some(w) = &self.widths {
            return w.clone();
        }
        let mut widths = Vec::with_capacity(self.times.len());
        widths.push(self.times[1] - self.times[0]);
        widths.extend(self.times.windows(2).map(|w| w[1] - w[0]));
        widths
    }

    pub fn first(&self) -> f64 {
        self.times[0]
    }

    pub fn last(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// A copy of the times with the first point moved to `x[1] / 5`, so that
    /// the grid can be drawn on a logarithmic axis.
    pub fn log_safe_times(&self) -> Vec<f64> {
        let mut times = self.times.clone();
        times[0] = times[1] / 5.0;
        times
    }
}

impl fmt::Display for TimeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.times.iter().map(|t| format!("{:.6}", t)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
