use std::io::BufRead;
use std::ops::Deref;
use std::str::FromStr;
use std::convert::TryFrom;
use log::debug;
use regex::Regex;
use once_cell::sync::Lazy;

use crate::ExtractionError;

/// A tree line of `ms -T` output, e.g. `((1:0.2,3:0.2):0.4,2:0.6);`.
static TREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([(0-9.,:)]+\)").expect("tree pattern is a valid regex")
});

/// A cherry inside a tree: two leaves merging, e.g. `(1:0.2,3:0.2)`.
static CHERRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([0-9.,:]+\)").expect("cherry pattern is a valid regex")
});

/// Line prefix of simulators that report the pairwise time directly.
pub const PAIRWISE_TAG: &str = "time:\t";

/// Which coalescence time to read from simulator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Time of the first coalescence event in every genealogy (`T_k`).
    FirstCoalescence,
    /// Pairwise coalescence time reported on `time:` lines (`T_2`).
    PairwiseTime,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" | "tk" => Ok(ExtractionMode::FirstCoalescence),
            "pairwise" | "t2" => Ok(ExtractionMode::PairwiseTime),
            _ => Err(format!("unknown extraction mode '{}' (use 'first' or 'pairwise')", s)),
        }
    }
}

/// Coalescence times, one per independent simulation replicate.
///
/// All values are finite and non-negative. The order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationSet(Vec<f64>);

impl Deref for ObservationSet {
    type Target = [f64];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for ObservationSet {
    type Error = ExtractionError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if let Some((index, &value)) = values.iter().enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ExtractionError::InvalidObservation { index, value });
        }
        Ok(ObservationSet(values))
    }
}

impl ObservationSet {
    /// Multiply every observation by `factor` (e.g. to change time units).
    pub fn scaled(&self, factor: f64) -> Result<Self, ExtractionError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ExtractionError::InvalidScale(factor));
        }
        ObservationSet::try_from(self.0.iter().map(|t| t * factor).collect::<Vec<f64>>())
    }

    /// The largest observation, or `None` for an empty set.
    pub fn max(&self) -> Option<f64> {
        self.0.iter().copied().reduce(f64::max)
    }

    /// The observations in ascending order.
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.0.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Branch length of a cherry token: the text between the first `:` and the
/// next `,` or `)`.
fn cherry_branch_length(token: &str) -> Option<f64> {
    let (_, rest) = token.split_once(':')?;
    let end = rest.find([',', ')']).unwrap_or(rest.len());
    rest[..end].parse::<f64>().ok()
}

/// Minimum cherry branch length of one tree, i.e. the time of the first
/// coalescence event in that genealogy.
fn first_coalescence(tree: &str) -> Option<f64> {
    CHERRY_RE.find_iter(tree)
        .filter_map(|m| {
            let length = cherry_branch_length(m.as_str());
            if length.is_none() {
                debug!("Skipping malformed coalescence token '{}'", m.as_str());
            }
            length
        })
        .reduce(f64::min)
}

fn pairwise_time(line: &str) -> Option<f64> {
    if !line.starts_with(PAIRWISE_TAG) {
        return None;
    }
    let field = line.split('\t').nth(1)?;
    match field.trim().parse::<f64>() {
        Ok(t) if t.is_finite() && t >= 0.0 => Some(t),
        _ => {
            debug!("Skipping malformed time line '{}'", line);
            None
        }
    }
}

/// Parse raw simulator output into coalescence times.
///
/// Replicates without a readable time are skipped. Only output that is
/// empty, or that yields no observation at all, is an error.
pub fn extract(output: &str, mode: ExtractionMode) -> Result<ObservationSet, ExtractionError> {
    if output.trim().is_empty() {
        return Err(ExtractionError::EmptyOutput);
    }
    let times: Vec<f64> = match mode {
        ExtractionMode::FirstCoalescence => TREE_RE.find_iter(output)
            .filter_map(|tree| first_coalescence(tree.as_str()))
            .collect(),
        ExtractionMode::PairwiseTime => output.lines()
            .filter_map(pairwise_time)
            .collect(),
    };
    if times.is_empty() {
        return Err(ExtractionError::Unparseable { lines: output.lines().count() });
    }
    debug!("Extracted {} coalescence times ({:?})", times.len(), mode);
    ObservationSet::try_from(times)
}

/// Read all of `reader` and extract coalescence times from it.
pub fn read_observations<R: BufRead>(mut reader: R, mode: ExtractionMode) -> Result<ObservationSet, ExtractionError> {
    let mut output = String::new();
    reader.read_to_string(&mut output)?;
    extract(&output, mode)
}
