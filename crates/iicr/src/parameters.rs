use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use anyhow::{bail, Context, Result};
use log::debug;

use iicr_grid::TimeGrid;
use iicr_grid::GridKind;
use iicr_grid::GroupingPattern;

/// A JSON switch written either as `true`/`false` or as `1`/`0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Switch {
    Bool(bool),
    Int(i64),
}

impl Switch {
    pub fn is_on(&self) -> bool {
        match self {
            Switch::Bool(b) => *b,
            Switch::Int(i) => *i != 0,
        }
    }
}

impl Default for Switch {
    fn default() -> Self {
        Switch::Bool(false)
    }
}

fn default_color() -> String { "black".to_string() }
fn default_linestyle() -> String { "-".to_string() }
fn default_alpha() -> f64 { 1.0 }
fn default_true() -> bool { true }
fn default_plot_limits() -> [f64; 4] { [1e2, 1e7, 0.0, 1e5] }

/// How a curve is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default = "default_color")]
    pub color: String,
    /// "-" for solid, "--", ":" or "-." for dashed lines.
    #[serde(default = "default_linestyle")]
    pub linestyle: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub label: String,
}

/// One simulated demographic scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub ms_command: String,
    #[serde(flatten)]
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationParameters {
    pub start: f64,
    pub end: f64,
    pub number_of_values: usize,
    #[serde(default = "default_x_vector_type")]
    pub x_vector_type: String,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Explicit interval width, 0 derives widths from the grid.
    #[serde(default)]
    pub dx: f64,
}

fn default_x_vector_type() -> String { "log".to_string() }

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomXVector {
    #[serde(default)]
    pub set_custom_xvector: Switch,
    #[serde(default)]
    pub x_vector: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    #[serde(rename = "N0")]
    pub n0: f64,
    pub generation_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotParams {
    #[serde(default)]
    pub plot_real_ms_history: Switch,
    #[serde(default, rename = "plot_theor_IICR")]
    pub plot_theor_iicr: Switch,
    /// `[x_min, x_max, y_min, y_max]` in years and individuals.
    #[serde(default = "default_plot_limits")]
    pub plot_limits: [f64; 4],
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            plot_real_ms_history: Switch::default(),
            plot_theor_iicr: Switch::default(),
            plot_limits: default_plot_limits(),
        }
    }
}

/// A theoretical n-island IICR to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NIslandCurve {
    pub n: usize,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(default = "default_true")]
    pub same_island: bool,
    #[serde(flatten)]
    pub style: Style,
}

/// Content of a `parameters.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub path2ms: String,
    pub scenarios: Vec<Scenario>,
    pub computation_parameters: ComputationParameters,
    #[serde(default)]
    pub custom_x_vector: CustomXVector,
    pub scale_params: ScaleParams,
    #[serde(default)]
    pub plot_params: PlotParams,
    #[serde(default, rename = "theoretical_IICR_nisland")]
    pub theoretical_iicr_nisland: Vec<NIslandCurve>,
}

impl Parameters {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Cannot read parameter file {}", path.display()))?;
        Self::from_json(&data)
            .with_context(|| format!("Invalid parameter file {}", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let params: Parameters = serde_json::from_str(data)?;
        params.validate()?;
        Ok(params)
    }

    /// Validate that all parameters make sense.
    pub fn validate(&self) -> Result<()> {
        if self.scenarios.is_empty() {
            bail!("No scenario configured");
        }
        let scale = &self.scale_params;
        if !(scale.n0 > 0.0) {
            bail!("N0 ({}) must be positive", scale.n0);
        }
        if !(scale.generation_time > 0.0) {
            bail!("generation_time ({}) must be positive", scale.generation_time);
        }
        let [x_min, x_max, y_min, y_max] = self.plot_params.plot_limits;
        if !(x_min > 0.0 && x_max > x_min) {
            bail!("Time limits must satisfy 0 < x_min < x_max (got {}, {})", x_min, x_max);
        }
        if !(y_max > y_min) {
            bail!("IICR limits must satisfy y_min < y_max (got {}, {})", y_min, y_max);
        }
        if self.computation_parameters.dx < 0.0 {
            bail!("dx ({}) must not be negative", self.computation_parameters.dx);
        }
        for curve in &self.theoretical_iicr_nisland {
            if !(0.0..=1.0).contains(&curve.style.alpha) {
                bail!("alpha of '{}' must be within [0, 1]", curve.style.label);
            }
        }
        Ok(())
    }

    /// The grid all scenarios are evaluated on: the configured or custom
    /// grid, grouped by the pattern and with explicit widths if requested.
    pub fn time_grid(&self) -> Result<TimeGrid> {
        let cp = &self.computation_parameters;
        let mut grid = if self.custom_x_vector.set_custom_xvector.is_on() {
            TimeGrid::try_from(self.custom_x_vector.x_vector.clone())
                .context("Invalid custom time vector")?
        } else {
            let kind = GridKind::from(cp.x_vector_type.as_str());
            TimeGrid::build(cp.start, cp.end, cp.number_of_values, kind)
                .context("Invalid time grid")?
        };
        if let Some(pattern) = cp.pattern.as_deref().filter(|p| !p.trim().is_empty()) {
            let pattern: GroupingPattern = pattern.parse()?;
            grid = grid.group(&pattern)?;
        }
        if cp.dx > 0.0 {
            grid = grid.with_uniform_width(cp.dx)?;
        }
        debug!("Time grid with {} points: {}", grid.len(), grid);
        Ok(grid)
    }

    /// Factor from model time (2N0 generations) to years.
    pub fn years_per_unit(&self) -> f64 {
        2.0 * self.scale_params.n0 * self.scale_params.generation_time
    }
}
