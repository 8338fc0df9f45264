use std::io::Write;
use clap::Args;
use anyhow::Result;
use anyhow::bail;
use env_logger::Builder;

use iicr_grid::TimeGrid;
use iicr_grid::GridKind;
use iicr_grid::GroupingPattern;
use iicr_models::NIslandModel;

pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            // no prefix, just the message
            writeln!(buf, "{}", record.args())
        })
        .init();
}

#[derive(Debug, Args)]
pub struct GridParameters {
    /// First time point (units of 2N0 generations).
    #[arg(long, default_value_t = 0.0)]
    pub t_start: f64,

    /// Last time point (units of 2N0 generations).
    #[arg(long, default_value_t = 50.0)]
    pub t_end: f64,

    /// Number of intervals (log grid) or points (linear grid).
    #[arg(long, default_value_t = 64)]
    pub t_count: usize,

    /// Grid kind: "log" or "linear".
    #[arg(long, default_value = "log")]
    pub t_kind: String,

    /// Grouping pattern applied to the grid, e.g. "4+25*2+4+6".
    #[arg(long)]
    pub pattern: Option<String>,

    /// Explicit interval width for every point (0 derives widths from the grid).
    #[arg(long, default_value_t = 0.0)]
    pub dx: f64,
}

impl GridParameters {
    /// Validate that all parameters make sense.
    pub fn validate(&self) -> Result<()> {
        if self.t_start < 0.0 {
            bail!("t_start ({}) must not be negative", self.t_start);
        }
        if self.t_end <= self.t_start {
            bail!("t_end ({}) must be greater than t_start ({})", self.t_end, self.t_start);
        }
        if self.t_count == 0 {
            bail!("t_count must be > 0");
        }
        if self.dx < 0.0 {
            bail!("dx ({}) must not be negative", self.dx);
        }
        Ok(())
    }

    pub fn build(&self) -> Result<TimeGrid> {
        let kind = GridKind::from(self.t_kind.as_str());
        let mut grid = TimeGrid::build(self.t_start, self.t_end, self.t_count, kind)?;
        if let Some(pattern) = &self.pattern {
            let pattern: GroupingPattern = pattern.parse()?;
            grid = grid.group(&pattern)?;
        }
        if self.dx > 0.0 {
            grid = grid.with_uniform_width(self.dx)?;
        }
        Ok(grid)
    }
}

#[derive(Debug, Args)]
pub struct NIslandParameters {
    /// Number of islands.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub islands: usize,

    /// Migration rate M.
    #[arg(short = 'M', long, default_value_t = 1.0)]
    pub migration: f64,

    /// Sample the two lineages from different islands.
    #[arg(long)]
    pub distinct: bool,
}

impl NIslandParameters {
    pub fn build_model(&self) -> Result<NIslandModel> {
        Ok(NIslandModel::new(self.islands, self.migration, !self.distinct)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_params() -> GridParameters {
        GridParameters {
            t_start: 0.0,
            t_end: 10.0,
            t_count: 10,
            t_kind: "log".into(),
            pattern: None,
            dx: 0.0,
        }
    }

    #[test]
    fn test_grid_parameters_build() {
        let grid = grid_params().build().unwrap();
        assert_eq!(grid.len(), 11);

        let mut params = grid_params();
        params.pattern = Some("2*4+2".into());
        params.dx = 0.5;
        let grid = params.build().unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.explicit_widths(), Some(&[0.5; 4][..]));
    }

    #[test]
    fn test_grid_parameters_validate() {
        assert!(grid_params().validate().is_ok());
        let mut params = grid_params();
        params.t_end = 0.0;
        assert!(params.validate().is_err());
        let mut params = grid_params();
        params.pattern = Some("20".into());
        assert!(params.build().is_err());
    }

    #[test]
    fn test_n_island_parameters() {
        let params = NIslandParameters { islands: 5, migration: 2.0, distinct: true };
        let model = params.build_model().unwrap();
        assert!(!model.same_island());
        let params = NIslandParameters { islands: 1, migration: 2.0, distinct: false };
        assert!(params.build_model().is_err());
    }
}
