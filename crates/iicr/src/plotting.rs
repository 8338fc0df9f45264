use std::path::Path;
use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::Palette99;

use iicr_grid::TimeGrid;
use iicr_empirical::IICRCurve;

use crate::parameters::{Parameters, Style};
use crate::pipeline::{AnalyticalResult, ScenarioResult};

/// Parse a color given as `#rrggbb` or by name (matplotlib short names
/// included). Unknown colors fall back to the palette entry `index`.
pub fn parse_color(name: &str, index: usize) -> RGBColor {
    let name = name.trim().to_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return RGBColor(r, g, b);
            }
        }
    }
    match name.as_str() {
        "k" | "black" => BLACK,
        "r" | "red" => RED,
        "g" | "green" => RGBColor(0, 128, 0),
        "b" | "blue" => BLUE,
        "c" | "cyan" => CYAN,
        "m" | "magenta" => MAGENTA,
        "y" | "yellow" => YELLOW,
        "w" | "white" => WHITE,
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "brown" => RGBColor(165, 42, 42),
        "grey" | "gray" => RGBColor(128, 128, 128),
        _ => {
            let c = Palette99::pick(index).to_rgba();
            RGBColor(c.0, c.1, c.2)
        }
    }
}

fn is_dashed(style: &Style) -> bool {
    matches!(style.linestyle.trim(), "--" | ":" | "-." | "dashed" | "dotted" | "dashdot")
}

/// Horizontal-then-vertical steps through `(t_i, r_i)`, one run per stretch
/// of defined rates.
pub fn step_runs(curve: &IICRCurve) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (i, &(t, rate)) in curve.points.iter().enumerate() {
        match rate {
            Some(r) => {
                current.push((t, r));
                let t_next = curve.points.get(i + 1).map_or(t, |p| p.0);
                current.push((t_next, r));
            }
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Move the origin of a curve to `x[1] / 5` so that its first step is
/// visible on a log axis.
pub fn log_axis_curve(curve: &IICRCurve) -> IICRCurve {
    match TimeGrid::try_from(curve.times()) {
        Ok(grid) => IICRCurve::new(grid.log_safe_times().into_iter().zip(curve.rates()).collect()),
        Err(_) => curve.clone(),
    }
}

/// Replace non-positive times by `floor` so they fit on a log axis.
fn log_safe(points: Vec<(f64, f64)>, floor: f64) -> Vec<(f64, f64)> {
    points.into_iter()
        .map(|(t, y)| (if t > 0.0 { t } else { floor }, y))
        .collect()
}

/// Draw empirical IICRs, the simulated histories and the analytical
/// n-island curves into one SVG file, in years and number of individuals.
pub fn plot_iicr<P: AsRef<Path>>(
    params: &Parameters,
    scenarios: &[ScenarioResult],
    analytical: &[AnalyticalResult],
    filename: P,
) -> Result<()> {
    let [x_min, x_max, y_min, y_max] = params.plot_params.plot_limits;
    let n0 = params.scale_params.n0;
    let g = params.scale_params.generation_time;
    let years = params.years_per_unit();

    let root = SVGBackend::new(filename.as_ref(), (1024, 640)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("IICR", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((x_min..x_max).log_scale(), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("time (years)")
        .y_desc("IICR")
        .x_label_formatter(&|x| format!("{:.0e}", x))
        .y_labels(10)
        .light_line_style(RGBColor(220, 220, 220))
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 16))
        .draw()?;

    for (i, scenario) in scenarios.iter().enumerate() {
        let color = parse_color(&scenario.style.color, i).mix(scenario.style.alpha);
        let line = color.stroke_width(2);
        let curve = log_axis_curve(&scenario.curve.scaled(years, n0));
        for (j, run) in step_runs(&curve).into_iter().enumerate() {
            let run = log_safe(run, x_min);
            let mut series = if is_dashed(&scenario.style) {
                chart.draw_series(DashedLineSeries::new(run, 8, 4, line))?
            } else {
                chart.draw_series(LineSeries::new(run, line))?
            };
            if j == 0 {
                series
                    .label(scenario.label.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
            }
        }

        if !params.plot_params.plot_real_ms_history.is_on() {
            continue;
        }
        if let Some(history) = &scenario.history {
            let steps: Vec<(f64, f64)> = history.steps(x_max / g).into_iter()
                .map(|(t, size)| (t * g, size))
                .collect();
            let points: Vec<(f64, f64)> = steps.windows(2)
                .flat_map(|w| [(w[0].0, w[0].1), (w[1].0, w[0].1)])
                .collect();
            let faded = color.mix(0.5).stroke_width(1);
            chart.draw_series(DashedLineSeries::new(log_safe(points, x_min), 6, 4, faded))?;
        }
    }

    for (i, result) in analytical.iter().enumerate() {
        let color = parse_color(&result.style.color, scenarios.len() + i).mix(result.style.alpha);
        let line = color.stroke_width(2);
        let points: Vec<(f64, f64)> = result.curve.scaled(years, n0).defined().collect();
        let mut series = if is_dashed(&result.style) {
            chart.draw_series(DashedLineSeries::new(points, 8, 4, line))?
        } else {
            chart.draw_series(LineSeries::new(points, line))?
        };
        series
            .label(result.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", 16).into_font())
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000", 0), RGBColor(255, 128, 0));
        assert_eq!(parse_color("Red", 0), RED);
        assert_eq!(parse_color("k", 0), BLACK);
        let fallback = Palette99::pick(3).to_rgba();
        assert_eq!(parse_color("#zz", 3), RGBColor(fallback.0, fallback.1, fallback.2));
    }

    #[test]
    fn test_step_runs_break_at_undefined() {
        let curve = IICRCurve::new(vec![
            (0.0, Some(1.0)),
            (1.0, Some(2.0)),
            (2.0, None),
            (3.0, Some(4.0)),
        ]);
        let runs = step_runs(&curve);
        assert_eq!(runs, vec![
            vec![(0.0, 1.0), (1.0, 1.0), (1.0, 2.0), (2.0, 2.0)],
            vec![(3.0, 4.0), (3.0, 4.0)],
        ]);
    }

    #[test]
    fn test_log_axis_curve() {
        let curve = IICRCurve::new(vec![(0.0, Some(1.0)), (10.0, None), (20.0, Some(2.0))]);
        let moved = log_axis_curve(&curve);
        assert_eq!(moved.points, vec![(2.0, Some(1.0)), (10.0, None), (20.0, Some(2.0))]);
        assert_eq!(curve.points[0].0, 0.0);
    }

    #[test]
    fn test_is_dashed() {
        let mut style = Style {
            color: "black".into(),
            linestyle: "--".into(),
            alpha: 1.0,
            label: String::new(),
        };
        assert!(is_dashed(&style));
        style.linestyle = "-".into();
        assert!(!is_dashed(&style));
        style.linestyle = ":".into();
        assert!(is_dashed(&style));
    }

    #[test]
    fn test_log_safe() {
        assert_eq!(log_safe(vec![(0.0, 1.0), (2.0, 3.0)], 0.5), vec![(0.5, 1.0), (2.0, 3.0)]);
    }
}
