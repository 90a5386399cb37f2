//! Four-panel SVG chart of a session.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┐
//! │ temperature / sample │ state distribution   │
//! ├──────────────────────┼──────────────────────┤
//! │ interval / sample    │ jitter histogram     │
//! └──────────────────────┴──────────────────────┘
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{RenderContext, Renderer};
use crate::data::{intervals, state_label, AnalysisRecord, Sample};
use crate::error::RenderError;

/// Firmware temperature thresholds, drawn as reference lines.
const WARNING_TEMP: f64 = 25.0;
const CRITICAL_TEMP: f64 = 28.0;

const JITTER_BINS: usize = 20;
const CHART_SIZE: (u32, u32) = (1500, 1000);

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

/// Writes `timing_analysis_<stamp>.svg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChartRenderer;

impl Renderer for ChartRenderer {
    fn name(&self) -> &str {
        "chart"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, RenderError> {
        let path = ctx
            .output_dir
            .join(format!("timing_analysis_{}.svg", ctx.file_stamp()));
        draw(&path, ctx).map_err(|e| RenderError::Chart(e.to_string()))?;
        Ok(path)
    }
}

fn draw(path: &Path, ctx: &RenderContext<'_>) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "Embedded System Timing Analysis",
        ("sans-serif", 28).into_font(),
    )?;
    let panels = root.split_evenly((2, 2));

    let target = ctx.record.communication_intervals.target as f64;
    let intervals = intervals(ctx.samples);

    draw_temperature(&panels[0], ctx.samples)?;
    draw_states(&panels[1], ctx.record)?;
    draw_intervals(&panels[2], &intervals, target)?;
    draw_jitter(&panels[3], &intervals, target)?;

    root.present()?;
    Ok(())
}

fn draw_temperature(area: &Area<'_>, samples: &[Sample]) -> DrawResult {
    let x_max = samples.len().saturating_sub(1).max(1) as f64;
    let (lo, hi) = padded_range(
        samples
            .iter()
            .map(|s| s.temperature)
            .chain([WARNING_TEMP, CRITICAL_TEMP]),
    );

    let mut chart = ChartBuilder::on(area)
        .caption("Temperature", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, lo..hi)?;
    chart
        .configure_mesh()
        .x_desc("Sample")
        .y_desc("Temperature (°C)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            samples
                .iter()
                .enumerate()
                .map(|(i, s)| (i as f64, s.temperature)),
            BLUE,
        ))?
        .label("Temperature")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    for (threshold, color, label) in [
        (WARNING_TEMP, YELLOW, "Warning threshold"),
        (CRITICAL_TEMP, RED, "Critical threshold"),
    ] {
        chart
            .draw_series(LineSeries::new(
                vec![(0.0, threshold), (x_max, threshold)],
                color,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_states(area: &Area<'_>, record: &AnalysisRecord) -> DrawResult {
    let labels: Vec<String> = record
        .state_transitions
        .keys()
        .map(|&state| state_label(state).into_owned())
        .collect();
    let counts: Vec<u32> = record
        .state_transitions
        .values()
        .map(|&count| count as u32)
        .collect();

    draw_bars(area, "State Distribution", "System state", &labels, &counts, GREEN)
}

fn draw_intervals(area: &Area<'_>, intervals: &[i64], target: f64) -> DrawResult {
    let x_max = intervals.len().max(1) as f64;
    let (lo, hi) = padded_range(intervals.iter().map(|&i| i as f64).chain([target]));

    let mut chart = ChartBuilder::on(area)
        .caption("Communication Intervals", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, lo..hi)?;
    chart
        .configure_mesh()
        .x_desc("Sample")
        .y_desc("Interval (ms)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            intervals
                .iter()
                .enumerate()
                .map(|(i, &v)| ((i + 1) as f64, v as f64)),
            GREEN,
        ))?
        .label("Interval")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .draw_series(LineSeries::new(vec![(0.0, target), (x_max, target)], RED))?
        .label(format!("Target ({} ms)", target))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_jitter(area: &Area<'_>, intervals: &[i64], target: f64) -> DrawResult {
    let jitter: Vec<f64> = intervals.iter().map(|&i| i as f64 - target).collect();
    let (labels, counts) = histogram(&jitter, JITTER_BINS);

    draw_bars(
        area,
        "Jitter Distribution",
        "Jitter (ms)",
        &labels,
        &counts,
        MAGENTA,
    )
}

fn draw_bars(
    area: &Area<'_>,
    caption: &str,
    x_desc: &str,
    labels: &[String],
    counts: &[u32],
    color: RGBColor,
) -> DrawResult {
    let max_count = counts.iter().copied().max().unwrap_or(0);
    let label_at = |i: u32| labels.get(i as usize).cloned().unwrap_or_default();

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0u32..labels.len().max(1) as u32).into_segmented(),
            0u32..max_count + 1,
        )?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Samples")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => label_at(*i),
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.mix(0.7).filled())
            .margin(10)
            .data(counts.iter().enumerate().map(|(i, &c)| (i as u32, c))),
    )?;
    Ok(())
}

/// Bucket `values` into `bins` equal-width bins, labelled by bin center.
fn histogram(values: &[f64], bins: usize) -> (Vec<String>, Vec<u32>) {
    if values.is_empty() {
        return (vec!["no data".to_string()], vec![0]);
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };

    let mut counts = vec![0u32; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let labels = (0..bins)
        .map(|i| format!("{:.0}", lo + width * (i as f64 + 0.5)))
        .collect();

    (labels, counts)
}

/// Min/max of `values` with a margin so flat series stay visible.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((hi - lo) * 0.1).max(1.0);
    (lo - pad, hi + pad)
}
