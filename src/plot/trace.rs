use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{image_format, padded_range, ImageFormat, CHART_WIDTH, PANEL_HEIGHT};
use crate::color::ColorMap;
use crate::config::WindowConfig;
use crate::data::model::{ElectrodeTrace, StimulusDataset, SubjectId};

// ---------------------------------------------------------------------------
// Electrode trace figure
// ---------------------------------------------------------------------------

/// Plot voltage vs. time of `electrodes` for one subject and repetition.
///
/// One subplot per electrode, stacked vertically, with the stimulus window
/// boundaries marked. Input validation is `select_trace`'s.
pub fn plot_electrode(
    dataset: &StimulusDataset,
    subject: SubjectId,
    repetition: i64,
    electrodes: &[u32],
    out: &Path,
) -> Result<()> {
    let traces = dataset
        .select_trace(subject, repetition, electrodes)
        .with_context(|| format!("selecting traces of subject {subject}"))?;
    if traces.iter().all(ElectrodeTrace::is_empty) {
        bail!("subject {subject} has no samples to plot");
    }

    let title = format!("Subject {subject}, repetition {repetition}");
    let size = (CHART_WIDTH, PANEL_HEIGHT * traces.len() as u32 + 40);
    let windows = *dataset.window_config();

    match image_format(out)? {
        ImageFormat::Png => {
            draw_traces(BitMapBackend::new(out, size).into_drawing_area(), &title, &traces, &windows)?
        }
        ImageFormat::Svg => {
            draw_traces(SVGBackend::new(out, size).into_drawing_area(), &title, &traces, &windows)?
        }
    }
    info!("wrote electrode plot to {}", out.display());
    Ok(())
}

fn draw_traces<DB>(
    root: DrawingArea<DB, Shift>,
    title: &str,
    traces: &[ElectrodeTrace],
    windows: &WindowConfig,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", 24))?;
    let panels = root.split_evenly((traces.len(), 1));
    let colors = ColorMap::new(traces.iter().map(|t| t.electrode));

    let (t_min, t_max) = padded_range(traces.iter().flat_map(|t| t.points.iter().map(|p| p.0)));

    for (panel, trace) in panels.iter().zip(traces) {
        let (v_min, v_max) = padded_range(trace.points.iter().map(|p| p.1));
        let color = colors.color_for(&trace.electrode);

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("Electrode {}", trace.electrode), ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(t_min..t_max, v_min..v_max)?;

        chart
            .configure_mesh()
            .x_desc("Time (s)")
            .y_desc("Voltage")
            .draw()?;

        chart.draw_series(LineSeries::new(
            trace.points.iter().copied(),
            ShapeStyle::from(&color).stroke_width(1),
        ))?;

        // Stimulus onset / offset.
        for bound in [windows.lower, windows.upper] {
            if bound > t_min && bound < t_max {
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(bound, v_min), (bound, v_max)],
                    BLACK.mix(0.5),
                )))?;
            }
        }
    }

    root.present()?;
    Ok(())
}
