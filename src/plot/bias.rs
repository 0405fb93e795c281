use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{image_format, padded_range, ImageFormat, CHART_WIDTH, PANEL_HEIGHT};
use crate::color::ColorMap;
use crate::data::stats::Summary;

const STATISTICS: [&str; 3] = ["mean", "std", "median"];
const BAR_WIDTH: f64 = 0.25;

fn statistic(summary: &Summary, name: &str) -> f64 {
    match name {
        "mean" => summary.mean,
        "std" => summary.std,
        _ => summary.median,
    }
}

// ---------------------------------------------------------------------------
// Experimenter bias bar chart
// ---------------------------------------------------------------------------

/// Grouped bar chart of mean / std / median per experimenter.
pub fn plot_experimenter_bias(stats: &BTreeMap<String, Summary>, out: &Path) -> Result<()> {
    if stats.is_empty() {
        bail!("no experimenter statistics to plot");
    }
    let size = (CHART_WIDTH, PANEL_HEIGHT * 2);
    match image_format(out)? {
        ImageFormat::Png => draw_bias(BitMapBackend::new(out, size).into_drawing_area(), stats)?,
        ImageFormat::Svg => draw_bias(SVGBackend::new(out, size).into_drawing_area(), stats)?,
    }
    info!("wrote experimenter bias chart to {}", out.display());
    Ok(())
}

fn draw_bias<DB>(root: DrawingArea<DB, Shift>, stats: &BTreeMap<String, Summary>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let names: Vec<&str> = stats.keys().map(String::as_str).collect();
    let n_groups = names.len();
    let (lo, hi) = padded_range(
        stats
            .values()
            .flat_map(|s| STATISTICS.map(|k| statistic(s, k)))
            .chain(std::iter::once(0.0)),
    );

    // Group g is centred on x = g.
    let mut chart = ChartBuilder::on(&root)
        .caption("Recording statistics per experimenter", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n_groups as f64 - 0.5), lo.min(0.0)..hi)?;

    let label_for = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 {
            names.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n_groups)
        .x_label_formatter(&label_for)
        .y_desc("Voltage")
        .draw()?;

    let colors = ColorMap::new(STATISTICS);
    for (k, name) in STATISTICS.iter().enumerate() {
        let color = colors.color_for(name);
        let offset = (k as f64 - 1.0) * BAR_WIDTH;
        chart
            .draw_series(stats.values().enumerate().map(|(g, s)| {
                let x0 = g as f64 + offset - BAR_WIDTH / 2.0;
                Rectangle::new(
                    [(x0, 0.0), (x0 + BAR_WIDTH, statistic(s, name))],
                    color.filled(),
                )
            }))?
            .label(*name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Write the statistics table as CSV: `experimenter,mean,std,median`.
pub fn write_bias_csv(stats: &BTreeMap<String, Summary>, out: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(out).context("creating statistics CSV")?;
    writer
        .write_record(["experimenter", "mean", "std", "median"])
        .context("writing CSV header")?;
    for (name, s) in stats {
        writer
            .write_record([
                name.clone(),
                s.mean.to_string(),
                s.std.to_string(),
                s.median.to_string(),
            ])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing statistics CSV")?;
    info!("wrote experimenter statistics to {}", out.display());
    Ok(())
}
