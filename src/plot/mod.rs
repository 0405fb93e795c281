/// Static chart output: electrode traces and experimenter-bias bars.
///
/// Charts are written with `plotters`; the backend is picked from the
/// output extension (`.png` → bitmap, `.svg` → SVG).
pub mod bias;
pub mod trace;

use std::path::Path;

use anyhow::{bail, Result};

pub use bias::{plot_experimenter_bias, write_bias_csv};
pub use trace::plot_electrode;

/// Height of one electrode panel / of the bar chart, in pixels.
pub const PANEL_HEIGHT: u32 = 300;
pub const CHART_WIDTH: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageFormat {
    Png,
    Svg,
}

pub(crate) fn image_format(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => Ok(ImageFormat::Png),
        "svg" => Ok(ImageFormat::Svg),
        other => bail!("Unsupported image extension: .{other} (use .png or .svg)"),
    }
}

/// `(min, max)` of `values`, widened when the span is zero so the axis
/// range is never empty.
pub(crate) fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let margin = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - margin, hi + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_backend_by_extension() {
        assert_eq!(image_format(Path::new("a.PNG")).unwrap(), ImageFormat::Png);
        assert_eq!(image_format(Path::new("b.svg")).unwrap(), ImageFormat::Svg);
        assert!(image_format(Path::new("c.pdf")).is_err());
    }

    #[test]
    fn flat_range_is_widened() {
        assert_eq!(padded_range([2.0, 2.0].into_iter()), (1.5, 2.5));
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = padded_range([0.0, 10.0].into_iter());
        assert!(lo < 0.0 && hi > 10.0);
    }
}
