//! Stimulus-window configuration.
//!
//! [`WindowConfig`] holds the two boundaries that split every recording's
//! time axis into pre-, during- and post-stimulus segments. The defaults are
//! the onset/offset of the visual stimulus in the original protocol.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Default stimulus onset in seconds.
pub const DEFAULT_STIMULUS_ONSET: f64 = 1.0;

/// Default stimulus offset in seconds.
pub const DEFAULT_STIMULUS_OFFSET: f64 = 1.1;

/// Boundaries of the stimulus window.
///
/// ```
/// use visual_stim::WindowConfig;
///
/// let cfg = WindowConfig {
///     upper: 1.5,   // longer stimulus
///     ..WindowConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
///
/// A sample at time `t` falls into
/// * pre-stimulus when `t < lower`,
/// * during-stimulus when `lower <= t <= upper`,
/// * post-stimulus when `t > upper`.
///
/// Both boundaries belong to the during window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Stimulus onset in seconds.
    ///
    /// Default: `1.0`.
    pub lower: f64,

    /// Stimulus offset in seconds.
    ///
    /// Default: `1.1`.
    pub upper: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lower: DEFAULT_STIMULUS_ONSET,
            upper: DEFAULT_STIMULUS_OFFSET,
        }
    }
}

impl WindowConfig {
    /// Check that both bounds are finite and `lower <= upper`.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(DatasetError::InvalidWindow(format!(
                "bounds must be finite, got [{}, {}]",
                self.lower, self.upper
            )));
        }
        if self.lower > self.upper {
            return Err(DatasetError::InvalidWindow(format!(
                "lower bound {} exceeds upper bound {}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }

    /// Read a window configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading window config {}", path.display()))?;
        let cfg: WindowConfig =
            serde_json::from_str(&text).context("parsing window config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol() {
        let cfg = WindowConfig::default();
        assert_eq!(cfg.lower, 1.0);
        assert_eq!(cfg.upper, 1.1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let cfg = WindowConfig { lower: 2.0, upper: 1.0 };
        assert!(matches!(cfg.validate(), Err(DatasetError::InvalidWindow(_))));
    }

    #[test]
    fn rejects_nan_bounds() {
        let cfg = WindowConfig { lower: f64::NAN, upper: 1.0 };
        assert!(matches!(cfg.validate(), Err(DatasetError::InvalidWindow(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: WindowConfig = serde_json::from_str(r#"{ "upper": 1.5 }"#).unwrap();
        assert_eq!(cfg.lower, 1.0);
        assert_eq!(cfg.upper, 1.5);
    }
}
