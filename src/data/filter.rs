use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::model::{Gender, StimulusDataset, SubjectMetadata};
use crate::config::WindowConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Stimulus windows: time-axis partition
// ---------------------------------------------------------------------------

/// One of the three segments of a recording relative to the stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StimulusWindow {
    Pre,
    During,
    Post,
}

impl StimulusWindow {
    pub const ALL: [StimulusWindow; 3] = [Self::Pre, Self::During, Self::Post];

    /// Whether a sample at time `t` belongs to this window.
    pub fn contains(self, t: f64, cfg: &WindowConfig) -> bool {
        match self {
            StimulusWindow::Pre => t < cfg.lower,
            StimulusWindow::During => t >= cfg.lower && t <= cfg.upper,
            StimulusWindow::Post => t > cfg.upper,
        }
    }
}

impl fmt::Display for StimulusWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StimulusWindow::Pre => write!(f, "pre-stimulus"),
            StimulusWindow::During => write!(f, "during-stimulus"),
            StimulusWindow::Post => write!(f, "post-stimulus"),
        }
    }
}

/// Index range of `time` that falls into `window`.
///
/// `time` must be strictly increasing, so each window is a contiguous run:
/// pre is a prefix, post a suffix, during whatever lies between.
/// Both boundaries belong to the during window.
pub fn window_range(time: &[f64], cfg: &WindowConfig, window: StimulusWindow) -> Range<usize> {
    let first_during = time.partition_point(|&t| t < cfg.lower);
    let first_post = time.partition_point(|&t| t <= cfg.upper).max(first_during);
    match window {
        StimulusWindow::Pre => 0..first_during,
        StimulusWindow::During => first_during..first_post,
        StimulusWindow::Post => first_post..time.len(),
    }
}

// ---------------------------------------------------------------------------
// Subject selection by metadata
// ---------------------------------------------------------------------------

/// Per-field selection of subjects.
/// A `None` field means "no constraint"; an empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectFilter {
    pub experimenters: Option<BTreeSet<String>>,
    pub genders: Option<BTreeSet<Gender>>,
}

impl SubjectFilter {
    /// Whether a subject's metadata passes every active constraint.
    pub fn matches(&self, meta: &SubjectMetadata) -> bool {
        let experimenter_ok = self
            .experimenters
            .as_ref()
            .map_or(true, |set| set.contains(&meta.experimenter));
        let gender_ok = self
            .genders
            .as_ref()
            .map_or(true, |set| set.contains(&meta.gender));
        experimenter_ok && gender_ok
    }
}

impl StimulusDataset {
    /// Sub-dataset of the subjects whose metadata passes `filter`.
    ///
    /// Fails with [`crate::DatasetError::EmptyDataset`] when no subject passes.
    pub fn select(&self, filter: &SubjectFilter) -> Result<StimulusDataset> {
        let kept = self
            .iter()
            .filter(|rec| filter.matches(rec.metadata()))
            .cloned();
        StimulusDataset::new(kept, *self.window_config())
    }
}
