use std::collections::BTreeMap;

use ndarray::ArrayView1;
use serde::Serialize;

use super::filter::StimulusWindow;
use super::model::StimulusDataset;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Summary statistics over a pooled sample collection
// ---------------------------------------------------------------------------

/// Mean, population standard deviation (`ddof = 0`) and median.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
}

impl Summary {
    /// Summarise `samples`. Returns `None` for an empty collection.
    pub fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        let pooled = ArrayView1::from(&samples[..]);
        let mean = pooled.mean()?;
        let std = pooled.std(0.0);

        samples.sort_unstable_by(|a, b| a.total_cmp(b));
        let n = samples.len();
        let median = if n % 2 == 1 {
            samples[n / 2]
        } else {
            0.5 * (samples[n / 2 - 1] + samples[n / 2])
        };

        Some(Self { mean, std, median })
    }
}

// ---------------------------------------------------------------------------
// Experimenter-grouped statistics
// ---------------------------------------------------------------------------

impl StimulusDataset {
    /// Every voltage sample of every subject recorded by `experimenter`,
    /// across all electrodes, time points and repetitions.
    pub fn pooled_samples(&self, experimenter: &str) -> Result<Vec<f64>> {
        let mut pooled = Vec::new();
        for &subject in self.subjects_for(experimenter) {
            pooled.extend(self.recording(subject)?.voltages().iter().copied());
        }
        Ok(pooled)
    }

    /// Summary of the pooled voltages of each experimenter, keyed by name.
    ///
    /// Subjects are visited in ascending id order, so the result does not
    /// depend on the order recordings were supplied in.
    pub fn experimenter_statistics(&self) -> Result<BTreeMap<String, Summary>> {
        self.experimenters()
            .map(|name| {
                let summary = Summary::from_samples(self.pooled_samples(name)?)
                    .ok_or_else(|| DatasetError::EmptyGroup(name.to_string()))?;
                Ok((name.to_string(), summary))
            })
            .collect()
    }

    /// [`experimenter_statistics`](Self::experimenter_statistics) on each
    /// stimulus window.
    pub fn window_statistics(
        &self,
    ) -> Result<BTreeMap<StimulusWindow, BTreeMap<String, Summary>>> {
        StimulusWindow::ALL
            .into_iter()
            .map(|w| Ok((w, self.window(w).experimenter_statistics()?)))
            .collect()
    }
}
