use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use ndarray::{s, Array3, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::filter::{window_range, StimulusWindow};
use crate::config::WindowConfig;
use crate::error::{DatasetError, Result};

/// Subject identifiers are small non-negative integers (the rat number).
pub type SubjectId = u32;

// ---------------------------------------------------------------------------
// SubjectMetadata – the tags attached to every recording
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    F,
    M,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::F => write!(f, "F"),
            Gender::M => write!(f, "M"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "F" | "f" => Ok(Gender::F),
            "M" | "m" => Ok(Gender::M),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

/// Per-subject recording conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetadata {
    pub subject_id: SubjectId,
    /// Room temperature in °C.
    pub room_temperature: f64,
    /// Relative room humidity in %.
    pub room_humidity: f64,
    /// Name of the person who ran the session.
    pub experimenter: String,
    pub gender: Gender,
}

// ---------------------------------------------------------------------------
// Recording – one subject's electrode × time × repetition array
// ---------------------------------------------------------------------------

/// A single subject's voltages, shape `[electrode, time, repetition]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    electrodes: Vec<u32>,
    time: Vec<f64>,
    voltages: Array3<f64>,
    metadata: SubjectMetadata,
}

impl Recording {
    /// Wrap a voltage array together with its axis labels.
    ///
    /// Fails with [`DatasetError::ShapeMismatch`] when the array shape does
    /// not equal `(electrodes.len(), time.len(), _)`, when electrode ids
    /// repeat, or when the time axis is not strictly increasing.
    pub fn new(
        electrodes: Vec<u32>,
        time: Vec<f64>,
        voltages: Array3<f64>,
        metadata: SubjectMetadata,
    ) -> Result<Self> {
        let (n_elec, n_time, _n_rep) = voltages.dim();
        let subject = metadata.subject_id;

        if n_elec != electrodes.len() || n_time != time.len() {
            return Err(DatasetError::ShapeMismatch(format!(
                "subject {subject}: array shape {:?} does not match {} electrodes × {} time points",
                voltages.dim(),
                electrodes.len(),
                time.len()
            )));
        }

        let mut sorted = electrodes.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(DatasetError::ShapeMismatch(format!(
                "subject {subject}: duplicate electrode ids"
            )));
        }

        // Also rejects NaN, since NaN < x is false.
        if !time.windows(2).all(|w| w[0] < w[1]) {
            return Err(DatasetError::ShapeMismatch(format!(
                "subject {subject}: time axis is not strictly increasing"
            )));
        }

        Ok(Self {
            electrodes,
            time,
            voltages,
            metadata,
        })
    }

    pub fn subject_id(&self) -> SubjectId {
        self.metadata.subject_id
    }

    pub fn metadata(&self) -> &SubjectMetadata {
        &self.metadata
    }

    pub fn electrodes(&self) -> &[u32] {
        &self.electrodes
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn voltages(&self) -> &Array3<f64> {
        &self.voltages
    }

    pub fn num_repetitions(&self) -> usize {
        self.voltages.len_of(Axis(2))
    }

    /// Position of an electrode id along the electrode axis.
    pub fn electrode_index(&self, electrode: u32) -> Option<usize> {
        self.electrodes.iter().position(|&e| e == electrode)
    }

    /// Voltage trace of one electrode in one repetition, by axis position.
    pub fn trace(&self, electrode_idx: usize, repetition: usize) -> ArrayView1<'_, f64> {
        self.voltages.slice(s![electrode_idx, .., repetition])
    }

    /// Copy of this recording keeping only the time points in `range`.
    fn restrict_time(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            electrodes: self.electrodes.clone(),
            time: self.time[range.clone()].to_vec(),
            voltages: self.voltages.slice(s![.., range, ..]).to_owned(),
            metadata: self.metadata.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ElectrodeTrace – output of `select_trace`
// ---------------------------------------------------------------------------

/// Voltage over time for one electrode in one repetition.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectrodeTrace {
    pub electrode: u32,
    /// `(time, voltage)` pairs in time order.
    pub points: Vec<(f64, f64)>,
}

impl ElectrodeTrace {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// StimulusDataset – all subjects of one experiment
// ---------------------------------------------------------------------------

/// Every subject's recording, keyed by subject id, sharing one sampling grid.
#[derive(Debug, Clone)]
pub struct StimulusDataset {
    recordings: BTreeMap<SubjectId, Recording>,
    time: Vec<f64>,
    num_repetitions: usize,
    /// experimenter name → subjects they recorded (ascending ids).
    experimenter_index: BTreeMap<String, Vec<SubjectId>>,
    windows: WindowConfig,
}

impl StimulusDataset {
    /// Build a dataset and its experimenter index.
    ///
    /// All recordings must share the same time axis and repetition count,
    /// and subject ids must be unique.
    pub fn new<I>(recordings: I, windows: WindowConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Recording>,
    {
        windows.validate()?;

        let mut by_subject: BTreeMap<SubjectId, Recording> = BTreeMap::new();
        let mut reference: Option<(SubjectId, Vec<f64>, usize)> = None;

        for rec in recordings {
            let id = rec.subject_id();
            // The first recording defines the shared axes.
            let (ref_id, time, n_rep) = reference
                .get_or_insert_with(|| (id, rec.time.clone(), rec.num_repetitions()));
            if rec.time != *time {
                return Err(DatasetError::ShapeMismatch(format!(
                    "subject {id} has a different time axis than subject {ref_id} \
                     ({} vs {} points)",
                    rec.time.len(),
                    time.len()
                )));
            }
            if rec.num_repetitions() != *n_rep {
                return Err(DatasetError::ShapeMismatch(format!(
                    "subject {id} has {} repetitions, subject {ref_id} has {n_rep}",
                    rec.num_repetitions()
                )));
            }
            if by_subject.insert(id, rec).is_some() {
                return Err(DatasetError::DuplicateSubject(id));
            }
        }

        let Some((_, time, num_repetitions)) = reference else {
            return Err(DatasetError::EmptyDataset);
        };

        let mut experimenter_index: BTreeMap<String, Vec<SubjectId>> = BTreeMap::new();
        for (id, rec) in &by_subject {
            experimenter_index
                .entry(rec.metadata.experimenter.clone())
                .or_default()
                .push(*id);
        }

        debug!(
            "built dataset: {} subjects, {} time points, {} repetitions, {} experimenters",
            by_subject.len(),
            time.len(),
            num_repetitions,
            experimenter_index.len()
        );

        Ok(Self {
            recordings: by_subject,
            time,
            num_repetitions,
            experimenter_index,
            windows,
        })
    }

    /// Number of subjects.
    pub fn num_subjects(&self) -> usize {
        self.recordings.len()
    }

    pub fn num_repetitions(&self) -> usize {
        self.num_repetitions
    }

    /// The shared time axis in seconds.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn window_config(&self) -> &WindowConfig {
        &self.windows
    }

    /// Distinct experimenter names, sorted.
    pub fn experimenters(&self) -> impl Iterator<Item = &str> {
        self.experimenter_index.keys().map(String::as_str)
    }

    /// Subjects recorded by `experimenter`, ascending. Empty if unknown.
    pub fn subjects_for(&self, experimenter: &str) -> &[SubjectId] {
        self.experimenter_index
            .get(experimenter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn recording(&self, subject: SubjectId) -> Result<&Recording> {
        self.recordings
            .get(&subject)
            .ok_or(DatasetError::UnknownSubject(subject))
    }

    /// Recordings in ascending subject order.
    pub fn iter(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.values()
    }

    pub fn subject_ids(&self) -> impl Iterator<Item = SubjectId> + '_ {
        self.recordings.keys().copied()
    }

    /// `(time, voltage)` pairs of each requested electrode for one subject
    /// and repetition, in the order the electrodes were given.
    ///
    /// `repetition` is signed so that negative indices are reported as
    /// [`DatasetError::OutOfRange`] instead of wrapping.
    pub fn select_trace(
        &self,
        subject: SubjectId,
        repetition: i64,
        electrodes: &[u32],
    ) -> Result<Vec<ElectrodeTrace>> {
        let rec = self.recording(subject)?;

        let rep = usize::try_from(repetition)
            .ok()
            .filter(|&r| r < self.num_repetitions)
            .ok_or(DatasetError::OutOfRange {
                index: repetition,
                len: self.num_repetitions,
            })?;

        if electrodes.is_empty() {
            return Err(DatasetError::NoElectrodes);
        }

        electrodes
            .iter()
            .map(|&electrode| {
                let idx = rec
                    .electrode_index(electrode)
                    .ok_or(DatasetError::UnknownElectrode { subject, electrode })?;
                let points = self
                    .time
                    .iter()
                    .copied()
                    .zip(rec.trace(idx, rep).iter().copied())
                    .collect();
                Ok(ElectrodeTrace { electrode, points })
            })
            .collect()
    }

    /// Copy of the dataset restricted to one stimulus window.
    pub fn window(&self, window: StimulusWindow) -> StimulusDataset {
        let range = window_range(&self.time, &self.windows, window);
        debug!(
            "{window} window: time points {}..{} of {}",
            range.start,
            range.end,
            self.time.len()
        );
        let recordings = self
            .recordings
            .iter()
            .map(|(id, rec)| (*id, rec.restrict_time(range.clone())))
            .collect();
        StimulusDataset {
            recordings,
            time: self.time[range].to_vec(),
            num_repetitions: self.num_repetitions,
            experimenter_index: self.experimenter_index.clone(),
            windows: self.windows,
        }
    }

    /// Samples with `time < lower`.
    pub fn pre_stimulus(&self) -> StimulusDataset {
        self.window(StimulusWindow::Pre)
    }

    /// Samples with `lower <= time <= upper`.
    pub fn during_stimulus(&self) -> StimulusDataset {
        self.window(StimulusWindow::During)
    }

    /// Samples with `time > upper`.
    pub fn post_stimulus(&self) -> StimulusDataset {
        self.window(StimulusWindow::Post)
    }
}
