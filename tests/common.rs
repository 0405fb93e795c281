/// Shared helpers for building small datasets.
use ndarray::Array3;
use visual_stim::{Gender, Recording, StimulusDataset, SubjectId, SubjectMetadata, WindowConfig};

/// The time axis used to check window boundaries.
#[allow(unused)]
pub const BOUNDARY_TIME: [f64; 7] = [0.0, 0.5, 1.0, 1.05, 1.1, 1.5, 2.0];

pub fn metadata(subject: SubjectId, experimenter: &str) -> SubjectMetadata {
    SubjectMetadata {
        subject_id: subject,
        room_temperature: 20.0 + f64::from(subject % 10),
        room_humidity: 30.0 + f64::from(subject % 40),
        experimenter: experimenter.to_string(),
        gender: if subject % 2 == 0 { Gender::F } else { Gender::M },
    }
}

/// Recording with electrodes `0..n_electrodes` and voltages from `f(e, t, r)`.
pub fn recording<F>(
    subject: SubjectId,
    experimenter: &str,
    time: &[f64],
    n_electrodes: usize,
    n_repetitions: usize,
    f: F,
) -> Recording
where
    F: Fn(usize, usize, usize) -> f64,
{
    let voltages = Array3::from_shape_fn((n_electrodes, time.len(), n_repetitions), |(e, t, r)| {
        f(e, t, r)
    });
    Recording::new(
        (0..n_electrodes as u32).collect(),
        time.to_vec(),
        voltages,
        metadata(subject, experimenter),
    )
    .unwrap()
}

/// Uniform time grid of `n` points over `[0, 2]`.
#[allow(unused)]
pub fn grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| 2.0 * i as f64 / (n - 1) as f64).collect()
}

/// Four subjects split between two experimenters, deterministic voltages.
#[allow(unused)]
pub fn small_dataset() -> StimulusDataset {
    let time = BOUNDARY_TIME;
    let recs = vec![
        recording(0, "Leonardo", &time, 3, 2, |e, t, r| (e + t + r) as f64),
        recording(1, "Raphael", &time, 3, 2, |e, t, r| (e * t) as f64 - r as f64),
        recording(2, "Leonardo", &time, 3, 2, |e, t, _| 0.1 * (e as f64 - t as f64)),
        recording(3, "Raphael", &time, 3, 2, |_, t, r| (t * t + r) as f64),
    ];
    StimulusDataset::new(recs, WindowConfig::default()).unwrap()
}
