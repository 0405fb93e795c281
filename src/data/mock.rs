use std::ops::RangeInclusive;

use log::info;
use ndarray::{Array1, Array3};
use rand::Rng;

use super::model::{Gender, Recording, StimulusDataset, SubjectId, SubjectMetadata};
use crate::config::WindowConfig;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Mock dataset configuration
// ---------------------------------------------------------------------------

/// Shape and metadata rosters for [`mock_stim_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockConfig {
    /// Number of subjects, drawn uniformly from this range.
    pub subjects: RangeInclusive<usize>,
    pub num_electrodes: usize,
    /// Time grid: `num_time_points` evenly spaced samples over `[0, duration]`.
    pub num_time_points: usize,
    pub duration: f64,
    pub num_repetitions: usize,
    /// Room temperature, integer °C drawn from `[min, max)`.
    pub room_temperature: (i32, i32),
    /// Room humidity, integer % drawn from `[min, max)`.
    pub room_humidity: (i32, i32),
    pub experimenters: Vec<String>,
    pub genders: Vec<Gender>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            subjects: 10..=20,
            num_electrodes: 10,
            num_time_points: 10_000,
            duration: 2.0,
            num_repetitions: 4,
            room_temperature: (20, 30),
            room_humidity: (30, 70),
            experimenters: ["Leonardo", "Donatello", "Michelangelo", "Raphael"]
                .map(String::from)
                .to_vec(),
            genders: vec![Gender::F, Gender::M],
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Build a dataset of uniformly random voltages in `[0, 1)` with random
/// per-subject metadata. Every subject shares one time grid and repetition
/// count, so the result satisfies the same invariants as real data.
pub fn mock_stim_data<R: Rng>(
    cfg: &MockConfig,
    windows: WindowConfig,
    rng: &mut R,
) -> Result<StimulusDataset> {
    if cfg.subjects.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }
    if cfg.experimenters.is_empty() {
        return Err(DatasetError::InvalidMock("experimenter roster is empty".into()));
    }
    if cfg.genders.is_empty() {
        return Err(DatasetError::InvalidMock("gender roster is empty".into()));
    }
    let num_electrodes = u32::try_from(cfg.num_electrodes).map_err(|_| {
        DatasetError::InvalidMock(format!("{} electrodes do not fit a u32 id", cfg.num_electrodes))
    })?;
    let num_subjects = rng.gen_range(cfg.subjects.clone());

    let electrodes: Vec<u32> = (0..num_electrodes).collect();
    let time = time_grid(cfg.duration, cfg.num_time_points);
    let shape = (cfg.num_electrodes, cfg.num_time_points, cfg.num_repetitions);

    let recordings = (0..num_subjects)
        .map(|i| {
            let metadata = random_metadata(cfg, i as SubjectId, rng);
            let voltages = Array3::from_shape_simple_fn(shape, || rng.gen::<f64>());
            Recording::new(electrodes.clone(), time.clone(), voltages, metadata)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "generated mock dataset: {num_subjects} subjects, shape {:?} each",
        shape
    );
    StimulusDataset::new(recordings, windows)
}

/// `n` evenly spaced points over `[0, duration]`, last point exactly `duration`.
fn time_grid(duration: f64, n: usize) -> Vec<f64> {
    let mut time = Array1::linspace(0.0, duration, n).to_vec();
    if n > 1 {
        time[n - 1] = duration;
    }
    time
}

// Rosters are checked non-empty by the caller.
fn random_metadata<R: Rng>(cfg: &MockConfig, subject_id: SubjectId, rng: &mut R) -> SubjectMetadata {
    let (t_lo, t_hi) = cfg.room_temperature;
    let (h_lo, h_hi) = cfg.room_humidity;
    SubjectMetadata {
        subject_id,
        room_temperature: f64::from(rng.gen_range(t_lo..t_hi.max(t_lo + 1))),
        room_humidity: f64::from(rng.gen_range(h_lo..h_hi.max(h_lo + 1))),
        experimenter: cfg.experimenters[rng.gen_range(0..cfg.experimenters.len())].clone(),
        gender: cfg.genders[rng.gen_range(0..cfg.genders.len())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small() -> MockConfig {
        MockConfig {
            subjects: 3..=5,
            num_electrodes: 4,
            num_time_points: 50,
            num_repetitions: 2,
            ..MockConfig::default()
        }
    }

    #[test]
    fn respects_configured_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cfg = small();
        let ds = mock_stim_data(&cfg, WindowConfig::default(), &mut rng).unwrap();

        assert!(cfg.subjects.contains(&ds.num_subjects()));
        assert_eq!(ds.num_repetitions(), 2);
        assert_eq!(ds.time().len(), 50);
        assert_eq!(ds.time()[0], 0.0);
        assert_eq!(*ds.time().last().unwrap(), 2.0);

        for rec in ds.iter() {
            let m = rec.metadata();
            assert!((20.0..30.0).contains(&m.room_temperature));
            assert!((30.0..70.0).contains(&m.room_humidity));
            assert!(cfg.experimenters.contains(&m.experimenter));
            assert_eq!(rec.voltages().dim(), (4, 50, 2));
            assert!(rec.voltages().iter().all(|v| (0.0..1.0).contains(v)));
        }
    }

    #[test]
    fn same_seed_same_data() {
        let cfg = small();
        let a = mock_stim_data(&cfg, WindowConfig::default(), &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        let b = mock_stim_data(&cfg, WindowConfig::default(), &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(a.num_subjects(), b.num_subjects());
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x == y));
    }

    #[test]
    fn empty_subject_range_is_rejected() {
        #[allow(clippy::reversed_empty_ranges)]
        let cfg = MockConfig {
            subjects: 5..=4,
            ..small()
        };
        let err = mock_stim_data(&cfg, WindowConfig::default(), &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err, DatasetError::EmptyDataset);
    }

    #[test]
    fn grid_ends_exactly_at_duration() {
        let time = time_grid(2.0, 10_000);
        assert_eq!(time[0], 0.0);
        assert_eq!(time[9_999], 2.0);
        assert!(time.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(time_grid(2.0, 1), vec![0.0]);
        assert!(time_grid(2.0, 0).is_empty());
    }

    #[test]
    fn empty_rosters_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let no_experimenters = MockConfig {
            experimenters: Vec::new(),
            ..small()
        };
        assert!(matches!(
            mock_stim_data(&no_experimenters, WindowConfig::default(), &mut rng),
            Err(DatasetError::InvalidMock(_))
        ));

        let no_genders = MockConfig {
            genders: Vec::new(),
            ..small()
        };
        assert!(matches!(
            mock_stim_data(&no_genders, WindowConfig::default(), &mut rng),
            Err(DatasetError::InvalidMock(_))
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn electrode_count_must_fit_an_id() {
        let cfg = MockConfig {
            num_electrodes: u32::MAX as usize + 1,
            ..small()
        };
        let err = mock_stim_data(&cfg, WindowConfig::default(), &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidMock(_)), "{err}");
    }
}
