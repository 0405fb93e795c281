//! # visual-stim
//!
//! Exploratory analysis of ePhys recordings from a visual-stimulus
//! experiment. Each subject contributes one `[electrode, time, repetition]`
//! voltage array tagged with the room conditions and the experimenter who
//! ran the session.
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use visual_stim::{mock_stim_data, MockConfig, WindowConfig};
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let data = mock_stim_data(&MockConfig::default(), WindowConfig::default(), &mut rng).unwrap();
//!
//! let traces = data.select_trace(0, 0, &[0, 1]).unwrap();
//! let bias = data.experimenter_statistics().unwrap();
//! let during = data.during_stimulus();
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod plot;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::WindowConfig;
pub use data::filter::{window_range, StimulusWindow, SubjectFilter};
pub use data::loader::{from_rows, load_file, save_file, to_rows, TraceRow};
pub use data::mock::{mock_stim_data, MockConfig};
pub use data::model::{
    ElectrodeTrace, Gender, Recording, StimulusDataset, SubjectId, SubjectMetadata,
};
pub use data::stats::Summary;
pub use error::DatasetError;
