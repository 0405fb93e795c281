/// Data layer: core types, windowing, statistics, loading and mock data.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv          mock_stim_data()
///        │                                 │
///        ▼                                 │
///   ┌──────────┐                           │
///   │  loader   │  rows → Recording        │
///   └──────────┘                           │
///        │                                 │
///        ▼                                 ▼
///   ┌─────────────────┐
///   │ StimulusDataset │  subject → Recording, experimenter index
///   └─────────────────┘
///        │                         │
///        ▼                         ▼
///   ┌──────────┐             ┌──────────┐
///   │  filter   │ pre/during │  stats    │ mean/std/median
///   │           │ /post view │           │ per experimenter
///   └──────────┘             └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod mock;
pub mod model;
pub mod stats;
