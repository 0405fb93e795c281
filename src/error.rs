use thiserror::Error;

use crate::data::model::SubjectId;

// ---------------------------------------------------------------------------
// Dataset errors
// ---------------------------------------------------------------------------

/// Errors raised by the dataset core.
///
/// Every variant is reported at the point of the offending call; nothing is
/// retried and no placeholder values are substituted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// A recording does not fit its own axes, or does not share the
    /// dataset's time axis / repetition count.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("unknown subject: {0}")]
    UnknownSubject(SubjectId),

    /// Repetition index outside `[0, len)`.
    #[error("repetition {index} out of range (dataset has {len} repetitions)")]
    OutOfRange { index: i64, len: usize },

    #[error("unknown electrode {electrode} for subject {subject}")]
    UnknownElectrode { subject: SubjectId, electrode: u32 },

    #[error("no electrodes requested")]
    NoElectrodes,

    /// A statistic was requested over a group with zero pooled samples.
    #[error("experimenter group '{0}' has no samples")]
    EmptyGroup(String),

    #[error("subject {0} appears more than once")]
    DuplicateSubject(SubjectId),

    #[error("dataset contains no recordings")]
    EmptyDataset,

    #[error("invalid stimulus window: {0}")]
    InvalidWindow(String),

    /// The mock generator was configured with nothing to draw from.
    #[error("invalid mock configuration: {0}")]
    InvalidMock(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
