use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("{left} ({left_len}) and {right} ({right_len}) must have the same length")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("swap rotation requires an even number of sails, got {0}")]
    OddSwapSize(usize),

    #[error("{sails} sails cannot cover {slots} rotation slots")]
    TooFewSails { sails: usize, slots: usize },

    #[error("repeats must be at least 1, got {0}")]
    InvalidRepeats(usize),

    #[error("unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: String },

    #[error("rotation size is locked at {locked}, cannot set {attempted} entries")]
    SizeLocked { locked: usize, attempted: usize },

    #[error("no race {number} in division {division}")]
    UnknownRace { division: String, number: u32 },

    #[error("unknown team handle {0}")]
    UnknownTeam(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RotationError>;
