use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("map has no layers and no entities")]
    EmptyMap,

    #[error("calibration cache JSON is malformed: {0}")]
    InvalidCalibrationJson(#[from] serde_json::Error),

    #[error("unknown vacuum id: {0}")]
    UnknownVacuum(String),
}

pub type Result<T> = std::result::Result<T, AlignError>;
