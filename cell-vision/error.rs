use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisionError {
    #[error("Invalid blur kernel size: {0} (must be odd and at least 1)")]
    InvalidKernelSize(u32),
    #[error("Invalid blur sigma: {0} (must be finite and > 0)")]
    InvalidSigma(f32),
    #[error("Invalid stroke width: {0} (must be 1-{max})", max = crate::config::MAX_STROKE_WIDTH)]
    InvalidStrokeWidth(u32),
    #[error("Invalid label scale: {0} (must be finite and > 0)")]
    InvalidLabelScale(f32),
    #[error("Label font could not be loaded: {0}")]
    InvalidFont(String),
    #[error("Configuration (de)serialization failed: {0}")]
    Serialization(String),
}

pub type VisionResult<T> = Result<T, VisionError>;
