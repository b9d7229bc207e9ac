use std::path::PathBuf;

use cell_vision::VisionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input could not be opened or decoded; nothing has been written.
    #[error("Image not found or undecodable at {}: {reason}", .path.display())]
    ImageNotFound { path: PathBuf, reason: String },
    #[error("Vision configuration error: {0}")]
    Vision(#[from] VisionError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write annotated image {}: {source}", .path.display())]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write report {}: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
