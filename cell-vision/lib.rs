//! Imageproc-backed implementation of the cell segmentation primitives:
//! Gaussian smoothing, Otsu segmentation, external contour extraction and
//! overlay drawing.

pub mod builder;
pub mod config;
pub mod contours;
pub mod drawing;
pub mod error;
pub mod ops;
pub mod preprocessing;
pub mod threshold;

pub use builder::OpsBuilder;
pub use config::VisionConfig;
pub use error::{VisionError, VisionResult};
pub use ops::ImageprocOps;
