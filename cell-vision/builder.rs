use crate::config::VisionConfig;
use crate::error::VisionResult;
use crate::ops::ImageprocOps;

/// Fluent builder for `ImageprocOps`
#[derive(Debug, Clone)]
pub struct OpsBuilder {
    kernel_size: u32,
    sigma: Option<f32>,
    stroke_width: u32,
    label_scale: f32,
}

impl Default for OpsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::from_config(VisionConfig::default())
    }

    /// Set the Gaussian kernel side (odd)
    pub fn kernel_size(mut self, kernel_size: u32) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    /// Fix sigma instead of deriving it from the kernel size
    pub fn sigma(mut self, sigma: f32) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Derive sigma from the kernel size
    pub fn auto_sigma(mut self) -> Self {
        self.sigma = None;
        self
    }

    pub fn stroke_width(mut self, width: u32) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn label_scale(mut self, scale: f32) -> Self {
        self.label_scale = scale;
        self
    }

    /// Apply the microscopy preset
    pub fn preset_microscopy(self) -> Self {
        Self::from_config(VisionConfig::microscopy_preset())
    }

    /// Apply the fine detail preset
    pub fn preset_fine_detail(self) -> Self {
        Self::from_config(VisionConfig::fine_detail_preset())
    }

    /// Build the validated `ImageprocOps`
    pub fn build(self) -> VisionResult<ImageprocOps> {
        ImageprocOps::new(self.to_config())
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.clone().to_config().summary()
    }

    /// Create a builder from an existing `VisionConfig`
    pub fn from_config(config: VisionConfig) -> Self {
        Self {
            kernel_size: config.kernel_size,
            sigma: config.sigma,
            stroke_width: config.stroke_width,
            label_scale: config.label_scale,
        }
    }

    /// Convert the builder into a `VisionConfig`
    pub fn to_config(self) -> VisionConfig {
        VisionConfig {
            kernel_size: self.kernel_size,
            sigma: self.sigma,
            stroke_width: self.stroke_width,
            label_scale: self.label_scale,
            name: None,
            description: None,
        }
    }
}
