use crate::builder::OpsBuilder;
use crate::error::{VisionError, VisionResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest accepted boundary stroke width in pixels
pub const MAX_STROKE_WIDTH: u32 = 16;

/// Settings for the imageproc-backed stages
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VisionConfig {
    /// Side of the square Gaussian kernel
    pub kernel_size: u32,
    /// Gaussian sigma; derived from `kernel_size` when absent
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub sigma: Option<f32>,
    /// Boundary stroke width in pixels
    pub stroke_width: u32,
    /// Label size relative to a 21 px glyph cell
    pub label_scale: f32,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            sigma: None,
            stroke_width: 2,
            label_scale: 0.4,
            name: None,
            description: None,
        }
    }
}

impl VisionConfig {
    /// Default settings, matching the standard microscopy run
    pub fn new() -> Self {
        Self::default()
    }

    /// Stronger smoothing and bolder overlays for noisy, low magnification frames
    pub fn microscopy_preset() -> Self {
        Self {
            kernel_size: 7,
            sigma: None,
            stroke_width: 3,
            label_scale: 0.6,
            name: Some("Microscopy".to_string()),
            description: Some("Heavier smoothing for noisy widefield frames".to_string()),
        }
    }

    /// Light smoothing and thin overlays for small, densely packed cells
    pub fn fine_detail_preset() -> Self {
        Self {
            kernel_size: 3,
            sigma: None,
            stroke_width: 1,
            label_scale: 0.3,
            name: Some("Fine detail".to_string()),
            description: Some("Minimal smoothing to keep neighbouring cells apart".to_string()),
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Convert to OpsBuilder for further customization
    pub fn to_builder(self) -> OpsBuilder {
        OpsBuilder::from_config(self)
    }

    /// Sigma actually used by the blur stage
    pub fn effective_sigma(&self) -> f32 {
        self.sigma
            .unwrap_or_else(|| crate::preprocessing::sigma_for_kernel(self.kernel_size))
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "VisionConfig: kernel={}x{}, sigma={:.2}{}, stroke={}px, label_scale={:.2}",
            self.kernel_size,
            self.kernel_size,
            self.effective_sigma(),
            if self.sigma.is_none() { " (auto)" } else { "" },
            self.stroke_width,
            self.label_scale
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> VisionResult<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(VisionError::InvalidKernelSize(self.kernel_size));
        }
        if let Some(sigma) = self.sigma {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(VisionError::InvalidSigma(sigma));
            }
        }
        if self.stroke_width == 0 || self.stroke_width > MAX_STROKE_WIDTH {
            return Err(VisionError::InvalidStrokeWidth(self.stroke_width));
        }
        if !self.label_scale.is_finite() || self.label_scale <= 0.0 {
            return Err(VisionError::InvalidLabelScale(self.label_scale));
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> VisionResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisionError::Serialization(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> VisionResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| VisionError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> VisionResult<String> {
        toml::to_string_pretty(self).map_err(|e| VisionError::Serialization(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> VisionResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| VisionError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
