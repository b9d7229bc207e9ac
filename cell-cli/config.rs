use std::path::{Path, PathBuf};

use cell_core::{DEFAULT_HIGHLIGHT, Highlight};
use cell_vision::VisionConfig;

use crate::error::{AnalysisError, AnalysisResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT: &str = "data/focal9.tif";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ANNOTATED_FILE: &str = "annotated_cells.png";
pub const DEFAULT_REPORT_FILE: &str = "cell_features.csv";

/// Everything one run needs: where to read, where to write, and how to draw.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    pub input: PathBuf,
    /// Created on demand; an existing directory is reused
    pub output_dir: PathBuf,
    pub annotated_file: String,
    pub report_file: String,
    /// RGB overlay colour for boundaries and labels
    pub highlight: [u8; 3],
    /// Feature extraction workers, 0 = one per CPU
    pub n_threads: usize,
    pub vision: VisionConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            annotated_file: DEFAULT_ANNOTATED_FILE.to_string(),
            report_file: DEFAULT_REPORT_FILE.to_string(),
            highlight: DEFAULT_HIGHLIGHT,
            n_threads: 0,
            vision: VisionConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn highlight(&self) -> Highlight {
        image::Rgb(self.highlight)
    }

    pub fn annotated_path(&self) -> PathBuf {
        self.output_dir.join(&self.annotated_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        self.vision.validate()?;
        for (field, name) in [("annotated_file", &self.annotated_file), ("report_file", &self.report_file)] {
            if name.is_empty() || Path::new(name).components().count() != 1 {
                return Err(AnalysisError::Config(format!(
                    "{field} must be a plain file name, got {name:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "AnalysisConfig: input={}, output_dir={}, threads={}, {}",
            self.input.display(),
            self.output_dir.display(),
            if self.n_threads == 0 { "auto".to_string() } else { self.n_threads.to_string() },
            self.vision.summary()
        )
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("cannot read {}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| AnalysisError::Config(format!("cannot write {}: {e}", path.display())))
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> AnalysisResult<String> {
        toml::to_string_pretty(self).map_err(|e| AnalysisError::Config(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> AnalysisResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> AnalysisResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalysisError::Config(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AnalysisConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.annotated_path(), PathBuf::from("output/annotated_cells.png"));
        assert_eq!(cfg.report_path(), PathBuf::from("output/cell_features.csv"));
        assert_eq!(cfg.highlight(), image::Rgb([0, 255, 0]));
    }

    #[test]
    fn test_rejects_nested_file_names() {
        let mut cfg = AnalysisConfig::default();
        cfg.report_file = "../escape.csv".to_string();
        assert!(matches!(cfg.validate(), Err(AnalysisError::Config(_))));
        cfg.report_file = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_vision_errors_propagate() {
        let mut cfg = AnalysisConfig::default();
        cfg.vision.kernel_size = 8;
        assert!(matches!(cfg.validate(), Err(AnalysisError::Vision(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_round_trip() {
        let mut cfg = AnalysisConfig::new("plates/a1.tif", "results");
        cfg.highlight = [255, 0, 255];
        cfg.n_threads = 3;
        let back = AnalysisConfig::from_toml(&cfg.to_toml().unwrap()).unwrap();
        assert_eq!(cfg, back);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml() {
        let cfg = AnalysisConfig::from_toml(
            r#"
            output_dir = "runs/today"

            [vision]
            stroke_width = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("runs/today"));
        assert_eq!(cfg.vision.stroke_width, 3);
        assert_eq!(cfg.vision.kernel_size, 5);
        assert_eq!(cfg.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("run.json");
        std::fs::write(&json_path, AnalysisConfig::default().to_json().unwrap()).unwrap();
        assert_eq!(AnalysisConfig::load(&json_path).unwrap(), AnalysisConfig::default());

        let toml_path = dir.path().join("run.toml");
        AnalysisConfig::default().save_toml(&toml_path).unwrap();
        assert_eq!(AnalysisConfig::load(&toml_path).unwrap(), AnalysisConfig::default());

        assert!(matches!(
            AnalysisConfig::load(dir.path().join("missing.toml")),
            Err(AnalysisError::Config(_))
        ));
    }
}
