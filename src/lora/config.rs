//! LoRA hyperparameter configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// LoRA configuration
///
/// Holds the adaptation hyperparameters shared by every adapted layer:
/// the rank of the low-rank decomposition and the scaling numerator alpha.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoRAConfig {
    /// Rank of low-rank decomposition
    rank: usize,

    /// Scaling numerator (defaults to `rank`, giving scale 1.0)
    #[serde(default)]
    alpha: Option<f32>,
}

impl LoRAConfig {
    /// Create a configuration with the given rank and the default alpha (= rank)
    pub fn new(rank: usize) -> Self {
        Self { rank, alpha: None }
    }

    /// Override the alpha scaling numerator
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Rank of the low-rank decomposition
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Alpha scaling numerator (falls back to `rank` when unset)
    pub fn alpha(&self) -> f32 {
        self.alpha.unwrap_or(self.rank as f32)
    }

    /// Scale factor applied to the adaptation output: alpha / rank
    pub fn scale(&self) -> f32 {
        self.alpha() / self.rank as f32
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `Err` for a zero rank or a non-positive / non-finite alpha.
    pub fn validate(&self) -> Result<()> {
        if self.rank == 0 {
            return Err(Error::InvalidConfig("rank must be positive".to_string()));
        }
        let alpha = self.alpha();
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "alpha must be positive and finite, got {alpha}"
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file cannot be read, is not valid YAML, or fails
    /// validation.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml_content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: LoRAConfig = serde_yaml::from_str(&yaml_content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for LoRAConfig {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    #[test]
    fn test_default_alpha_equals_rank() {
        let config = LoRAConfig::new(16);
        assert_eq!(config.rank(), 16);
        assert_abs_diff_eq!(config.alpha(), 16.0, epsilon = 1e-6);
        assert_abs_diff_eq!(config.scale(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_with_alpha_changes_scale() {
        let config = LoRAConfig::new(4).with_alpha(8.0);
        assert_abs_diff_eq!(config.scale(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_validate_rejects_zero_rank() {
        let config = LoRAConfig::new(0);
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_alpha() {
        let config = LoRAConfig::new(4).with_alpha(0.0);
        assert!(config.validate().is_err());

        let config = LoRAConfig::new(4).with_alpha(-1.0);
        assert!(config.validate().is_err());

        let config = LoRAConfig::new(4).with_alpha(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lora.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "rank: 8").unwrap();
        writeln!(file, "alpha: 16.0").unwrap();

        let config = LoRAConfig::from_yaml(&path).unwrap();
        assert_eq!(config.rank(), 8);
        assert_abs_diff_eq!(config.alpha(), 16.0, epsilon = 1e-6);
        assert_abs_diff_eq!(config.scale(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_from_yaml_alpha_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lora.yaml");
        std::fs::write(&path, "rank: 32\n").unwrap();

        let config = LoRAConfig::from_yaml(&path).unwrap();
        assert_eq!(config.rank(), 32);
        assert_abs_diff_eq!(config.scale(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_from_yaml_missing_file() {
        let err = LoRAConfig::from_yaml("/nonexistent/lora.yaml").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("lora.yaml"));
    }

    #[test]
    fn test_from_yaml_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lora.yaml");
        std::fs::write(&path, "rank: [not a number\n").unwrap();

        assert!(matches!(
            LoRAConfig::from_yaml(&path).unwrap_err(),
            Error::Yaml(_)
        ));
    }

    #[test]
    fn test_from_yaml_invalid_rank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lora.yaml");
        std::fs::write(&path, "rank: 0\n").unwrap();

        assert!(matches!(
            LoRAConfig::from_yaml(&path).unwrap_err(),
            Error::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = LoRAConfig::new(64).with_alpha(128.0);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: LoRAConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.rank(), 64);
        assert_abs_diff_eq!(parsed.alpha(), 128.0, epsilon = 1e-6);
    }
}
