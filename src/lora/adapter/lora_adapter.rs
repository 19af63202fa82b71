//! LoRA adapter serialization and deserialization
//!
//! Contains the main LoRAAdapter struct for saving and loading adapters.

use super::error::AdapterError;
use super::metadata::AdapterMetadata;
use crate::lora::LoRALinearLayer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable LoRA adapter format
///
/// Contains all information needed to reconstruct a LoRA layer (the frozen
/// base transform remains separate and is never stored here)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoRAAdapter {
    /// Format version for future compatibility
    version: String,
    /// LoRA rank
    rank: usize,
    /// LoRA alpha parameter
    alpha: f32,
    /// Input dimension
    in_features: usize,
    /// Output dimension
    out_features: usize,
    /// Computed scale factor (alpha/rank)
    scale: f32,
    /// LoRA A matrix weights [rank * in_features]
    lora_a: Vec<f32>,
    /// LoRA B matrix weights [out_features * rank]
    lora_b: Vec<f32>,
}

impl LoRAAdapter {
    /// Current adapter format version
    const VERSION: &'static str = "1.0";

    /// Create adapter from a LoRA layer
    pub fn from_layer(layer: &LoRALinearLayer) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            rank: layer.rank(),
            alpha: layer.alpha(),
            in_features: layer.in_features(),
            out_features: layer.out_features(),
            scale: layer.scale(),
            lora_a: layer.lora_a().as_slice().to_vec(),
            lora_b: layer.lora_b().as_slice().to_vec(),
        }
    }

    /// Reconstruct the LoRA layer from the stored adapter
    ///
    /// # Errors
    /// Returns `Err` if any stored weight length disagrees with the stored
    /// dimensions.
    pub fn to_layer(&self) -> Result<LoRALinearLayer, AdapterError> {
        if self.lora_a.len() != self.rank * self.in_features {
            return Err(AdapterError::DimensionMismatch {
                expected: format!(
                    "{} (rank {} * in_features {})",
                    self.rank * self.in_features,
                    self.rank,
                    self.in_features
                ),
                actual: self.lora_a.len().to_string(),
            });
        }

        if self.lora_b.len() != self.out_features * self.rank {
            return Err(AdapterError::DimensionMismatch {
                expected: format!(
                    "{} (out_features {} * rank {})",
                    self.out_features * self.rank,
                    self.out_features,
                    self.rank
                ),
                actual: self.lora_b.len().to_string(),
            });
        }

        let mut layer =
            LoRALinearLayer::with_seed(self.in_features, self.out_features, self.rank, self.alpha, 0)
                .map_err(|e| AdapterError::Validation(e.to_string()))?;

        // Replace the fresh init with the stored weights
        *layer.lora_a_mut().data_mut() = ndarray::Array1::from_vec(self.lora_a.clone());
        *layer.lora_b_mut().data_mut() = ndarray::Array1::from_vec(self.lora_b.clone());

        Ok(layer)
    }

    /// Save adapter to JSON file
    ///
    /// # Errors
    /// Returns `Err` on IO or serialization failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AdapterError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Load adapter from JSON file
    ///
    /// # Errors
    /// Returns `Err` on IO/parse failure or an unsupported format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AdapterError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let adapter: LoRAAdapter = serde_json::from_reader(reader)?;

        if adapter.version != Self::VERSION {
            return Err(AdapterError::Validation(format!(
                "Unsupported adapter version: {} (expected {})",
                adapter.version,
                Self::VERSION
            )));
        }

        Ok(adapter)
    }

    /// Get adapter metadata
    pub fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            version: self.version.clone(),
            rank: self.rank,
            alpha: self.alpha,
            in_features: self.in_features,
            out_features: self.out_features,
            scale: self.scale,
            num_params: self.lora_a.len() + self.lora_b.len(),
        }
    }
}
