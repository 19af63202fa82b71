//! LoRA adapter I/O convenience functions

use super::error::AdapterError;
use super::lora_adapter::LoRAAdapter;
use crate::lora::LoRALinearLayer;
use std::path::Path;

/// Save a LoRA layer's adapter weights to a file
///
/// # Errors
/// Returns `Err` on IO or serialization failure.
pub fn save_adapter<P: AsRef<Path>>(layer: &LoRALinearLayer, path: P) -> Result<(), AdapterError> {
    let adapter = LoRAAdapter::from_layer(layer);
    adapter.save(path)
}

/// Load a LoRA layer from a saved adapter file
///
/// # Errors
/// Returns `Err` on IO/parse failure or if the stored adapter fails
/// validation.
pub fn load_adapter<P: AsRef<Path>>(path: P) -> Result<LoRALinearLayer, AdapterError> {
    let adapter = LoRAAdapter::load(path)?;
    adapter.to_layer()
}
