//! LoRA (Low-Rank Adaptation)
//!
//! LoRA enables parameter-efficient fine-tuning of large pretrained models
//! by adding trainable low-rank decomposition matrices to frozen weights.

mod adapted;
mod adapter;
mod config;
mod layer;

pub use adapted::AdaptedLinear;
pub use adapter::{
    load_adapter, save_adapter, AdapterError, AdapterMetadata, LoRAAdapter,
};
pub use config::LoRAConfig;
pub use layer::LoRALinearLayer;
