//! Low-rank adaptation (LoRA) layers for parameter-efficient fine-tuning
//!
//! LoRA fine-tunes a large pretrained model by training a small low-rank
//! update ΔW = B @ A next to each frozen weight matrix W ∈ ℝ^(d_out × d_in),
//! with A ∈ ℝ^(r × d_in) and B ∈ ℝ^(d_out × r). This cuts the trainable
//! parameter count from d_out·d_in to r·(d_out + d_in).
//!
//! B is initialized to zero, so a freshly constructed layer contributes
//! exactly nothing until training moves it.
//!
//! # Example
//!
//! ```
//! use adaptar::{LoRALinearLayer, Tensor};
//!
//! # fn main() -> adaptar::Result<()> {
//! let layer = LoRALinearLayer::with_seed(8, 16, 2, 2.0, 42)?;
//!
//! let input = Tensor::from_vec(vec![10, 8], vec![0.5; 80], false)?;
//! let output = layer.forward(&input)?;
//!
//! assert_eq!(output.shape(), &[10, 16]);
//! // Untrained adapters contribute exactly zero
//! assert!(output.as_slice().iter().all(|&v| v == 0.0));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lora;
pub mod tensor;
pub mod trace;

pub use error::{Error, Result};
pub use lora::{
    load_adapter, save_adapter, AdaptedLinear, AdapterError, AdapterMetadata, LoRAAdapter,
    LoRAConfig, LoRALinearLayer,
};
pub use tensor::Tensor;
