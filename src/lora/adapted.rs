//! Frozen linear transform with an attached LoRA update
//!
//! Combines a frozen base weight W ∈ ℝ^(d_out × d_in) with a trainable
//! low-rank update: y = W @ x + scale * (B @ (A @ x)). The update can be
//! folded into W for inference and folded back out to resume training.

use crate::error::{Error, Result};
use crate::lora::LoRALinearLayer;
use crate::tensor::{matmul, matmul_transpose_b, Tensor};
use crate::trace::{TraceStep, TRACER};

/// Linear layer with frozen base weights and a trainable LoRA update
#[derive(Debug, Clone)]
pub struct AdaptedLinear {
    /// Frozen base weight [out_features, in_features]
    base_weight: Tensor,
    /// Trainable low-rank update
    lora: LoRALinearLayer,
    /// Whether the update is folded into base_weight
    merged: bool,
}

impl AdaptedLinear {
    /// Combine a frozen base weight with a LoRA layer
    ///
    /// # Errors
    /// Returns `Err` if the base weight shape is not
    /// `[out_features, in_features]` of the layer.
    pub fn new(base_weight: Tensor, lora: LoRALinearLayer) -> Result<Self> {
        let expected = [lora.out_features(), lora.in_features()];
        if base_weight.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("base weight shape {expected:?}"),
                actual: format!("{:?}", base_weight.shape()),
            });
        }

        Ok(Self { base_weight, lora, merged: false })
    }

    /// Forward pass: y = W @ x + scale * (B @ (A @ x))
    ///
    /// Same shape contract as [`LoRALinearLayer::forward`]: the trailing input
    /// dimension must equal `in_features`, leading dimensions pass through.
    ///
    /// # Errors
    /// Returns `Err` if the trailing dimension does not match `in_features`.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let d_in = self.lora.in_features();
        let d_out = self.lora.out_features();

        if input.last_dim() != d_in {
            return Err(Error::ShapeMismatch {
                expected: format!("trailing dimension {d_in}"),
                actual: format!("input shape {:?}", input.shape()),
            });
        }

        let batch = input.len() / d_in;
        let base_out = TRACER.span(TraceStep::Forward, format!("base batch {batch}"), || {
            matmul_transpose_b(input.as_slice(), self.base_weight.as_slice(), batch, d_in, d_out)
        });

        let mut out_shape = input.shape().to_vec();
        if let Some(last) = out_shape.last_mut() {
            *last = d_out;
        }

        if self.merged {
            // W already includes the update
            return Tensor::from_vec(out_shape, base_out, input.requires_grad());
        }

        let delta = self.lora.forward(input)?;
        let mut out = base_out;
        for (val, d) in out.iter_mut().zip(delta.as_slice()) {
            *val += d;
        }

        Tensor::from_vec(out_shape, out, input.requires_grad() || delta.requires_grad())
    }

    /// Fold the update into the base weight: W' = W + scale * (B @ A)
    ///
    /// After merging, forward passes use W' alone. Typically done for
    /// inference.
    pub fn merge(&mut self) {
        if self.merged {
            return;
        }

        TRACER.span(TraceStep::Merge, "merge", || {
            let delta = self.update_matrix();
            let scale = self.lora.scale();
            for (w, d) in self.base_weight.data_mut().iter_mut().zip(&delta) {
                *w += scale * d;
            }
        });

        self.merged = true;
    }

    /// Fold the update back out of the base weight: W = W' - scale * (B @ A)
    ///
    /// Reverses [`AdaptedLinear::merge`]. Useful for continuing training or
    /// switching adapters.
    pub fn unmerge(&mut self) {
        if !self.merged {
            return;
        }

        TRACER.span(TraceStep::Merge, "unmerge", || {
            let delta = self.update_matrix();
            let scale = self.lora.scale();
            for (w, d) in self.base_weight.data_mut().iter_mut().zip(&delta) {
                *w -= scale * d;
            }
        });

        self.merged = false;
    }

    // B [d_out, r] @ A [r, d_in] -> [d_out, d_in], unscaled
    fn update_matrix(&self) -> Vec<f32> {
        matmul(
            self.lora.lora_b().as_slice(),
            self.lora.lora_a().as_slice(),
            self.lora.out_features(),
            self.lora.rank(),
            self.lora.in_features(),
        )
    }

    /// Get reference to the frozen base weight
    pub fn base_weight(&self) -> &Tensor {
        &self.base_weight
    }

    /// Get reference to the LoRA update layer
    pub fn lora(&self) -> &LoRALinearLayer {
        &self.lora
    }

    /// Get mutable reference to the LoRA update layer
    pub fn lora_mut(&mut self) -> &mut LoRALinearLayer {
        &mut self.lora
    }

    /// Check if the update is merged into the base weight
    pub fn is_merged(&self) -> bool {
        self.merged
    }
}
