//! LoRA linear layer

use crate::error::{Error, Result};
use crate::lora::LoRAConfig;
use crate::tensor::{matmul_transpose_b, Tensor};
use crate::trace::{TraceStep, TRACER};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Trainable low-rank update for a linear transform
///
/// Holds the two small adaptation matrices and applies their composition to
/// inputs. The frozen base transform lives outside this layer (see
/// [`AdaptedLinear`](crate::lora::AdaptedLinear)).
#[derive(Debug, Clone)]
pub struct LoRALinearLayer {
    /// LoRA matrix A [rank, in_features] - downprojection, small random init
    lora_a: Tensor,
    /// LoRA matrix B [out_features, rank] - upprojection, zero init
    lora_b: Tensor,
    /// Input dimension
    in_features: usize,
    /// Output dimension
    out_features: usize,
    /// LoRA rank
    rank: usize,
    /// Scaling factor (alpha/rank)
    scale: f32,
}

impl LoRALinearLayer {
    /// Create a new LoRA linear layer
    ///
    /// # Arguments
    /// * `in_features` - Input dimension
    /// * `out_features` - Output dimension
    /// * `rank` - LoRA rank (typically 4, 8, 16, 32, or 64)
    /// * `alpha` - LoRA scaling parameter (often same as rank)
    ///
    /// # Returns
    /// Layer with randomly initialized A and zero-initialized B, so the
    /// adaptation output is exactly zero until trained.
    ///
    /// # Errors
    /// Returns `Err` if any dimension is zero or alpha is not positive.
    pub fn new(in_features: usize, out_features: usize, rank: usize, alpha: f32) -> Result<Self> {
        Self::build(in_features, out_features, rank, alpha, StdRng::from_entropy())
    }

    /// Create a layer with a seeded RNG for reproducible initialization
    ///
    /// # Errors
    /// Same conditions as [`LoRALinearLayer::new`].
    pub fn with_seed(
        in_features: usize,
        out_features: usize,
        rank: usize,
        alpha: f32,
        seed: u64,
    ) -> Result<Self> {
        Self::build(in_features, out_features, rank, alpha, StdRng::seed_from_u64(seed))
    }

    /// Create a layer from a validated [`LoRAConfig`]
    ///
    /// # Errors
    /// Returns `Err` if the config fails validation or the dimensions are zero.
    pub fn from_config(in_features: usize, out_features: usize, config: &LoRAConfig) -> Result<Self> {
        config.validate()?;
        Self::new(in_features, out_features, config.rank(), config.alpha())
    }

    fn build(
        in_features: usize,
        out_features: usize,
        rank: usize,
        alpha: f32,
        mut rng: StdRng,
    ) -> Result<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(Error::InvalidShape {
                reason: format!(
                    "feature dimensions must be positive, got in={in_features} out={out_features}"
                ),
            });
        }
        if rank == 0 {
            return Err(Error::InvalidConfig("rank must be positive".to_string()));
        }
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "alpha must be positive and finite, got {alpha}"
            )));
        }

        let (lora_a, lora_b) = TRACER.span(
            TraceStep::Init,
            format!("[{rank}x{in_features}] + [{out_features}x{rank}]"),
            || -> Result<(Tensor, Tensor)> {
                // A gets small uniform values, B starts at zero (standard LoRA
                // init), so ΔW = B·A = 0 until the first training step
                let bound = 1.0 / (in_features as f32).sqrt();
                let a_data: Vec<f32> =
                    (0..rank * in_features).map(|_| rng.gen_range(-bound..bound)).collect();
                let lora_a = Tensor::from_vec(vec![rank, in_features], a_data, true)?;
                let lora_b = Tensor::zeros(vec![out_features, rank], true)?;
                Ok((lora_a, lora_b))
            },
        )?;

        let scale = alpha / rank as f32;

        Ok(Self { lora_a, lora_b, in_features, out_features, rank, scale })
    }

    /// Forward pass: y = scale * (B @ (A @ x))
    ///
    /// The input's trailing dimension must equal `in_features`; any leading
    /// batch-like dimensions are preserved in the output, whose trailing
    /// dimension is `out_features`.
    ///
    /// # Errors
    /// Returns `Err` if the trailing dimension does not match `in_features`.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        if input.last_dim() != self.in_features {
            return Err(Error::ShapeMismatch {
                expected: format!("trailing dimension {}", self.in_features),
                actual: format!("input shape {:?}", input.shape()),
            });
        }

        let batch = input.len() / self.in_features;

        let out_data = TRACER.span(TraceStep::Forward, format!("batch {batch}"), || {
            // Step 1: x [batch, d_in] @ A^T -> [batch, r]
            let hidden =
                matmul_transpose_b(input.as_slice(), self.lora_a.as_slice(), batch, self.in_features, self.rank);

            // Step 2: [batch, r] @ B^T -> [batch, d_out]
            let mut out = matmul_transpose_b(
                &hidden,
                self.lora_b.as_slice(),
                batch,
                self.rank,
                self.out_features,
            );

            // Step 3: scale
            if self.scale != 1.0 {
                for val in &mut out {
                    *val *= self.scale;
                }
            }
            out
        });

        let mut out_shape = input.shape().to_vec();
        if let Some(last) = out_shape.last_mut() {
            *last = self.out_features;
        }

        let requires_grad =
            input.requires_grad() || self.lora_a.requires_grad() || self.lora_b.requires_grad();
        Tensor::from_vec(out_shape, out_data, requires_grad)
    }

    /// Get input dimension
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get output dimension
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Get rank
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Get scale factor (alpha/rank)
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Get alpha scaling parameter
    pub fn alpha(&self) -> f32 {
        self.scale * self.rank as f32
    }

    /// Get reference to LoRA A matrix
    pub fn lora_a(&self) -> &Tensor {
        &self.lora_a
    }

    /// Get mutable reference to LoRA A matrix
    pub fn lora_a_mut(&mut self) -> &mut Tensor {
        &mut self.lora_a
    }

    /// Get reference to LoRA B matrix
    pub fn lora_b(&self) -> &Tensor {
        &self.lora_b
    }

    /// Get mutable reference to LoRA B matrix
    pub fn lora_b_mut(&mut self) -> &mut Tensor {
        &mut self.lora_b
    }

    /// Get trainable parameters (A and B)
    pub fn trainable_params(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.lora_a, &mut self.lora_b]
    }

    /// Total trainable parameter count
    pub fn num_params(&self) -> usize {
        self.lora_a.len() + self.lora_b.len()
    }
}
