//! Core tensor type

use crate::error::{Error, Result};
use ndarray::Array1;

/// N-dimensional `f32` tensor with row-major storage
///
/// Data is stored flattened alongside an explicit shape. The `requires_grad`
/// flag distinguishes trainable parameters from frozen ones.
#[derive(Debug, Clone)]
pub struct Tensor {
    /// Flattened data in row-major order
    data: Array1<f32>,
    /// Shape of the tensor
    shape: Vec<usize>,
    /// Whether this tensor participates in gradient-based training
    requires_grad: bool,
}

fn validate_shape(shape: &[usize]) -> Result<()> {
    if shape.is_empty() {
        return Err(Error::InvalidShape { reason: "shape cannot be empty".to_string() });
    }
    if shape.contains(&0) {
        return Err(Error::InvalidShape { reason: "shape dimensions cannot be zero".to_string() });
    }
    Ok(())
}

impl Tensor {
    /// Create a tensor from a shape and flattened row-major data
    ///
    /// # Errors
    ///
    /// Returns `Err` if the shape is empty, contains a zero dimension, or
    /// disagrees with the data length.
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>, requires_grad: bool) -> Result<Self> {
        validate_shape(&shape)?;

        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected} elements for shape {shape:?}"),
                actual: format!("{} elements", data.len()),
            });
        }

        Ok(Self { data: Array1::from_vec(data), shape, requires_grad })
    }

    /// Create a zero-filled tensor
    ///
    /// # Errors
    ///
    /// Returns `Err` if the shape is empty or contains a zero dimension.
    pub fn zeros(shape: Vec<usize>, requires_grad: bool) -> Result<Self> {
        validate_shape(&shape)?;
        let len: usize = shape.iter().product();
        Ok(Self { data: Array1::zeros(len), shape, requires_grad })
    }

    /// Get the shape of the tensor
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements (never true for a valid tensor)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the trailing dimension (the feature dimension for layer inputs)
    #[must_use]
    pub fn last_dim(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    /// Get a reference to the underlying data
    #[must_use]
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    ///
    /// Callers must preserve the element count; the shape is not re-derived.
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// View the data as a contiguous slice
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        // Array1 built from a Vec is always contiguous
        self.data.as_slice().unwrap_or(&[])
    }

    /// Whether this tensor participates in gradient-based training
    #[must_use]
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }
}
