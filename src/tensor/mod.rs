//! Shaped tensor substrate
//!
//! Provides the crate's `Tensor` type (row-major f32 storage with an explicit
//! shape) and the matrix-multiply kernels the adaptation layers are built on.

mod core;
mod ops;


pub use self::core::Tensor;
pub use ops::{matmul, matmul_transpose_b};
