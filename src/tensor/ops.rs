//! Matrix multiplication kernels
//!
//! Row-major kernels over contiguous slices. Shapes are passed explicitly;
//! callers are responsible for supplying slices of the matching lengths.

use crate::trace::{TraceStep, TRACER};

/// Matrix multiply: `a[m,k] @ b[k,n] -> [m,n]`
pub fn matmul(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);

    TRACER.span(TraceStep::Matmul, format!("{m}x{k}x{n}"), || {
        let mut out = vec![0.0f32; m * n];
        for i in 0..m {
            for p in 0..k {
                let av = a[i * k + p];
                for j in 0..n {
                    out[i * n + j] += av * b[p * n + j];
                }
            }
        }
        out
    })
}

/// Matrix multiply with transposed right operand: `a[m,k] @ b[n,k]^T -> [m,n]`
///
/// This is the kernel used for weight matrices stored `[out, in]`: each output
/// element is a dot product of an `a` row with a `b` row.
pub fn matmul_transpose_b(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), n * k);

    TRACER.span(TraceStep::Matmul, format!("{m}x{k}x{n}^T"), || {
        let mut out = vec![0.0f32; m * n];
        for i in 0..m {
            let row = &a[i * k..(i + 1) * k];
            for j in 0..n {
                let w_row = &b[j * k..(j + 1) * k];
                let mut acc = 0.0f32;
                for p in 0..k {
                    acc += row[p] * w_row[p];
                }
                out[i * n + j] = acc;
            }
        }
        out
    })
}
