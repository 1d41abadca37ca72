use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Normalized exponential over the whole vector.
///
/// Unlike the other activations, softmax is not elementwise: every output
/// component depends on every input component, and its backward pass is a
/// Jacobian-vector product rather than an elementwise scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Softmax;

impl Softmax {
    /// Exponentiates after subtracting the max element, so large-magnitude
    /// inputs cannot overflow. The max element maps to exp(0) = 1, which
    /// keeps the normalizing sum at 1 or above.
    pub fn apply(&self, mut z: Array1<f32>) -> Array1<f32> {
        let max = z.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        z.mapv_inplace(|v| (v - max).exp());
        let sum = z.sum();
        z / sum
    }

    /// Jacobian-vector product reduced to the input shape:
    /// `s ⊙ (g − ⟨g, s⟩)` for activation `s` and upstream gradient `g`.
    pub fn backprop(&self, a: ArrayView1<f32>, upstream: ArrayView1<f32>) -> Array1<f32> {
        let dot = upstream.dot(&a);
        let mut out = upstream.to_owned();
        out.zip_mut_with(&a, |g, &s| *g = s * (*g - dot));
        out
    }
}
