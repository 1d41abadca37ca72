use serde::{Deserialize, Serialize};

/// Hyperbolic tangent, mapping into (−1, 1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tanh;

impl Tanh {
    pub fn f(&self, z: f32) -> f32 {
        z.tanh()
    }

    /// Derivative in terms of the activation `a = f(z)`: `1 − a²`.
    pub fn df(&self, a: f32) -> f32 {
        1. - a * a
    }
}
