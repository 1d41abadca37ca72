use serde::{Deserialize, Serialize};

/// Logistic sigmoid, mapping into (0, 1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn f(&self, z: f32) -> f32 {
        1. / (1. + (-z).exp())
    }

    /// Derivative in terms of the activation `a = f(z)`: `a·(1−a)`.
    ///
    /// Callers must pass the already-computed activation, not the
    /// pre-activation.
    pub fn df(&self, a: f32) -> f32 {
        a * (1. - a)
    }
}
