use serde::{Deserialize, Serialize};

/// Rectified linear unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relu;

impl Relu {
    pub fn f(&self, z: f32) -> f32 {
        z.max(0.)
    }

    /// Derivative keyed off the activation's sign, which agrees with the
    /// pre-activation's sign everywhere except exactly zero.
    pub fn df(&self, a: f32) -> f32 {
        if a > 0. { 1. } else { 0. }
    }
}
