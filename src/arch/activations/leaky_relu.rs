use serde::{Deserialize, Serialize};

/// Rectified linear unit with a small slope for negative inputs, so dead
/// units keep a nonzero gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeakyRelu {
    slope: f32,
}

impl Default for LeakyRelu {
    fn default() -> Self {
        Self { slope: 0.01 }
    }
}

impl LeakyRelu {
    pub fn new(slope: f32) -> Self {
        Self { slope }
    }

    pub fn f(&self, z: f32) -> f32 {
        if z > 0. { z } else { self.slope * z }
    }

    /// Derivative keyed off the activation's sign; since the slope is
    /// positive, `a` and the pre-activation have the same sign.
    pub fn df(&self, a: f32) -> f32 {
        if a > 0. { 1. } else { self.slope }
    }
}
